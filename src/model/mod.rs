pub mod common;
pub mod edm;
pub mod graph;
pub mod submission_config;
pub mod user_context;
pub mod values;

pub use common::*;
pub use edm::*;
pub use graph::*;
pub use submission_config::*;
pub use user_context::*;
pub use values::*;
