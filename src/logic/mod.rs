pub mod alias;
pub mod assemble;
pub mod association_compiler;
pub mod compiler;
pub mod entity_compiler;
pub mod extract;
pub mod product;
pub mod submit;
pub mod validate;

pub use alias::*;
pub use assemble::*;
pub use association_compiler::*;
pub use compiler::*;
pub use entity_compiler::*;
pub use extract::*;
pub use product::*;
pub use submit::*;
pub use validate::*;
