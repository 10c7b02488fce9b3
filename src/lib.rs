pub mod api;
pub mod config;
pub mod errors;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use errors::{ConfigError, ResolutionError, SubmitError};

// Export logic types
pub use logic::{
    cartesian_product, extract_values, AliasResolver, AssociationCompiler, ConfigValidator,
    EntityCompiler, RequestAssembler, SubmissionCompiler, SubmissionPhase, SubmissionPipeline,
    SubmissionRequest, WriteDecision,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{DataGraphStore, EdmStore, MemoryStore, Store};

use std::sync::Arc;

/// Build the in-memory store described by the configuration
pub fn build_store(config: &crate::config::AppConfig) -> anyhow::Result<MemoryStore> {
    let store = MemoryStore::new();
    if config.seed.register_presets {
        seed::register_presets(&store);
    }
    if config.seed.load_sample_data {
        let reads = seed::load_sample_data(&store, &model::UserContext::default_user().user_id)?;
        log::info!("loaded {} sample plate reads", reads.len());
    }
    Ok(store)
}

/// Build the router with its state attached
pub fn build_app(store: Arc<MemoryStore>, config: &crate::config::AppConfig) -> axum::Router {
    let state = Arc::new(api::ServiceState::new(store, config.submission.clone()));
    routes::create_router::<MemoryStore>().with_state(state)
}

// Function for integration testing
pub async fn run_server() -> anyhow::Result<()> {
    use tokio::net::TcpListener;

    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let config = crate::config::AppConfig::load()?;
    let store = Arc::new(build_store(&config)?);
    let app = build_app(store, &config);

    let listener = TcpListener::bind(config.server_address()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
