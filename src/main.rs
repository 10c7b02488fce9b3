use alpr_graph_submit::config::AppConfig;
use alpr_graph_submit::{build_app, build_store};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;
    log::info!(
        "configuration loaded: server={}:{}",
        config.server.host,
        config.server.port
    );

    let store = Arc::new(build_store(&config)?);
    let app = build_app(store, &config);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("ALPR submission service listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
