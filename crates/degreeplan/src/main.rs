use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use degreeplan::catalog::Catalog;
use degreeplan::config::EngineConfig;
use degreeplan::planner::Planner;
use degreeplan::server::{create_router, AppState};
use degreeplan::store::SqliteStore;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.json"));
    let config = EngineConfig::load(&config_path)
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let catalog = Catalog::load(&config.catalog_path)
        .with_context(|| format!("loading catalog from {}", config.catalog_path.display()))?;
    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("opening database {}", config.database_path))?;
    let planner = Planner::load(Arc::new(catalog), Arc::new(store))
        .await
        .context("loading initial plan state")?;

    let app_state = Arc::new(AppState {
        planner,
        grid: config.grid.clone(),
    });
    let router = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_address)
        .await
        .with_context(|| format!("binding {}", config.listen_address))?;
    info!("Listening on {}", config.listen_address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
