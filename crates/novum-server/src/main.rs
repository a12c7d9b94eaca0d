//! Novum Server — application entry point.

use std::sync::Arc;

use anyhow::Context;
use novum_core::clock::SystemClock;
use novum_db::{DbManager, SurrealStore};
use novum_server::app::{AppState, build_router};
use novum_server::config::ServerConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("novum=info".parse()?))
        .json()
        .init();

    tracing::info!("Starting Novum server...");

    let config = ServerConfig::from_env_or_yaml().context("load server config")?;
    let db = DbManager::connect(&config.db)
        .await
        .context("connect to SurrealDB")?;
    let store = Arc::new(SurrealStore::new(db.client().clone()));
    let state = AppState::new(store, Arc::new(SystemClock), &config)?;
    let app = build_router(state);

    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, "Novum server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("Novum server stopped.");
    Ok(())
}
