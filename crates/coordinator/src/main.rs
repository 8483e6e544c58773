// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator entry point.

use gl_coordinator::{router, spawn_reaper, AppState, CoordinatorConfig};
use gl_store::{JobStore, StoreConfig, StorePool};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = CoordinatorConfig::from_env()?;
    let store_config = StoreConfig::from_env()?;
    let pool = StorePool::connect(&store_config).await?;
    pool.migrate().await?;

    let shutdown = CancellationToken::new();
    let reaper_handle = config
        .reaper
        .map(|settings| spawn_reaper(JobStore::new(pool.clone()), settings, shutdown.clone()));

    let app = router(AppState::new(pool.clone()));
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "coordinator listening");

    let serve_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
            serve_shutdown.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Some(handle) = reaper_handle {
        let _ = handle.await;
    }
    pool.close().await;
    Ok(())
}
