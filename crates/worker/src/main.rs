// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker entry point.

use clap::Parser;
use gl_core::{Clock, SystemClock};
use gl_store::{StoreConfig, StorePool};
use gl_telemetry::{stream_name, BatchedLogger, TracingSink};
use gl_worker::config::WorkerArgs;
use gl_worker::{WorkerConfig, WorkerRuntime};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let registry = gl_loaders::LoaderRegistry::with_builtin();
    let config = WorkerConfig::from_args(WorkerArgs::parse(), registry.job_types());

    let store_config =
        StoreConfig::from_env()?.application_name(config.worker_id.as_str());
    let pool = StorePool::connect(&store_config).await?;

    let today = chrono::DateTime::from_timestamp_millis(SystemClock.epoch_ms() as i64)
        .unwrap_or_default()
        .date_naive();
    let telemetry = BatchedLogger::new(
        Box::new(TracingSink),
        stream_name(today, Some(config.worker_id.as_str())),
        25,
        Duration::from_secs(5),
    );
    telemetry.start();

    let runtime = WorkerRuntime::new(config, pool.clone(), registry, telemetry.clone())?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received");
        signal_token.cancel();
    });

    runtime.run(shutdown).await;

    telemetry.shutdown().await;
    pool.close().await;
    Ok(())
}
