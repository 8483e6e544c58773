// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Probed, retrying connection pool over the fact store.
//!
//! Every repository operation acquires its connection here. On acquire, the
//! connection answers a trivial round-trip before being handed out; a failed
//! probe discards the connection and re-establishes one, with linear backoff
//! `retry_delay × attempt`, up to the policy's retry budget. Non-transient
//! errors surface to the caller unwrapped.

use crate::config::{ConfigError, StoreConfig};
use crate::jobs::ClaimInstruction;
use gl_core::retry::RetryPolicy;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::{Connection, Postgres};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("pool creation failed: {0}")]
    PoolCreation(#[source] sqlx::Error),
    #[error("no live connection after {attempts} attempts: {source}")]
    AcquireExhausted { attempts: u32, source: sqlx::Error },
    #[error("{context} failed: {source}")]
    Query { context: &'static str, source: sqlx::Error },
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Adapter for `map_err`: tag an sqlx error with the failing operation.
    pub fn query(context: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
        move |source| StoreError::Query { context, source }
    }
}

/// Whether an sqlx error is worth retrying with a fresh connection.
fn is_transient(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Io(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Protocol(_)
    )
}

/// Whether a store error came from transient I/O rather than the query.
pub fn is_transient_store_error(error: &StoreError) -> bool {
    match error {
        StoreError::AcquireExhausted { .. } | StoreError::PoolCreation(_) => true,
        StoreError::Query { source, .. } => is_transient(source),
        _ => false,
    }
}

/// Re-invoke `op` while it fails transiently, sleeping
/// `delay × backoff^attempt` between attempts, and rethrow the last failure
/// on exhaustion. Non-transient errors propagate immediately.
pub async fn retry_transient<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, StoreError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) if is_transient_store_error(&error) && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max = policy.max_attempts(),
                    delay_ms = delay.as_millis() as u64,
                    %error,
                    "transient store error, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

/// Bounded pool of probed connections to the fact store.
#[derive(Clone)]
pub struct StorePool {
    pool: PgPool,
    retry: RetryPolicy,
}

impl StorePool {
    /// Open a pool with `[min, max]` connections per the config.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password);
        if let Some(name) = &config.application_name {
            options = options.application_name(name);
        }

        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(StoreError::PoolCreation)?;

        tracing::info!(
            min = config.min_connections,
            max = config.max_connections,
            host = %config.host,
            "connection pool initialized"
        );

        Ok(Self {
            pool,
            retry: RetryPolicy::new(3, Duration::from_secs(1), 2.0),
        })
    }

    /// Acquire a connection that has just answered a liveness probe.
    ///
    /// Release is by drop: the connection returns to the pool on every exit
    /// path of the caller.
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, StoreError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let error = match self.pool.acquire().await {
                Ok(mut conn) => match sqlx::query("SELECT 1").execute(&mut *conn).await {
                    Ok(_) => return Ok(conn),
                    Err(error) => {
                        // Probe failed: the connection is suspect. Close it
                        // for real instead of returning it to the pool.
                        let _ = conn.detach().close().await;
                        error
                    }
                },
                Err(error) => error,
            };

            if !is_transient(&error) {
                return Err(StoreError::Query { context: "connection probe", source: error });
            }
            if attempt > self.retry.max_retries {
                return Err(StoreError::AcquireExhausted { attempts: attempt, source: error });
            }
            tracing::warn!(attempt, %error, "connection probe failed, retrying");
            tokio::time::sleep(self.retry.linear_delay_for(attempt)).await;
        }
    }

    /// Execute a coordinator-issued claim instruction verbatim.
    ///
    /// Returns the number of rows affected: 1 means the claim was won, 0
    /// means another worker got there first.
    pub async fn execute_claim(&self, instruction: &ClaimInstruction) -> Result<u64, StoreError> {
        let mut conn = self.acquire().await?;
        let mut query = sqlx::query(&instruction.sql);
        for param in &instruction.params {
            query = query.bind(param);
        }
        let result = query
            .execute(&mut *conn)
            .await
            .map_err(StoreError::query("claim instruction"))?;
        Ok(result.rows_affected())
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Close all connections.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("connection pool closed");
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
