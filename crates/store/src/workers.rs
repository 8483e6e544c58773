// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker registry repository. Heartbeats are idempotent upserts.

use crate::pool::{StoreError, StorePool};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of `workers`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WorkerRow {
    pub worker_id: String,
    pub hostname: Option<String>,
    pub status: String,
    pub capabilities: serde_json::Value,
    pub last_heartbeat: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct WorkerStore {
    pool: StorePool,
}

impl WorkerStore {
    pub fn new(pool: StorePool) -> Self {
        Self { pool }
    }

    /// Record a heartbeat, registering the worker on first contact.
    pub async fn heartbeat(
        &self,
        worker_id: &str,
        hostname: &str,
        capabilities: &[String],
    ) -> Result<(), StoreError> {
        let caps = serde_json::json!(capabilities);
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "INSERT INTO workers (worker_id, hostname, status, capabilities, last_heartbeat) \
             VALUES ($1, $2, 'active', $3, NOW()) \
             ON CONFLICT (worker_id) DO UPDATE \
             SET last_heartbeat = NOW(), status = 'active', hostname = $2, \
                 capabilities = $3, updated_at = NOW()",
        )
        .bind(worker_id)
        .bind(hostname)
        .bind(&caps)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("worker heartbeat"))?;
        Ok(())
    }

    /// Mark a worker idle (between jobs, or on clean shutdown).
    pub async fn mark_idle(&self, worker_id: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "UPDATE workers SET status = 'idle', updated_at = NOW() WHERE worker_id = $1",
        )
        .bind(worker_id)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("mark worker idle"))?;
        Ok(())
    }

    /// Active and idle workers, most recently seen first.
    pub async fn list_live(&self) -> Result<Vec<WorkerRow>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query_as(
            "SELECT * FROM workers \
             WHERE status IN ('active', 'idle') \
             ORDER BY last_heartbeat DESC",
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query("list workers"))
    }
}

#[cfg(test)]
#[path = "workers_tests.rs"]
mod tests;
