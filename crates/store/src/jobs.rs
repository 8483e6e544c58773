// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job queue repository.
//!
//! The coordinator reads and inserts here; state transitions on a claimed
//! row are executed by the owning worker. Claiming itself goes through
//! [`claim_instruction`]: the coordinator only describes the conditional
//! update, the worker executes it, and the `status = 'pending'` guard makes
//! the transition atomic under racing claims.

use crate::pool::{StoreError, StorePool};
use chrono::{DateTime, Utc};
use gl_core::{Clock, Ulid};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// SQL the worker runs to claim a job. Parameters: worker_id, job_id.
const CLAIM_SQL: &str = "UPDATE job_queue \
     SET status = 'claimed', worker_id = $1, claimed_at = NOW(), updated_at = NOW() \
     WHERE job_id = $2 AND status = 'pending'";

/// A parameterized mutation the worker executes against the store to claim
/// a job. The coordinator never runs this itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimInstruction {
    pub sql: String,
    pub params: Vec<String>,
}

/// Build the claim instruction for a (worker, job) pair.
pub fn claim_instruction(worker_id: &str, job_id: &str) -> ClaimInstruction {
    ClaimInstruction {
        sql: CLAIM_SQL.to_string(),
        params: vec![worker_id.to_string(), job_id.to_string()],
    }
}

/// One row of `job_queue`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct JobRow {
    pub job_id: String,
    pub job_type: String,
    pub config: serde_json::Value,
    pub status: String,
    pub worker_id: Option<String>,
    pub checkpoint: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Job row joined with its worker's registry entry for status queries.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct JobStatusRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: JobRow,
    pub hostname: Option<String>,
    pub last_heartbeat: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct JobStore {
    pool: StorePool,
}

impl JobStore {
    pub fn new(pool: StorePool) -> Self {
        Self { pool }
    }

    /// Insert a freshly submitted job as `pending`. Returns the job id.
    pub async fn submit(
        &self,
        clock: &impl Clock,
        job_type: &str,
        config: &serde_json::Value,
    ) -> Result<String, StoreError> {
        let job_id = Ulid::generate(clock);
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "INSERT INTO job_queue (job_id, job_type, config, status) \
             VALUES ($1, $2, $3, 'pending')",
        )
        .bind(job_id.as_str())
        .bind(job_type)
        .bind(config)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("insert job"))?;
        Ok(job_id.to_string())
    }

    /// Oldest pending job whose type is within the given capabilities.
    pub async fn next_pending(&self, capabilities: &[String]) -> Result<Option<JobRow>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query_as(
            "SELECT * FROM job_queue \
             WHERE status = 'pending' AND job_type = ANY($1) \
             ORDER BY created_at ASC LIMIT 1",
        )
        .bind(capabilities)
        .fetch_optional(&mut *conn)
        .await
        .map_err(StoreError::query("select pending job"))
    }

    pub async fn fetch(&self, job_id: &str) -> Result<Option<JobRow>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query_as("SELECT * FROM job_queue WHERE job_id = $1")
            .bind(job_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(StoreError::query("select job"))
    }

    /// Job row with the claiming worker's hostname and heartbeat joined in.
    pub async fn fetch_with_worker(&self, job_id: &str) -> Result<Option<JobStatusRow>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query_as(
            "SELECT j.*, w.hostname, w.last_heartbeat \
             FROM job_queue j \
             LEFT JOIN workers w ON j.worker_id = w.worker_id \
             WHERE j.job_id = $1",
        )
        .bind(job_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(StoreError::query("select job status"))
    }

    /// List jobs, newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<&str>, limit: i64) -> Result<Vec<JobRow>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        match status {
            Some(status) => sqlx::query_as(
                "SELECT * FROM job_queue WHERE status = $1 \
                 ORDER BY created_at DESC LIMIT $2",
            )
            .bind(status)
            .bind(limit)
            .fetch_all(&mut *conn)
            .await
            .map_err(StoreError::query("list jobs")),
            None => sqlx::query_as("SELECT * FROM job_queue ORDER BY created_at DESC LIMIT $1")
                .bind(limit)
                .fetch_all(&mut *conn)
                .await
                .map_err(StoreError::query("list jobs")),
        }
    }

    /// `claimed → running`, stamping `started_at`.
    pub async fn mark_running(&self, job_id: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "UPDATE job_queue \
             SET status = 'running', started_at = NOW(), updated_at = NOW() \
             WHERE job_id = $1",
        )
        .bind(job_id)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("mark job running"))?;
        Ok(())
    }

    /// `running → completed`, stamping `completed_at`.
    pub async fn mark_completed(&self, job_id: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "UPDATE job_queue \
             SET status = 'completed', completed_at = NOW(), updated_at = NOW() \
             WHERE job_id = $1",
        )
        .bind(job_id)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("mark job completed"))?;
        Ok(())
    }

    /// Terminal failure with a message.
    pub async fn mark_failed(&self, job_id: &str, error_message: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "UPDATE job_queue \
             SET status = 'failed', error_message = $2, updated_at = NOW() \
             WHERE job_id = $1",
        )
        .bind(job_id)
        .bind(error_message)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("mark job failed"))?;
        Ok(())
    }

    /// Write-last-wins checkpoint update by the owning worker.
    pub async fn save_checkpoint(
        &self,
        job_id: &str,
        checkpoint: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "UPDATE job_queue SET checkpoint = $2, updated_at = NOW() WHERE job_id = $1",
        )
        .bind(job_id)
        .bind(checkpoint)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("save checkpoint"))?;
        Ok(())
    }

    /// Requeue claimed/running jobs whose worker has no heartbeat within the
    /// deadline. Only fires after confirming staleness; clears `worker_id`.
    pub async fn requeue_stale(&self, deadline_secs: f64) -> Result<Vec<String>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let rows: Vec<(String,)> = sqlx::query_as(
            "UPDATE job_queue \
             SET status = 'pending', worker_id = NULL, updated_at = NOW() \
             WHERE status IN ('claimed', 'running') \
               AND worker_id IS NOT NULL \
               AND NOT EXISTS ( \
                   SELECT 1 FROM workers w \
                   WHERE w.worker_id = job_queue.worker_id \
                     AND w.last_heartbeat > NOW() - make_interval(secs => $1) \
               ) \
             RETURNING job_id",
        )
        .bind(deadline_secs)
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query("requeue stale jobs"))?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
