// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job log repository.

use crate::pool::{StoreError, StorePool};
use gl_core::{Clock, Ulid};

#[derive(Clone)]
pub struct JobLogStore {
    pool: StorePool,
}

impl JobLogStore {
    pub fn new(pool: StorePool) -> Self {
        Self { pool }
    }

    /// Append one log row for a job.
    pub async fn append(
        &self,
        clock: &impl Clock,
        job_id: &str,
        level: &str,
        message: &str,
        metadata: Option<&serde_json::Value>,
    ) -> Result<(), StoreError> {
        let log_id = Ulid::generate(clock);
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "INSERT INTO job_logs (log_id, job_id, level, message, metadata) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(log_id.as_str())
        .bind(job_id)
        .bind(level)
        .bind(message)
        .bind(metadata)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("append job log"))?;
        Ok(())
    }
}
