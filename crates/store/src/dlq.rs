// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dead-letter queue repository.
//!
//! State transitions on a failed-record row are serialized here: a record is
//! selected for retry only while `reprocessed = false`, its attempt budget
//! remains, and the cooldown since the last attempt has elapsed. Once
//! `reprocessed = true` it is never retried again.

use crate::pool::{StoreError, StorePool};
use chrono::{DateTime, Utc};
use gl_core::{Clock, Ulid};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Length bound applied to `failed_records.error_message`.
const ERROR_MESSAGE_MAX: usize = 5000;

/// One row of `failed_records`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FailedRecordRow {
    pub record_id: String,
    pub source_id: String,
    pub source_type: String,
    pub record_data: serde_json::Value,
    pub error_message: Option<String>,
    pub error_type: Option<String>,
    pub error_details: Option<serde_json::Value>,
    pub attempt_count: i32,
    pub created_at: DateTime<Utc>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub reprocessed: bool,
    pub reprocessed_at: Option<DateTime<Utc>>,
    pub reprocess_result: Option<serde_json::Value>,
}

/// Fields for enqueueing a failed record.
#[derive(Debug, Clone)]
pub struct NewFailedRecord {
    pub source_id: String,
    pub source_type: String,
    pub record_data: serde_json::Value,
    /// Full error text; truncated at the storage bound.
    pub error_message: String,
    /// Error class name (e.g. "ParseError").
    pub error_type: String,
    pub error_details: Option<serde_json::Value>,
}

/// Aggregate DLQ statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlqStatistics {
    pub total_records: i64,
    pub reprocessed: i64,
    pub pending: i64,
    pub max_attempts_reached: i64,
    pub oldest_record: Option<DateTime<Utc>>,
    pub newest_record: Option<DateTime<Utc>>,
    pub error_breakdown: Vec<(String, i64)>,
    pub source_breakdown: Vec<(String, i64)>,
}

#[derive(Clone)]
pub struct DlqStore {
    pool: StorePool,
}

impl DlqStore {
    pub fn new(pool: StorePool) -> Self {
        Self { pool }
    }

    /// Enqueue a failed record with `attempt_count = 1`.
    pub async fn add(
        &self,
        clock: &impl Clock,
        record: &NewFailedRecord,
    ) -> Result<String, StoreError> {
        let record_id = Ulid::generate(clock);
        let message: String = record.error_message.chars().take(ERROR_MESSAGE_MAX).collect();
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "INSERT INTO failed_records ( \
                 record_id, source_id, source_type, record_data, \
                 error_message, error_type, error_details \
             ) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record_id.as_str())
        .bind(&record.source_id)
        .bind(&record.source_type)
        .bind(&record.record_data)
        .bind(&message)
        .bind(&record.error_type)
        .bind(&record.error_details)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("insert failed record"))?;
        tracing::debug!(record_id = %record_id, "added failed record to DLQ");
        Ok(record_id.to_string())
    }

    /// Records eligible for reprocessing, oldest first.
    pub async fn eligible_for_retry(
        &self,
        limit: i64,
        max_attempts: i32,
        cooldown_minutes: i64,
        source_id: Option<&str>,
    ) -> Result<Vec<FailedRecordRow>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        match source_id {
            Some(source_id) => sqlx::query_as(
                "SELECT * FROM failed_records \
                 WHERE reprocessed = FALSE \
                   AND attempt_count < $1 \
                   AND (last_attempt_at IS NULL \
                        OR last_attempt_at < NOW() - make_interval(mins => $2)) \
                   AND source_id = $3 \
                 ORDER BY created_at LIMIT $4",
            )
            .bind(max_attempts)
            .bind(cooldown_minutes as i32)
            .bind(source_id)
            .bind(limit)
            .fetch_all(&mut *conn)
            .await
            .map_err(StoreError::query("select retryable records")),
            None => sqlx::query_as(
                "SELECT * FROM failed_records \
                 WHERE reprocessed = FALSE \
                   AND attempt_count < $1 \
                   AND (last_attempt_at IS NULL \
                        OR last_attempt_at < NOW() - make_interval(mins => $2)) \
                 ORDER BY created_at LIMIT $3",
            )
            .bind(max_attempts)
            .bind(cooldown_minutes as i32)
            .bind(limit)
            .fetch_all(&mut *conn)
            .await
            .map_err(StoreError::query("select retryable records")),
        }
    }

    /// Stamp the start of a reprocess attempt.
    pub async fn mark_retrying(&self, record_id: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "UPDATE failed_records \
             SET last_attempt_at = NOW(), attempt_count = attempt_count + 1 \
             WHERE record_id = $1",
        )
        .bind(record_id)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("mark record retrying"))?;
        Ok(())
    }

    /// Record the outcome of a reprocess attempt.
    pub async fn mark_retried(
        &self,
        record_id: &str,
        success: bool,
        result: Option<&serde_json::Value>,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        if success {
            sqlx::query(
                "UPDATE failed_records \
                 SET reprocessed = TRUE, reprocessed_at = NOW(), reprocess_result = $2 \
                 WHERE record_id = $1",
            )
            .bind(record_id)
            .bind(result)
            .execute(&mut *conn)
            .await
            .map_err(StoreError::query("mark record reprocessed"))?;
        } else {
            sqlx::query("UPDATE failed_records SET reprocess_result = $2 WHERE record_id = $1")
                .bind(record_id)
                .bind(result)
                .execute(&mut *conn)
                .await
                .map_err(StoreError::query("record reprocess result"))?;
        }
        Ok(())
    }

    /// Delete reprocessed rows older than the retention window.
    pub async fn cleanup(&self, days: i64) -> Result<u64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query(
            "DELETE FROM failed_records \
             WHERE reprocessed = TRUE \
               AND reprocessed_at < NOW() - make_interval(days => $1)",
        )
        .bind(days as i32)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("cleanup reprocessed records"))?;
        let deleted = result.rows_affected();
        tracing::info!(deleted, "cleaned up old reprocessed records");
        Ok(deleted)
    }

    /// Aggregate statistics, optionally filtered to one source.
    pub async fn statistics(&self, source_id: Option<&str>) -> Result<DlqStatistics, StoreError> {
        let mut conn = self.pool.acquire().await?;

        let overall: (i64, i64, i64, i64, Option<DateTime<Utc>>, Option<DateTime<Utc>>) =
            sqlx::query_as(
                "SELECT COUNT(*), \
                        COUNT(*) FILTER (WHERE reprocessed = TRUE), \
                        COUNT(*) FILTER (WHERE reprocessed = FALSE), \
                        COUNT(*) FILTER (WHERE attempt_count >= 3), \
                        MIN(created_at), MAX(created_at) \
                 FROM failed_records \
                 WHERE source_id = $1 OR $1 IS NULL",
            )
            .bind(source_id)
            .fetch_one(&mut *conn)
            .await
            .map_err(StoreError::query("DLQ overall statistics"))?;

        let error_breakdown: Vec<(String, i64)> = sqlx::query_as(
            "SELECT COALESCE(error_type, 'unknown'), COUNT(*) \
             FROM failed_records \
             WHERE (source_id = $1 OR $1 IS NULL) AND reprocessed = FALSE \
             GROUP BY 1 ORDER BY 2 DESC",
        )
        .bind(source_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query("DLQ error breakdown"))?;

        let source_breakdown: Vec<(String, i64)> = sqlx::query_as(
            "SELECT source_type, COUNT(*) \
             FROM failed_records \
             WHERE reprocessed = FALSE \
             GROUP BY 1 ORDER BY 2 DESC",
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query("DLQ source breakdown"))?;

        Ok(DlqStatistics {
            total_records: overall.0,
            reprocessed: overall.1,
            pending: overall.2,
            max_attempts_reached: overall.3,
            oldest_record: overall.4,
            newest_record: overall.5,
            error_breakdown,
            source_breakdown,
        })
    }
}
