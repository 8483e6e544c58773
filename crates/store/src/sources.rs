// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source registry repository.
//!
//! `(source_type, file_hash)` is unique: re-submitting a completed file
//! short-circuits, and an in-progress row is adopted for resume.

use crate::pool::{StoreError, StorePool};
use chrono::{DateTime, Utc};
use gl_core::source::SourceCounters;
use gl_core::{Clock, Ulid};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Length bound applied to `sources.error_message`.
const ERROR_MESSAGE_MAX: usize = 1000;

/// One row of `sources`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SourceRow {
    pub source_id: String,
    pub source_type: String,
    pub source_name: String,
    pub source_version: Option<String>,
    pub file_name: Option<String>,
    pub file_hash: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub status: String,
    pub records_in_file: Option<i64>,
    pub records_processed: i64,
    pub records_imported: i64,
    pub records_failed: i64,
    pub records_skipped: i64,
    pub error_message: Option<String>,
    pub download_date: Option<DateTime<Utc>>,
    pub import_started_at: Option<DateTime<Utc>>,
    pub import_completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for registering a new source file.
#[derive(Debug, Clone)]
pub struct NewSource {
    pub source_type: String,
    pub source_name: String,
    pub source_version: String,
    pub file_name: String,
    pub file_hash: String,
    pub file_size_bytes: i64,
}

#[derive(Clone)]
pub struct SourceStore {
    pool: StorePool,
}

impl SourceStore {
    pub fn new(pool: StorePool) -> Self {
        Self { pool }
    }

    /// Look up a source by its `(type, hash)` identity.
    pub async fn find_by_hash(
        &self,
        source_type: &str,
        file_hash: &str,
    ) -> Result<Option<SourceRow>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query_as("SELECT * FROM sources WHERE source_type = $1 AND file_hash = $2")
            .bind(source_type)
            .bind(file_hash)
            .fetch_optional(&mut *conn)
            .await
            .map_err(StoreError::query("select source"))
    }

    /// Insert a fresh `processing` row and return its id.
    pub async fn insert_processing(
        &self,
        clock: &impl Clock,
        source: &NewSource,
    ) -> Result<String, StoreError> {
        let source_id = Ulid::generate(clock);
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "INSERT INTO sources ( \
                 source_id, source_type, source_name, source_version, \
                 file_name, file_hash, file_size_bytes, \
                 download_date, import_started_at, status \
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW(), 'processing')",
        )
        .bind(source_id.as_str())
        .bind(&source.source_type)
        .bind(&source.source_name)
        .bind(&source.source_version)
        .bind(&source.file_name)
        .bind(&source.file_hash)
        .bind(source.file_size_bytes)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("insert source"))?;
        Ok(source_id.to_string())
    }

    /// Persist checkpoint counters.
    pub async fn update_counters(
        &self,
        source_id: &str,
        counters: &SourceCounters,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "UPDATE sources \
             SET records_processed = $2, records_imported = $3, \
                 records_failed = $4, records_skipped = $5, updated_at = NOW() \
             WHERE source_id = $1",
        )
        .bind(source_id)
        .bind(counters.records_processed)
        .bind(counters.records_imported)
        .bind(counters.records_failed)
        .bind(counters.records_skipped)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("update source counters"))?;
        Ok(())
    }

    /// Mark the run complete, filling `records_in_file` from the final cursor.
    pub async fn mark_completed(
        &self,
        source_id: &str,
        records_in_file: i64,
        counters: &SourceCounters,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "UPDATE sources \
             SET status = 'completed', import_completed_at = NOW(), \
                 records_in_file = $2, records_processed = $3, \
                 records_imported = $4, records_failed = $5, \
                 records_skipped = $6, updated_at = NOW() \
             WHERE source_id = $1",
        )
        .bind(source_id)
        .bind(records_in_file)
        .bind(counters.records_processed)
        .bind(counters.records_imported)
        .bind(counters.records_failed)
        .bind(counters.records_skipped)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("mark source completed"))?;
        Ok(())
    }

    /// Mark the run failed with a bounded error message.
    pub async fn mark_failed(&self, source_id: &str, error: &str) -> Result<(), StoreError> {
        let message: String = error.chars().take(ERROR_MESSAGE_MAX).collect();
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "UPDATE sources \
             SET status = 'failed', error_message = $2, updated_at = NOW() \
             WHERE source_id = $1",
        )
        .bind(source_id)
        .bind(&message)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("mark source failed"))?;
        Ok(())
    }
}
