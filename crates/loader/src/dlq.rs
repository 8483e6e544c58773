// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reprocessing of dead-lettered records.
//!
//! Each eligible row is run back through the owning loader's pipeline
//! (parse → validate → process); success means every propose response
//! succeeded. After an error, the reprocessor sleeps an exponential backoff
//! before moving on, pacing downstream load.

use crate::pipeline::Loader;
use gl_client::ProposeClient;
use gl_store::{DlqStore, FailedRecordRow, StoreError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Attempt budget per record; rows at or past this are never selected.
pub const MAX_RETRIES: i32 = 3;

/// Minimum age of the last attempt before a row is eligible again.
pub const COOLDOWN_MINUTES: i64 = 5;

const BASE_DELAY: Duration = Duration::from_secs(60);

/// Exponential backoff after a failed attempt: `base × 2^(attempt − 1)`.
pub fn backoff_for(base: Duration, attempt: i32) -> Duration {
    let exponent = attempt.max(1) - 1;
    base * 2u32.saturating_pow(exponent as u32)
}

/// Summary of one reprocessing sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReprocessSummary {
    pub processed: u64,
    pub successful: u64,
    pub failed: u64,
    pub errors: Vec<ReprocessFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReprocessFailure {
    pub record_id: String,
    pub error_type: Option<String>,
    pub attempts: i32,
}

/// Reprocesses failed records through their loader.
pub struct DlqReprocessor {
    client: ProposeClient,
    dlq: DlqStore,
    base_delay: Duration,
}

impl DlqReprocessor {
    pub fn new(client: ProposeClient) -> Self {
        let dlq = DlqStore::new(client.pool().clone());
        Self { client, dlq, base_delay: BASE_DELAY }
    }

    /// Shorten the pacing delay (tests, interactive runs).
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Reprocess one record. Returns true when fully successful.
    pub async fn reprocess_record(
        &self,
        loader: &dyn Loader,
        record: &FailedRecordRow,
    ) -> Result<bool, StoreError> {
        tracing::info!(
            record_id = %record.record_id,
            attempt = record.attempt_count + 1,
            "reprocessing record"
        );
        self.dlq.mark_retrying(&record.record_id).await?;

        match self.attempt(loader, record).await {
            Ok(responses) => {
                self.dlq
                    .mark_retried(
                        &record.record_id,
                        true,
                        Some(&serde_json::json!({"status": "success", "results": responses})),
                    )
                    .await?;
                tracing::info!(record_id = %record.record_id, "record reprocessed");
                Ok(true)
            }
            Err(AttemptFailure::Partial { failed }) => {
                self.dlq
                    .mark_retried(
                        &record.record_id,
                        false,
                        Some(&serde_json::json!({"status": "partial_failure", "failed": failed})),
                    )
                    .await?;
                tracing::warn!(record_id = %record.record_id, failed, "partial reprocess failure");
                Ok(false)
            }
            Err(AttemptFailure::Error(message)) => {
                tracing::error!(record_id = %record.record_id, error = %message, "reprocess failed");
                self.dlq
                    .mark_retried(
                        &record.record_id,
                        false,
                        Some(&serde_json::json!({"status": "error", "error": message})),
                    )
                    .await?;
                if record.attempt_count < MAX_RETRIES {
                    let delay = backoff_for(self.base_delay, record.attempt_count.max(1));
                    tracing::info!(delay_secs = delay.as_secs(), "pacing before next record");
                    tokio::time::sleep(delay).await;
                }
                Ok(false)
            }
        }
    }

    /// Reprocess up to `limit` eligible records.
    pub async fn reprocess_batch(
        &self,
        loader: &dyn Loader,
        limit: i64,
        source_id: Option<&str>,
    ) -> Result<ReprocessSummary, StoreError> {
        let records = self
            .dlq
            .eligible_for_retry(limit, MAX_RETRIES, COOLDOWN_MINUTES, source_id)
            .await?;
        if records.is_empty() {
            tracing::info!("no records ready for reprocessing");
            return Ok(ReprocessSummary::default());
        }
        tracing::info!(count = records.len(), "found records to reprocess");

        let mut summary = ReprocessSummary::default();
        for record in &records {
            let success = self.reprocess_record(loader, record).await?;
            summary.processed += 1;
            if success {
                summary.successful += 1;
            } else {
                summary.failed += 1;
                summary.errors.push(ReprocessFailure {
                    record_id: record.record_id.clone(),
                    error_type: record.error_type.clone(),
                    attempts: record.attempt_count + 1,
                });
            }
        }

        tracing::info!(
            successful = summary.successful,
            processed = summary.processed,
            "DLQ reprocessing complete"
        );
        Ok(summary)
    }

    /// Delete reprocessed rows older than the retention window.
    pub async fn cleanup(&self, days: i64) -> Result<u64, StoreError> {
        self.dlq.cleanup(days).await
    }

    async fn attempt(
        &self,
        loader: &dyn Loader,
        record: &FailedRecordRow,
    ) -> Result<usize, AttemptFailure> {
        let raw = match &record.record_data {
            serde_json::Value::Object(map) => map.clone(),
            _ => return Err(AttemptFailure::Error("record data is not an object".into())),
        };

        let parsed = loader
            .parse_record(&raw)
            .map_err(|e| AttemptFailure::Error(e.to_string()))?
            .ok_or_else(|| AttemptFailure::Error("record could not be parsed".into()))?;

        let errors = loader.validate_record(&parsed);
        if !errors.is_empty() {
            return Err(AttemptFailure::Error(format!("validation errors: {}", errors.join("; "))));
        }

        let responses = loader
            .process_record(&self.client, &parsed)
            .await
            .map_err(|e| AttemptFailure::Error(e.to_string()))?;

        let failed = responses.iter().filter(|r| !r.success).count();
        if failed == 0 {
            Ok(responses.len())
        } else {
            Err(AttemptFailure::Partial { failed })
        }
    }
}

enum AttemptFailure {
    Partial { failed: usize },
    Error(String),
}

#[cfg(test)]
#[path = "dlq_tests.rs"]
mod tests;
