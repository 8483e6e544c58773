// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The run loop: register → stream → process → checkpoint → finalize.
//!
//! Per-record failures never abort a batch; an error escaping the batch
//! loop marks the source failed and is rethrown. Checkpoints advance
//! monotonically with the cursor, and a resumed run starts exactly at the
//! persisted `records_processed`.

use crate::pipeline::{Loader, RawRecord, RecordOutcome, RunHooks};
use crate::progress::ProgressReporter;
use crate::reader::{BatchReader, ReadError};
use crate::stats::LoadStats;
use gl_client::ProposeClient;
use gl_core::retry::CircuitBreaker;
use gl_core::source::{version_from_datetime, version_from_filename, SourceCounters};
use gl_core::{Clock, QualityIssue};
use gl_store::{DlqStore, NewFailedRecord, NewSource, SourceStore, StoreError};
use gl_telemetry::{LogLevel, StructuredLog};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// How many per-record propose failures get detailed log output before the
/// run goes quiet about them.
const DETAILED_FAILURE_LOGS: u64 = 10;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("data file not found: {0}")]
    FileNotFound(PathBuf),
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-run options from the job config.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub limit: Option<u64>,
    pub batch_size: Option<usize>,
    pub checkpoint_interval: Option<u64>,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// This `(source_type, file_hash)` was already completed; nothing ran.
    AlreadyProcessed,
    Completed { source_id: String, stats: LoadStats },
}

/// Drives a [`Loader`] over one input file.
pub struct LoadRunner<C: Clock> {
    client: ProposeClient,
    sources: SourceStore,
    dlq: DlqStore,
    hooks: Arc<dyn RunHooks>,
    clock: C,
    stats: LoadStats,
    source_id: Option<String>,
    source_type: String,
    last_checkpoint: u64,
}

impl<C: Clock> LoadRunner<C> {
    pub fn new(client: ProposeClient, clock: C, hooks: Arc<dyn RunHooks>) -> Self {
        let pool = client.pool().clone();
        Self {
            client,
            sources: SourceStore::new(pool.clone()),
            dlq: DlqStore::new(pool),
            hooks,
            clock,
            stats: LoadStats::default(),
            source_id: None,
            source_type: String::new(),
            last_checkpoint: 0,
        }
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    /// Run the loader over `file_path`.
    pub async fn run(
        &mut self,
        loader: &dyn Loader,
        file_path: &Path,
        options: RunOptions,
    ) -> Result<RunOutcome, RunError> {
        if !file_path.exists() {
            return Err(RunError::FileNotFound(file_path.to_path_buf()));
        }

        self.source_type = loader.descriptor().source_type.clone();
        let source_id = match self.register_source(loader, file_path).await? {
            Some(source_id) => source_id,
            None => return Ok(RunOutcome::AlreadyProcessed),
        };
        self.source_id = Some(source_id.clone());

        // Resume: the cursor starts at whatever a prior partial run persisted.
        let start_from = self.stats.total_processed;
        self.last_checkpoint = start_from;
        if start_from > 0 {
            tracing::info!(start_from, "resuming from prior checkpoint");
            self.log(LogLevel::Info, format!("resuming from record {}", start_from), None).await;
        }

        match self.run_batches(loader, file_path, &options, start_from).await {
            Ok(cursor) => {
                self.save_checkpoint(cursor).await?;
                self.sources
                    .mark_completed(
                        &source_id,
                        cursor as i64,
                        &self.stats.as_source_counters(cursor),
                    )
                    .await?;
                tracing::info!(records = cursor, "source marked complete");
                Ok(RunOutcome::Completed { source_id, stats: self.stats })
            }
            Err(error) => {
                self.sources.mark_failed(&source_id, &error.to_string()).await?;
                Err(error)
            }
        }
    }

    /// The batch loop. Returns the final cursor.
    async fn run_batches(
        &mut self,
        loader: &dyn Loader,
        file_path: &Path,
        options: &RunOptions,
        start_from: u64,
    ) -> Result<u64, RunError> {
        let descriptor = loader.descriptor();
        let batch_size = options.batch_size.unwrap_or(descriptor.batch_size);
        let checkpoint_interval =
            options.checkpoint_interval.unwrap_or(descriptor.checkpoint_interval);

        let mut breaker = descriptor.breaker.map(|settings| {
            CircuitBreaker::new(settings.failure_threshold, settings.timeout, self.clock.clone())
        });
        let mut progress = ProgressReporter::new(self.clock.clone(), descriptor.progress_interval);
        progress.tick(&self.stats, false);

        let reader = BatchReader::open(file_path, descriptor.format, batch_size, start_from)?;
        let mut processed: u64 = 0;

        for batch in reader {
            let batch = batch?;
            self.process_batch(loader, &mut breaker, &batch).await;
            processed += batch.len() as u64;

            if let Some(report) = progress.tick(&self.stats, false) {
                tracing::info!("progress report: {}", report);
                self.log(LogLevel::Info, report.to_string(), Some(report.to_metadata())).await;
            }

            if (start_from + processed) - self.last_checkpoint >= checkpoint_interval {
                self.save_checkpoint(start_from + processed).await?;
                tracing::info!(
                    cursor = start_from + processed,
                    successful = self.stats.successful,
                    failed = self.stats.failed,
                    skipped = self.stats.skipped,
                    "checkpoint"
                );
            }

            if let Some(limit) = options.limit {
                if processed >= limit {
                    tracing::info!(limit, "record limit reached");
                    break;
                }
            }
        }

        Ok(start_from + processed)
    }

    /// Process one batch; failures are counted, never propagated.
    async fn process_batch(
        &mut self,
        loader: &dyn Loader,
        breaker: &mut Option<CircuitBreaker<C>>,
        batch: &[RawRecord],
    ) -> Vec<RecordOutcome> {
        let mut outcomes = Vec::with_capacity(batch.len());
        for raw in batch {
            let outcome = self.process_record(loader, breaker, raw).await;
            outcomes.push(outcome);
        }
        self.stats.total_processed += batch.len() as u64;
        outcomes
    }

    async fn process_record(
        &mut self,
        loader: &dyn Loader,
        breaker: &mut Option<CircuitBreaker<C>>,
        raw: &RawRecord,
    ) -> RecordOutcome {
        let record_id = loader.record_id(raw);
        let record_tag = record_id.as_deref().unwrap_or("unknown");

        // Parse.
        let parsed = match loader.parse_record(raw) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => {
                self.stats.skipped += 1;
                return RecordOutcome::Skipped;
            }
            Err(error) => {
                tracing::error!(record = record_tag, %error, "parse error");
                self.stats.failed += 1;
                self.enqueue_failed(raw, "ParseError", &error.to_string()).await;
                return RecordOutcome::ParseError(error.to_string());
            }
        };

        // Validate.
        let errors = loader.validate_record(&parsed);
        if !errors.is_empty() {
            tracing::warn!(record = record_tag, ?errors, "validation errors");
            self.stats.failed += 1;
            let issue = QualityIssue {
                source_record_id: record_id.clone(),
                issue_type: "validation_error".to_string(),
                severity: gl_core::IssueSeverity::Warning,
                field_name: None,
                invalid_value: None,
                expected_format: None,
                message: errors.join("; "),
                raw_record: Some(serde_json::Value::Object(raw.clone())),
            };
            self.hooks.issue(issue).await;
            return RecordOutcome::ValidationError(errors);
        }

        // Gate through the breaker, then process.
        if let Some(breaker) = breaker.as_mut() {
            if let Err(open) = breaker.preflight() {
                self.stats.failed += 1;
                return RecordOutcome::ProcessingError(open.to_string());
            }
        }
        let responses = match loader.process_record(&self.client, &parsed).await {
            Ok(responses) => {
                if let Some(breaker) = breaker.as_mut() {
                    breaker.on_success();
                }
                responses
            }
            Err(error) => {
                if let Some(breaker) = breaker.as_mut() {
                    breaker.on_failure();
                }
                tracing::error!(record = record_tag, %error, "processing error");
                self.stats.failed += 1;
                self.enqueue_failed(raw, "ProcessError", &error.to_string()).await;
                return RecordOutcome::ProcessingError(error.to_string());
            }
        };

        // Count conflicts either way; a conflict is still a success.
        let conflicted = responses.iter().filter(|r| r.has_conflicts()).count() as u64;
        self.stats.conflicts_detected += conflicted;

        if responses.iter().all(|r| r.success) {
            self.stats.successful += 1;
            self.stats.entities_created += responses.len() as u64;
            self.stats.relationships_created += responses.len() as u64;
            RecordOutcome::Ok { responses: responses.len() }
        } else {
            self.stats.failed += 1;
            if self.stats.failed <= DETAILED_FAILURE_LOGS {
                for failed in responses.iter().filter(|r| !r.success) {
                    tracing::error!(
                        record = record_tag,
                        status = %failed.status,
                        error = failed.error_message.as_deref().unwrap_or("unknown"),
                        conflicts = failed.conflicts.len(),
                        "propose failure"
                    );
                }
            }
            let message = responses
                .iter()
                .filter(|r| !r.success)
                .filter_map(|r| r.error_message.clone())
                .collect::<Vec<_>>()
                .join("; ");
            RecordOutcome::ProcessingError(message)
        }
    }

    async fn register_source(
        &mut self,
        loader: &dyn Loader,
        file_path: &Path,
    ) -> Result<Option<String>, RunError> {
        let descriptor = loader.descriptor();
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_hash = crate::hash::sha256_file(file_path)?;
        let metadata = std::fs::metadata(file_path)?;
        let version = version_from_filename(&file_name).unwrap_or_else(|| {
            let mtime: chrono::DateTime<chrono::Utc> =
                metadata.modified().map(Into::into).unwrap_or_else(|_| chrono::Utc::now());
            version_from_datetime(mtime)
        });

        tracing::info!(
            file = %file_name,
            version = %version,
            hash_prefix = &file_hash[..12],
            size = metadata.len(),
            "source identity"
        );

        if let Some(existing) =
            self.sources.find_by_hash(&descriptor.source_type, &file_hash).await?
        {
            if existing.status == "completed" {
                tracing::info!(
                    imported = existing.records_imported,
                    "file already processed; short-circuiting"
                );
                return Ok(None);
            }
            tracing::info!(
                records_processed = existing.records_processed,
                "adopting in-progress source for resume"
            );
            self.stats = LoadStats::resume_from(&SourceCounters {
                records_processed: existing.records_processed,
                records_imported: existing.records_imported,
                records_failed: existing.records_failed,
                records_skipped: existing.records_skipped,
            });
            return Ok(Some(existing.source_id));
        }

        let source_id = self
            .sources
            .insert_processing(
                &self.clock,
                &NewSource {
                    source_type: descriptor.source_type.clone(),
                    source_name: descriptor.source_name.clone(),
                    source_version: version,
                    file_name,
                    file_hash,
                    file_size_bytes: metadata.len() as i64,
                },
            )
            .await?;
        tracing::info!(source_id = %source_id, "created source record");
        Ok(Some(source_id))
    }

    async fn save_checkpoint(&mut self, cursor: u64) -> Result<(), RunError> {
        let Some(source_id) = self.source_id.clone() else {
            return Ok(());
        };
        self.sources
            .update_counters(&source_id, &self.stats.as_source_counters(cursor))
            .await?;
        self.hooks
            .checkpoint(&serde_json::json!({ "records_processed": cursor }))
            .await;
        self.stats.checkpoints_saved += 1;
        self.last_checkpoint = cursor;
        tracing::debug!(cursor, "checkpoint saved");
        Ok(())
    }

    async fn enqueue_failed(&self, raw: &RawRecord, error_type: &str, message: &str) {
        let Some(source_id) = &self.source_id else {
            return;
        };
        let record = NewFailedRecord {
            source_id: source_id.clone(),
            source_type: self.source_type.clone(),
            record_data: serde_json::Value::Object(raw.clone()),
            error_message: message.to_string(),
            error_type: error_type.to_string(),
            error_details: None,
        };
        if let Err(error) = self.dlq.add(&self.clock, &record).await {
            tracing::error!(%error, "failed to enqueue DLQ record");
        }
    }

    async fn log(&self, level: LogLevel, message: String, metadata: Option<serde_json::Value>) {
        let mut entry = StructuredLog::info(message).level(level);
        if let Some(metadata) = metadata {
            entry = entry.metadata(metadata);
        }
        self.hooks.log(entry).await;
    }
}
