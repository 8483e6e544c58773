// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The loader contract and the callback seam into the worker.

use crate::reader::RecordFormat;
use async_trait::async_trait;
use gl_client::ProposeClient;
use gl_core::{ProposeResponse, QualityIssue};
use gl_telemetry::StructuredLog;
use std::time::Duration;
use thiserror::Error;

/// A raw record as read from the input file: header/value pairs for CSV,
/// the object itself for JSON.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// A parsed record in the loader's own shape, as a JSON value so the
/// pipeline and DLQ can carry it without knowing the concrete type.
pub type ParsedRecord = serde_json::Value;

/// Parse failed with an exception (distinct from "parse declined the row").
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ParseError(pub String);

/// Processing failed before results were obtained.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ProcessError(pub String);

/// Outcome of one record's trip through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// Every propose response succeeded.
    Ok { responses: usize },
    /// Parse returned `None`: not an error, just not a row we load.
    Skipped,
    ParseError(String),
    ValidationError(Vec<String>),
    /// Processing threw, the breaker was open, or a response failed.
    ProcessingError(String),
}

impl RecordOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, RecordOutcome::Ok { .. })
    }
}

/// Circuit-breaker tuning for per-record proposals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSettings {
    pub failure_threshold: u32,
    pub timeout: Duration,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self { failure_threshold: 10, timeout: Duration::from_secs(60) }
    }
}

/// Static description of a loader: identity, input format, and tuning.
#[derive(Debug, Clone)]
pub struct LoaderDescriptor {
    pub source_type: String,
    pub source_name: String,
    pub format: RecordFormat,
    pub batch_size: usize,
    pub checkpoint_interval: u64,
    pub progress_interval: Duration,
    pub breaker: Option<BreakerSettings>,
}

impl LoaderDescriptor {
    pub fn new(source_type: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
            source_name: source_name.into(),
            format: RecordFormat::Csv,
            batch_size: 100,
            checkpoint_interval: 1000,
            progress_interval: Duration::from_secs(300),
            breaker: Some(BreakerSettings::default()),
        }
    }

    pub fn format(mut self, format: RecordFormat) -> Self {
        self.format = format;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn checkpoint_interval(mut self, interval: u64) -> Self {
        self.checkpoint_interval = interval.max(1);
        self
    }

    pub fn progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn breaker(mut self, settings: Option<BreakerSettings>) -> Self {
        self.breaker = settings;
        self
    }
}

/// A pluggable loader: pure parse and validate, impure process.
#[async_trait]
pub trait Loader: Send + Sync + std::fmt::Debug {
    fn descriptor(&self) -> &LoaderDescriptor;

    /// Pure transformation of a raw record. `Ok(None)` skips the row.
    fn parse_record(&self, raw: &RawRecord) -> Result<Option<ParsedRecord>, ParseError>;

    /// Pure validation; empty means valid.
    fn validate_record(&self, record: &ParsedRecord) -> Vec<String>;

    /// Propose the record's facts. One response per proposal.
    async fn process_record(
        &self,
        client: &ProposeClient,
        record: &ParsedRecord,
    ) -> Result<Vec<ProposeResponse>, ProcessError>;

    /// Identifier used in logs and data-quality issues for a raw record.
    fn record_id(&self, _raw: &RawRecord) -> Option<String> {
        None
    }
}

/// Callbacks the worker injects into a run.
///
/// All hooks are best-effort: implementations report their own failures and
/// never abort the pipeline.
#[async_trait]
pub trait RunHooks: Send + Sync {
    /// Progress was persisted; mirror the cursor onto the job row.
    async fn checkpoint(&self, cursor: &serde_json::Value);

    /// Emit a structured log line for the job.
    async fn log(&self, entry: StructuredLog);

    /// Record a data-quality issue.
    async fn issue(&self, issue: QualityIssue);
}

/// Hooks that do nothing; standalone runs use these.
pub struct NoopHooks;

#[async_trait]
impl RunHooks for NoopHooks {
    async fn checkpoint(&self, _cursor: &serde_json::Value) {}
    async fn log(&self, _entry: StructuredLog) {}
    async fn issue(&self, _issue: QualityIssue) {}
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
