// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job status state machine and job configuration blobs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of a queued job.
///
/// Transitions follow `pending → claimed → running → (completed | failed)`.
/// A reaper may return `claimed`/`running` back to `pending` after the
/// claiming worker's heartbeat goes stale; nothing else moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Claimed,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Claimed => "claimed",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "claimed" => Some(JobStatus::Claimed),
            "running" => Some(JobStatus::Running),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether the forward transition graph permits `self → next`.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Claimed)
                | (JobStatus::Claimed, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
                | (JobStatus::Claimed, JobStatus::Failed)
        )
    }
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Claimed => "claimed",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Configuration blob submitted with a job.
///
/// This is the `config` column of the job row, deserialized. Unknown keys are
/// preserved round-trip by the store (the row keeps the raw JSON); this type
/// only names the sections the runtime interprets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub input: InputSpec,
    #[serde(default)]
    pub processing: ProcessingSpec,
}

/// Where the input artifact lives. Exactly one variant must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_key: Option<String>,
}

/// A resolved, unambiguous input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    LocalPath(String),
    Url(String),
    S3 { bucket: String, key: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no input source configured: set input.file_path, input.url, or input.s3_bucket + input.s3_key")]
    MissingInput,
    #[error("ambiguous input source: more than one of file_path, url, s3 is set")]
    AmbiguousInput,
    #[error("input.s3_bucket and input.s3_key must be set together")]
    PartialS3,
    #[error("input.url must be http or https: {0}")]
    BadUrlScheme(String),
}

impl InputSpec {
    /// Resolve the spec into exactly one source, or a configuration error.
    pub fn resolve(&self) -> Result<InputSource, ConfigError> {
        let s3 = match (&self.s3_bucket, &self.s3_key) {
            (Some(bucket), Some(key)) => Some(InputSource::S3 {
                bucket: bucket.clone(),
                key: key.clone(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialS3),
        };

        let mut sources = Vec::new();
        if let Some(path) = &self.file_path {
            sources.push(InputSource::LocalPath(path.clone()));
        }
        if let Some(url) = &self.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::BadUrlScheme(url.clone()));
            }
            sources.push(InputSource::Url(url.clone()));
        }
        if let Some(s3) = s3 {
            sources.push(s3);
        }

        match sources.len() {
            0 => Err(ConfigError::MissingInput),
            1 => Ok(sources.remove(0)),
            _ => Err(ConfigError::AmbiguousInput),
        }
    }
}

/// Tuning knobs for a loader run. All optional; loaders supply defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_interval_secs: Option<u64>,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
