// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The callbacks a running job gets from the worker.
//!
//! Checkpoints mirror the loader's cursor onto the job row; logs go to both
//! the `job_logs` table and the telemetry sink; data-quality issues are
//! persisted with pending resolution. All of it is best-effort: a hook
//! failure is logged, never propagated into the pipeline.

use async_trait::async_trait;
use gl_core::{QualityIssue, SystemClock};
use gl_loader::RunHooks;
use gl_store::{IssueStore, JobLogStore, JobStore};
use gl_telemetry::{BatchedLogger, StructuredLog};

pub struct JobHooks {
    pub jobs: JobStore,
    pub logs: JobLogStore,
    pub issues: IssueStore,
    pub telemetry: BatchedLogger,
    pub job_id: String,
    pub worker_id: String,
    pub clock: SystemClock,
}

#[async_trait]
impl RunHooks for JobHooks {
    async fn checkpoint(&self, cursor: &serde_json::Value) {
        if let Err(error) = self.jobs.save_checkpoint(&self.job_id, cursor).await {
            tracing::error!(%error, job_id = %self.job_id, "checkpoint write failed");
        } else {
            tracing::debug!(job_id = %self.job_id, ?cursor, "checkpoint saved");
        }
    }

    async fn log(&self, entry: StructuredLog) {
        let entry = entry.job_id(self.job_id.clone()).worker_id(self.worker_id.clone());
        if let Err(error) = self
            .logs
            .append(
                &self.clock,
                &self.job_id,
                entry.level.as_str(),
                &entry.message,
                entry.metadata.as_ref(),
            )
            .await
        {
            tracing::error!(%error, job_id = %self.job_id, "job log write failed");
        }
        self.telemetry.log(&self.clock, entry).await;
    }

    async fn issue(&self, issue: QualityIssue) {
        if let Err(error) = self.issues.insert(&self.clock, &self.job_id, &issue).await {
            tracing::error!(%error, job_id = %self.job_id, "data-quality issue write failed");
        }
    }
}
