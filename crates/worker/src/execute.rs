// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution of one claimed job.

use crate::config::WorkerConfig;
use crate::coordinator::{ClaimedJob, CoordinatorClient};
use crate::heartbeat::HeartbeatTask;
use crate::hooks::JobHooks;
use crate::input;
use gl_client::ProposeClient;
use gl_core::{JobConfig, SystemClock};
use gl_loader::{LoadRunner, RunError, RunOptions, RunOutcome};
use gl_loaders::{LoaderRegistry, RegistryError};
use gl_store::{IssueStore, JobLogStore, JobStore, StoreError, StorePool, WorkerStore};
use gl_telemetry::BatchedLogger;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Config(#[from] gl_core::ConfigError),
    #[error(transparent)]
    Input(#[from] crate::input::InputError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Everything job execution needs from the process.
pub struct Executor {
    pub pool: StorePool,
    pub registry: LoaderRegistry,
    pub coordinator: CoordinatorClient,
    pub telemetry: BatchedLogger,
    pub config: WorkerConfig,
}

impl Executor {
    /// Run a claimed job to a terminal state. The job row ends in
    /// `completed` or `failed`; errors are also returned for logging.
    pub async fn execute(&self, job: &ClaimedJob) -> Result<(), ExecuteError> {
        let jobs = JobStore::new(self.pool.clone());
        jobs.mark_running(&job.job_id).await?;

        let cancel = CancellationToken::new();
        let heartbeat = HeartbeatTask {
            workers: WorkerStore::new(self.pool.clone()),
            coordinator: self.coordinator.clone(),
            worker_id: self.config.worker_id.to_string(),
            hostname: self.config.hostname.clone(),
            capabilities: self.config.capabilities.clone(),
        }
        .spawn(job.job_id.clone(), cancel.clone());

        let result = self.execute_inner(&jobs, job).await;

        cancel.cancel();
        let _ = heartbeat.await;

        match &result {
            Ok(outcome) => {
                jobs.mark_completed(&job.job_id).await?;
                match outcome {
                    RunOutcome::AlreadyProcessed => {
                        tracing::info!(job_id = %job.job_id, "job completed (already processed)");
                    }
                    RunOutcome::Completed { source_id, stats } => {
                        tracing::info!(
                            job_id = %job.job_id,
                            source_id = %source_id,
                            processed = stats.total_processed,
                            successful = stats.successful,
                            failed = stats.failed,
                            "job completed"
                        );
                    }
                }
            }
            Err(error) => {
                tracing::error!(job_id = %job.job_id, %error, "job failed");
                jobs.mark_failed(&job.job_id, &error.to_string()).await?;
            }
        }

        result.map(|_| ())
    }

    async fn execute_inner(
        &self,
        jobs: &JobStore,
        job: &ClaimedJob,
    ) -> Result<RunOutcome, ExecuteError> {
        let loader = self.registry.resolve(&job.job_type, &job.config)?;
        let config: JobConfig = serde_json::from_value(job.config.clone()).unwrap_or_default();
        let source = config.input.resolve()?;
        let acquired = input::acquire(&source).await?;

        let hooks = Arc::new(JobHooks {
            jobs: jobs.clone(),
            logs: JobLogStore::new(self.pool.clone()),
            issues: IssueStore::new(self.pool.clone()),
            telemetry: self.telemetry.clone(),
            job_id: job.job_id.clone(),
            worker_id: self.config.worker_id.to_string(),
            clock: SystemClock,
        });

        let client = ProposeClient::new(self.pool.clone());
        let mut runner = LoadRunner::new(client, SystemClock, hooks);
        let options = RunOptions {
            limit: config.processing.limit,
            batch_size: config.processing.batch_size,
            checkpoint_interval: config.processing.checkpoint_interval,
        };

        let outcome = runner.run(loader.as_ref(), acquired.path(), options).await?;
        Ok(outcome)
    }
}
