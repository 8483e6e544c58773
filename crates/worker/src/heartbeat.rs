// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job heartbeat task.
//!
//! While a job runs, a concurrent task upserts the worker's registry row
//! (the authoritative liveness signal) and pings the coordinator for
//! monitoring. The task's lifetime is bound to the job: the runner cancels
//! it when execution finishes either way.

use crate::coordinator::CoordinatorClient;
use gl_store::WorkerStore;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(60);

pub struct HeartbeatTask {
    pub workers: WorkerStore,
    pub coordinator: CoordinatorClient,
    pub worker_id: String,
    pub hostname: String,
    pub capabilities: Vec<String>,
}

impl HeartbeatTask {
    /// Spawn the heartbeat loop for one job. Beats immediately, then every
    /// interval until cancelled.
    pub fn spawn(self, job_id: String, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                self.beat(&job_id).await;
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(HEARTBEAT_INTERVAL) => {}
                }
            }
        })
    }

    async fn beat(&self, job_id: &str) {
        if let Err(error) = self
            .workers
            .heartbeat(&self.worker_id, &self.hostname, &self.capabilities)
            .await
        {
            tracing::error!(%error, "heartbeat write failed");
        }
        self.coordinator.heartbeat(job_id, &self.worker_id).await;
    }
}
