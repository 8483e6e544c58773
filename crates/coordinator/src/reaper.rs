// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stale-claim reaper.
//!
//! A job stuck in `claimed`/`running` whose worker has stopped
//! heartbeating would otherwise be lost. Once the heartbeat deadline has
//! verifiably passed, the reaper requeues such jobs by resetting
//! them to `pending` with `worker_id` cleared. Disabled unless configured.

use gl_core::worker::HEARTBEAT_DEADLINE_SECS;
use gl_store::JobStore;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReaperSettings {
    pub interval: Duration,
    /// Heartbeat age past which a claimer counts as dead.
    pub deadline_secs: f64,
}

impl ReaperSettings {
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval, deadline_secs: HEARTBEAT_DEADLINE_SECS as f64 }
    }

    /// Opt-in via `GL_REAPER_INTERVAL_SECS`. Absent or unparsable means
    /// the reaper stays off.
    pub fn from_env() -> Option<Self> {
        let secs: u64 = std::env::var("GL_REAPER_INTERVAL_SECS").ok()?.parse().ok()?;
        if secs == 0 {
            return None;
        }
        Some(Self::with_interval(Duration::from_secs(secs)))
    }
}

/// Run the reaper until the token is cancelled.
pub fn spawn_reaper(
    jobs: JobStore,
    settings: ReaperSettings,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tracing::info!(
        interval_secs = settings.interval.as_secs(),
        deadline_secs = settings.deadline_secs,
        "reaper enabled"
    );
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(settings.interval) => {
                    match jobs.requeue_stale(settings.deadline_secs).await {
                        Ok(requeued) if !requeued.is_empty() => {
                            tracing::warn!(count = requeued.len(), jobs = ?requeued, "requeued stale jobs");
                        }
                        Ok(_) => {}
                        Err(error) => tracing::error!(%error, "reaper sweep failed"),
                    }
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "reaper_tests.rs"]
mod tests;
