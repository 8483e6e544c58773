// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker process configuration.

use clap::Parser;
use gl_core::{Clock, SystemClock, WorkerId};
use std::time::Duration;

/// Distributed loader worker.
#[derive(Debug, Parser)]
#[command(name = "gleaner-worker")]
pub struct WorkerArgs {
    /// Coordinator base URL.
    #[arg(long, env = "COORDINATOR_URL")]
    pub coordinator_url: String,

    /// Worker id (derived from the hostname if not provided).
    #[arg(long)]
    pub worker_id: Option<String>,

    /// Job types this worker can handle (defaults to every built-in loader).
    #[arg(long, value_delimiter = ',')]
    pub capabilities: Vec<String>,

    /// Seconds to sleep when no jobs are available.
    #[arg(long, default_value_t = 30)]
    pub poll_interval_secs: u64,

    /// Exit after the first claim attempt (with or without a job).
    #[arg(long, default_value_t = false)]
    pub once: bool,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub coordinator_url: String,
    pub worker_id: WorkerId,
    pub hostname: String,
    pub capabilities: Vec<String>,
    pub poll_interval: Duration,
    pub once: bool,
}

impl WorkerConfig {
    /// Resolve CLI arguments into a runnable config. `default_capabilities`
    /// comes from the loader registry when the flag is omitted.
    pub fn from_args(args: WorkerArgs, default_capabilities: Vec<String>) -> Self {
        let hostname = gethostname::gethostname().to_string_lossy().into_owned();
        let worker_id = match args.worker_id {
            Some(id) => WorkerId::new(id),
            None => WorkerId::derive(&hostname, SystemClock.epoch_ms()),
        };
        let capabilities = if args.capabilities.is_empty() {
            default_capabilities
        } else {
            args.capabilities
        };

        Self {
            coordinator_url: args.coordinator_url.trim_end_matches('/').to_string(),
            worker_id,
            hostname,
            capabilities,
            poll_interval: Duration::from_secs(args.poll_interval_secs.max(1)),
            once: args.once,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
