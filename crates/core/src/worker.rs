// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identity, status, and liveness.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// A worker is considered live while its last heartbeat is younger than this.
pub const HEARTBEAT_DEADLINE_SECS: i64 = 180;

/// Unique identifier for a worker process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub String);

impl WorkerId {
    /// Create a WorkerId from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the conventional id for a worker process: `worker-{host}-{epoch_secs}`.
    pub fn derive(hostname: &str, epoch_ms: u64) -> Self {
        Self(format!("worker-{}-{}", hostname, epoch_ms / 1000))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WorkerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for WorkerId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl Borrow<str> for WorkerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Registry status of a worker row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Active,
    Idle,
    Dead,
}

impl WorkerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerStatus::Active => "active",
            WorkerStatus::Idle => "idle",
            WorkerStatus::Dead => "dead",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(WorkerStatus::Active),
            "idle" => Some(WorkerStatus::Idle),
            "dead" => Some(WorkerStatus::Dead),
            _ => None,
        }
    }
}

crate::simple_display! {
    WorkerStatus {
        Active => "active",
        Idle => "idle",
        Dead => "dead",
    }
}

/// Whether a heartbeat stamped at `last_heartbeat_ms` is still live at `now_ms`.
pub fn is_live(last_heartbeat_ms: u64, now_ms: u64) -> bool {
    now_ms.saturating_sub(last_heartbeat_ms) < (HEARTBEAT_DEADLINE_SECS as u64) * 1000
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
