// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Windowed progress reporting.

use crate::stats::LoadStats;
use gl_core::Clock;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// One progress window's metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub window_records: u64,
    pub window_secs: f64,
    /// Instantaneous velocity over the window, in records per minute.
    pub velocity_per_min: f64,
    pub total_processed: u64,
    pub successful: u64,
    pub failed: u64,
    pub skipped: u64,
    pub success_rate: f64,
}

impl ProgressReport {
    pub fn to_metadata(&self) -> serde_json::Value {
        serde_json::json!({
            "window_records": self.window_records,
            "window_secs": self.window_secs,
            "velocity_per_min": self.velocity_per_min,
            "total_processed": self.total_processed,
            "successful": self.successful,
            "failed": self.failed,
            "skipped": self.skipped,
            "success_rate": self.success_rate,
        })
    }
}

impl std::fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "processed {} records in last {:.1} min (velocity: {:.1} rec/min) | \
             total: {} | success: {} ({:.1}%) | failed: {} | skipped: {}",
            self.window_records,
            self.window_secs / 60.0,
            self.velocity_per_min,
            self.total_processed,
            self.successful,
            self.success_rate,
            self.failed,
            self.skipped,
        )
    }
}

/// Emits a report once per wall-clock interval.
///
/// The first tick only establishes the window start; reports begin with the
/// second tick at or past the interval.
pub struct ProgressReporter<C: Clock> {
    clock: C,
    interval: Duration,
    last_report: Option<Instant>,
    last_count: u64,
}

impl<C: Clock> ProgressReporter<C> {
    pub fn new(clock: C, interval: Duration) -> Self {
        Self { clock, interval, last_report: None, last_count: 0 }
    }

    /// Check the clock; returns a report when the interval has elapsed
    /// (or when forced).
    pub fn tick(&mut self, stats: &LoadStats, force: bool) -> Option<ProgressReport> {
        let now = self.clock.now();
        let Some(last) = self.last_report else {
            self.last_report = Some(now);
            self.last_count = stats.total_processed;
            return None;
        };

        let elapsed = now.duration_since(last);
        if !force && elapsed < self.interval {
            return None;
        }

        let window_secs = elapsed.as_secs_f64();
        let window_records = stats.total_processed.saturating_sub(self.last_count);
        let velocity_per_min = if window_secs > 0.0 {
            window_records as f64 / window_secs * 60.0
        } else {
            0.0
        };

        self.last_report = Some(now);
        self.last_count = stats.total_processed;

        Some(ProgressReport {
            window_records,
            window_secs,
            velocity_per_min,
            total_processed: stats.total_processed,
            successful: stats.successful,
            failed: stats.failed,
            skipped: stats.skipped,
            success_rate: stats.success_rate(),
        })
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
