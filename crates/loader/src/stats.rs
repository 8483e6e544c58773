// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Running counters for a load.

use gl_core::source::SourceCounters;
use serde::{Deserialize, Serialize};

/// Statistics accumulated over one loader run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    pub total_processed: u64,
    pub successful: u64,
    pub failed: u64,
    pub skipped: u64,
    pub entities_created: u64,
    pub relationships_created: u64,
    pub conflicts_detected: u64,
    pub checkpoints_saved: u64,
}

impl LoadStats {
    /// Percentage of processed records that succeeded.
    pub fn success_rate(&self) -> f64 {
        if self.total_processed == 0 {
            0.0
        } else {
            self.successful as f64 / self.total_processed as f64 * 100.0
        }
    }

    /// Counter view persisted onto the source row at checkpoints. The
    /// cursor (records processed) is tracked by the runner, not here.
    pub fn as_source_counters(&self, cursor: u64) -> SourceCounters {
        SourceCounters {
            records_processed: cursor as i64,
            records_imported: self.successful as i64,
            records_failed: self.failed as i64,
            records_skipped: self.skipped as i64,
        }
    }

    /// Seed counters from a partially processed source row on resume.
    pub fn resume_from(counters: &SourceCounters) -> Self {
        Self {
            total_processed: counters.records_processed.max(0) as u64,
            successful: counters.records_imported.max(0) as u64,
            failed: counters.records_failed.max(0) as u64,
            skipped: counters.records_skipped.max(0) as u64,
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
