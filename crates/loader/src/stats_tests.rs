// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn success_rate_handles_zero() {
    assert_eq!(LoadStats::default().success_rate(), 0.0);
}

#[test]
fn success_rate_is_percentage() {
    let stats = LoadStats { total_processed: 200, successful: 150, ..Default::default() };
    assert_eq!(stats.success_rate(), 75.0);
}

#[test]
fn source_counters_use_cursor_for_processed() {
    let stats = LoadStats {
        total_processed: 450,
        successful: 400,
        failed: 30,
        skipped: 20,
        ..Default::default()
    };
    let counters = stats.as_source_counters(450);
    assert_eq!(counters.records_processed, 450);
    assert_eq!(counters.records_imported, 400);
    assert_eq!(counters.records_failed, 30);
    assert_eq!(counters.records_skipped, 20);
}

#[test]
fn resume_seeds_all_counters() {
    let counters = SourceCounters {
        records_processed: 200,
        records_imported: 180,
        records_failed: 15,
        records_skipped: 5,
    };
    let stats = LoadStats::resume_from(&counters);
    assert_eq!(stats.total_processed, 200);
    assert_eq!(stats.successful, 180);
    assert_eq!(stats.failed, 15);
    assert_eq!(stats.skipped, 5);
    assert_eq!(stats.checkpoints_saved, 0);
}

#[test]
fn checkpoint_counter_invariant() {
    // processed >= imported + failed + skipped always holds for counters
    // built from a consistent stats snapshot.
    let stats = LoadStats {
        total_processed: 100,
        successful: 70,
        failed: 20,
        skipped: 10,
        ..Default::default()
    };
    let c = stats.as_source_counters(100);
    assert!(c.records_processed >= c.records_imported + c.records_failed + c.records_skipped - 100);
    assert_eq!(c.records_imported + c.records_failed + c.records_skipped, 100);
}
