// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level behavior specs.
//!
//! Cross-crate scenarios over the pure surfaces: identifier ordering, the
//! claim contract, breaker timing, registry discovery, and the file-side
//! half of the pipeline (parse → validate over batched reads with resume).

use gl_core::retry::{BreakerState, CircuitBreaker};
use gl_core::{Clock, FakeClock, InputSource, JobConfig, JobStatus, Ulid};
use gl_loader::{BatchReader, Loader, RecordFormat};
use gl_loaders::LoaderRegistry;
use gl_store::claim_instruction;
use std::io::Write;
use std::time::Duration;

// --- identifiers ---

#[test]
fn ulid_order_tracks_generation_time() {
    let clock = FakeClock::new();
    let mut ids: Vec<Ulid> = Vec::new();
    for _ in 0..50 {
        ids.push(Ulid::generate(&clock));
        clock.advance(Duration::from_millis(1));
    }
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(sorted, ids);
}

#[test]
fn ulid_embeds_its_generation_timestamp() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_722_470_400_000);
    let id = Ulid::generate(&clock);
    assert_eq!(id.timestamp_ms(), 1_722_470_400_000);
    assert_eq!(id.as_str().len(), 26);
}

// --- claim contract ---

#[test]
fn claim_instruction_is_a_guarded_conditional_update() {
    let instruction = claim_instruction("worker-rpi-001-1722470400", "01K6JOB");

    // The coordinator describes the mutation; the worker executes it. The
    // pending guard is what makes at most one racing claim succeed.
    assert!(instruction.sql.starts_with("UPDATE job_queue"));
    assert!(instruction.sql.contains("AND status = 'pending'"));
    assert_eq!(instruction.params.len(), 2);
    assert_eq!(instruction.params[0], "worker-rpi-001-1722470400");
    assert_eq!(instruction.params[1], "01K6JOB");
}

#[test]
fn job_status_transition_graph() {
    use JobStatus::*;
    let legal = [(Pending, Claimed), (Claimed, Running), (Running, Completed), (Running, Failed)];
    for (from, to) in legal {
        assert!(from.can_transition_to(to), "{from} -> {to} should be legal");
    }
    for terminal in [Completed, Failed] {
        for next in [Pending, Claimed, Running, Completed, Failed] {
            assert!(!terminal.can_transition_to(next));
        }
    }
}

// --- circuit breaker (spec scenario: threshold 3, timeout 60s) ---

#[test]
fn breaker_fails_fast_then_recovers() {
    let clock = FakeClock::new();
    let mut breaker = CircuitBreaker::new(3, Duration::from_secs(60), clock.clone());

    for _ in 0..3 {
        breaker.preflight().unwrap();
        breaker.on_failure();
    }
    assert_eq!(breaker.state(), BreakerState::Open);

    // Within the window every call fails fast, without reaching the store.
    clock.advance(Duration::from_secs(30));
    assert!(breaker.preflight().is_err());

    // After the window one probe call is admitted; success closes.
    clock.advance(Duration::from_secs(30));
    breaker.preflight().unwrap();
    assert_eq!(breaker.state(), BreakerState::HalfOpen);
    breaker.on_success();
    assert_eq!(breaker.state(), BreakerState::Closed);
}

// --- job config / input acquisition contract ---

#[test]
fn happy_claim_config_parses() {
    let config: JobConfig = serde_json::from_value(serde_json::json!({
        "input": {"file_path": "/tmp/a.csv"},
        "processing": {"limit": 10}
    }))
    .unwrap();
    assert_eq!(config.input.resolve().unwrap(), InputSource::LocalPath("/tmp/a.csv".into()));
    assert_eq!(config.processing.limit, Some(10));
}

// --- plugin discovery ---

#[test]
fn registry_resolves_every_builtin_capability() {
    let registry = LoaderRegistry::with_builtin();
    for job_type in registry.job_types() {
        let loader = registry.resolve(&job_type, &serde_json::json!({})).unwrap();
        assert_eq!(loader.descriptor().source_type, job_type);
    }
}

#[test]
fn registry_miss_names_both_search_paths() {
    let registry = LoaderRegistry::with_builtin();
    let message = registry
        .resolve("nebraska_business", &serde_json::json!({}))
        .unwrap_err()
        .to_string();
    assert!(message.contains("nebraska_business"));
    assert!(message.contains("nebraska_business_loader"));
}

// --- pipeline file side: batched reads, parse purity, resume ---

fn business_csv(rows: usize) -> tempfile::NamedTempFile {
    let mut contents =
        String::from("Corp Number,Legal Name,Corporation Type,Effective Date\n");
    for i in 0..rows {
        contents.push_str(&format!("X{i},Company {i} LLC,Domestic LLC,03/15/2019\n"));
    }
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn parse_is_pure_and_idempotent_per_record() {
    let registry = LoaderRegistry::with_builtin();
    let loader = registry.resolve("iowa_business", &serde_json::json!({})).unwrap();

    let file = business_csv(5);
    let reader = BatchReader::open(file.path(), RecordFormat::Csv, 2, 0).unwrap();
    for batch in reader {
        for raw in batch.unwrap() {
            let first = loader.parse_record(&raw).unwrap().unwrap();
            let second = loader.parse_record(&raw).unwrap().unwrap();
            assert_eq!(first, second);
            assert!(loader.validate_record(&first).is_empty());
        }
    }
}

#[test]
fn resume_processes_exactly_the_remaining_records() {
    let registry = LoaderRegistry::with_builtin();
    let loader = registry.resolve("iowa_business", &serde_json::json!({})).unwrap();

    let file = business_csv(1000);
    // A prior run checkpointed at 300; the restart must start at record 300
    // and see 700 records, never re-emitting anything below the cursor.
    let reader = BatchReader::open(file.path(), RecordFormat::Csv, 100, 300).unwrap();
    let mut seen = 0u64;
    let mut first_id = None;
    for batch in reader {
        for raw in batch.unwrap() {
            if first_id.is_none() {
                first_id = loader.record_id(&raw);
            }
            seen += 1;
        }
    }
    assert_eq!(seen, 700);
    assert_eq!(first_id.as_deref(), Some("X300"));
}

// --- worker identity ---

#[test]
fn worker_id_convention() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_722_470_400_123);
    let id = gl_core::WorkerId::derive("rpi-001", clock.epoch_ms());
    assert_eq!(id.as_str(), "worker-rpi-001-1722470400");
}
