// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;

fn breaker(threshold: u32, timeout_secs: u64) -> (CircuitBreaker<FakeClock>, FakeClock) {
    let clock = FakeClock::new();
    (CircuitBreaker::new(threshold, Duration::from_secs(timeout_secs), clock.clone()), clock)
}

#[test]
fn closed_passes_through() {
    let (mut cb, _clock) = breaker(3, 60);
    assert_eq!(cb.state(), BreakerState::Closed);
    assert!(cb.preflight().is_ok());
}

#[test]
fn opens_after_threshold_consecutive_failures() {
    let (mut cb, _clock) = breaker(3, 60);
    for _ in 0..2 {
        cb.preflight().unwrap();
        cb.on_failure();
        assert_eq!(cb.state(), BreakerState::Closed);
    }
    cb.preflight().unwrap();
    cb.on_failure();
    assert_eq!(cb.state(), BreakerState::Open);
}

#[test]
fn open_fails_fast_until_timeout() {
    let (mut cb, clock) = breaker(3, 60);
    for _ in 0..3 {
        cb.preflight().unwrap();
        cb.on_failure();
    }

    let err = cb.preflight().unwrap_err();
    assert_eq!(err, CircuitOpen { failures: 3, timeout_secs: 60 });

    clock.advance(Duration::from_secs(59));
    assert!(cb.preflight().is_err());

    clock.advance(Duration::from_secs(1));
    assert!(cb.preflight().is_ok());
    assert_eq!(cb.state(), BreakerState::HalfOpen);
}

#[test]
fn half_open_success_closes_and_resets_counter() {
    let (mut cb, clock) = breaker(2, 10);
    cb.preflight().unwrap();
    cb.on_failure();
    cb.preflight().unwrap();
    cb.on_failure();
    clock.advance(Duration::from_secs(10));

    cb.preflight().unwrap();
    cb.on_success();
    assert_eq!(cb.state(), BreakerState::Closed);

    // Counter was reset: one more failure does not re-open.
    cb.preflight().unwrap();
    cb.on_failure();
    assert_eq!(cb.state(), BreakerState::Closed);
}

#[test]
fn half_open_failure_reopens_with_fresh_timeout() {
    let (mut cb, clock) = breaker(2, 10);
    cb.on_failure();
    cb.on_failure();
    clock.advance(Duration::from_secs(10));

    cb.preflight().unwrap();
    cb.on_failure();
    assert_eq!(cb.state(), BreakerState::Open);

    // Failure time was refreshed: still open 9s later.
    clock.advance(Duration::from_secs(9));
    assert!(cb.preflight().is_err());
    clock.advance(Duration::from_secs(1));
    assert!(cb.preflight().is_ok());
}

#[test]
fn success_interrupts_failure_streak() {
    let (mut cb, _clock) = breaker(3, 60);
    cb.on_failure();
    cb.on_failure();
    cb.on_success();
    cb.on_failure();
    cb.on_failure();
    assert_eq!(cb.state(), BreakerState::Closed);
}

#[test]
fn manual_reset() {
    let (mut cb, _clock) = breaker(1, 60);
    cb.on_failure();
    assert_eq!(cb.state(), BreakerState::Open);
    cb.reset();
    assert_eq!(cb.state(), BreakerState::Closed);
    assert!(cb.preflight().is_ok());
}

// --- RetryPolicy ---

#[test]
fn exponential_delays() {
    let policy = RetryPolicy::new(3, Duration::from_secs(1), 2.0);
    assert_eq!(policy.delay_for(0), Duration::from_secs(1));
    assert_eq!(policy.delay_for(1), Duration::from_secs(2));
    assert_eq!(policy.delay_for(2), Duration::from_secs(4));
}

#[test]
fn linear_delays() {
    let policy = RetryPolicy::new(3, Duration::from_millis(500), 2.0);
    assert_eq!(policy.linear_delay_for(1), Duration::from_millis(500));
    assert_eq!(policy.linear_delay_for(3), Duration::from_millis(1500));
}

#[test]
fn max_attempts_counts_first_call() {
    assert_eq!(RetryPolicy::default().max_attempts(), 4);
}
