// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry policy and circuit breaker.
//!
//! Both are pure state machines: the policy computes delays and the breaker
//! decides whether a call may proceed. Sleeping happens at the call site, so
//! the timing behavior is testable against [`FakeClock`](crate::clock::FakeClock).

use crate::clock::Clock;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Exponential-backoff retry policy: attempt `n` (zero-based) sleeps
/// `delay × backoff^n` before the next try.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
    pub backoff: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3, delay: Duration::from_secs(1), backoff: 2.0 }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration, backoff: f64) -> Self {
        Self { max_retries, delay, backoff }
    }

    /// Delay to sleep after a failed attempt (zero-based attempt index).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay.mul_f64(self.backoff.powi(attempt as i32))
    }

    /// Linear variant used by the connection pool: `delay × attempt`
    /// (one-based attempt number).
    pub fn linear_delay_for(&self, attempt: u32) -> Duration {
        self.delay * attempt
    }

    /// Total attempts permitted (the first call plus retries).
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

crate::simple_display! {
    BreakerState {
        Closed => "closed",
        Open => "open",
        HalfOpen => "half_open",
    }
}

/// Error returned while the circuit is open.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("circuit open after {failures} consecutive failures; retry after {timeout_secs}s")]
pub struct CircuitOpen {
    pub failures: u32,
    pub timeout_secs: u64,
}

/// Call-gating state machine that fails fast after sustained failure.
///
/// Usage: `preflight()` before each guarded call, then exactly one of
/// `on_success()` / `on_failure()` with the call's outcome.
#[derive(Debug, Clone)]
pub struct CircuitBreaker<C: Clock> {
    failure_threshold: u32,
    timeout: Duration,
    failure_count: u32,
    last_failure: Option<Instant>,
    state: BreakerState,
    clock: C,
}

impl<C: Clock> CircuitBreaker<C> {
    pub fn new(failure_threshold: u32, timeout: Duration, clock: C) -> Self {
        Self {
            failure_threshold,
            timeout,
            failure_count: 0,
            last_failure: None,
            state: BreakerState::Closed,
            clock,
        }
    }

    pub fn state(&self) -> BreakerState {
        self.state
    }

    /// Gate a call. In `Open`, fails fast until the timeout has elapsed, at
    /// which point the breaker moves to `HalfOpen` and admits one call.
    pub fn preflight(&mut self) -> Result<(), CircuitOpen> {
        if self.state == BreakerState::Open {
            if self.timeout_elapsed() {
                self.state = BreakerState::HalfOpen;
                tracing::info!("circuit breaker entering half-open state");
            } else {
                return Err(CircuitOpen {
                    failures: self.failure_count,
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        }
        Ok(())
    }

    /// Record a successful guarded call.
    pub fn on_success(&mut self) {
        if self.state == BreakerState::HalfOpen {
            tracing::info!("circuit breaker closed after successful call");
        }
        self.state = BreakerState::Closed;
        self.failure_count = 0;
        self.last_failure = None;
    }

    /// Record a failed guarded call.
    pub fn on_failure(&mut self) {
        self.failure_count += 1;
        self.last_failure = Some(self.clock.now());

        if self.state == BreakerState::HalfOpen || self.failure_count >= self.failure_threshold {
            if self.state != BreakerState::Open {
                tracing::warn!(
                    failures = self.failure_count,
                    timeout_secs = self.timeout.as_secs(),
                    "circuit breaker opened"
                );
            }
            self.state = BreakerState::Open;
        }
    }

    /// Manually reset to `Closed` with counters cleared.
    pub fn reset(&mut self) {
        self.state = BreakerState::Closed;
        self.failure_count = 0;
        self.last_failure = None;
    }

    fn timeout_elapsed(&self) -> bool {
        match self.last_failure {
            Some(at) => self.clock.now().duration_since(at) >= self.timeout,
            None => true,
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
