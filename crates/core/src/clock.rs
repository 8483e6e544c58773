// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction.
//!
//! Everything time-sensitive (ULID stamps, breaker timeouts, progress
//! windows, heartbeat ages) reads the clock through this trait so tests
//! can drive time explicitly.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A source of monotonic and wall-clock time.
pub trait Clock: Clone + Send + Sync {
    /// Monotonic instant, for durations and timeouts.
    fn now(&self) -> Instant;
    /// Milliseconds since the Unix epoch, for stamps that persist.
    fn epoch_ms(&self) -> u64;
}

/// The real clocks.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Controllable clock for tests. Both views advance together.
#[derive(Clone)]
pub struct FakeClock {
    state: Arc<Mutex<FakeState>>,
}

struct FakeState {
    instant: Instant,
    epoch_ms: u64,
}

impl FakeClock {
    /// Starts at an arbitrary fixed epoch (late 2023).
    pub fn new() -> Self {
        Self::at(1_700_000_000_000)
    }

    /// Start at a specific epoch-milliseconds value.
    pub fn at(epoch_ms: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState { instant: Instant::now(), epoch_ms })),
        }
    }

    /// Advance both views by the given duration.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.instant += duration;
        state.epoch_ms += duration.as_millis() as u64;
    }

    /// Jump the epoch view (the monotonic view is unaffected).
    pub fn set_epoch_ms(&self, epoch_ms: u64) {
        self.state.lock().epoch_ms = epoch_ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.state.lock().instant
    }

    fn epoch_ms(&self) -> u64 {
        self.state.lock().epoch_ms
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
