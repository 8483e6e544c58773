// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gl-telemetry: batched structured-log emission.
//!
//! Workers buffer structured events in memory and flush them to an external
//! log service in batches, on size or on a wall-clock interval. The
//! transport is a trait object, so deployments can point the same batching
//! machinery at whatever sink they run.

pub mod batch;
pub mod sink;

pub use batch::{stream_name, BatchedLogger, StructuredLog};
pub use sink::{LogEvent, LogLevel, LogSink, SinkError, TracingSink};
