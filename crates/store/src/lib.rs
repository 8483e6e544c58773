// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gl-store: Postgres persistence for the Gleaner platform.
//!
//! One repository module per table, all going through [`StorePool`],
//! a probed, retrying connection pool over the fact store. The schema
//! lives in `migrations/` and is embedded at build time.

pub mod config;
pub mod dlq;
pub mod issues;
pub mod jobs;
pub mod logs;
pub mod pool;
pub mod sources;
pub mod workers;

pub use config::{ConfigError, StoreConfig};
pub use dlq::{DlqStatistics, DlqStore, FailedRecordRow, NewFailedRecord};
pub use issues::{IssueRow, IssueStore};
pub use jobs::{claim_instruction, ClaimInstruction, JobRow, JobStatusRow, JobStore};
pub use logs::JobLogStore;
pub use pool::{is_transient_store_error, retry_transient, StoreError, StorePool};
pub use sources::{NewSource, SourceRow, SourceStore};
pub use workers::{WorkerRow, WorkerStore};
