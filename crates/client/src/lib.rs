// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gl-client: typed client for the store's propose-fact API.
//!
//! Loaders go through [`ProposeClient`] for every fact they assert. The
//! client validates entity and relationship types against the taxonomy
//! before any round-trip and shapes the stored function's response into
//! [`ProposeResponse`](gl_core::ProposeResponse).

pub mod geo;
pub mod propose;

pub use geo::{normalize_name, GeoCache};
pub use propose::{ClientError, ProposeClient, UncheckedFact};
