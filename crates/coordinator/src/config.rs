// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator process configuration.

use crate::reaper::ReaperSettings;
use std::net::SocketAddr;

const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub bind_addr: SocketAddr,
    pub reaper: Option<ReaperSettings>,
}

impl CoordinatorConfig {
    /// Load from the environment: `GL_COORDINATOR_BIND` for the listen
    /// address, `GL_REAPER_INTERVAL_SECS` to enable the reaper.
    pub fn from_env() -> Result<Self, String> {
        let bind = std::env::var("GL_COORDINATOR_BIND").unwrap_or_else(|_| DEFAULT_BIND.into());
        let bind_addr = bind
            .parse()
            .map_err(|_| format!("invalid GL_COORDINATOR_BIND: {:?}", bind))?;
        Ok(Self { bind_addr, reaper: ReaperSettings::from_env() })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
