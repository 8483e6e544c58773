// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store configuration from the environment.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

/// Connection settings for the fact store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    /// Reported to Postgres as application_name (the worker id, typically).
    pub application_name: Option<String>,
    pub min_connections: u32,
    pub max_connections: u32,
}

impl StoreConfig {
    /// Load from `DB_HOST`, `DB_NAME`, `DB_USER`, `DB_PASSWORD`, `DB_PORT`.
    ///
    /// Host and password are required; the rest have the conventional
    /// defaults. Missing credentials are a startup error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = required("DB_HOST")?;
        let password = required("DB_PASSWORD")?;
        let database = optional("DB_NAME").unwrap_or_else(|| "graph_db".to_string());
        let user = optional("DB_USER").unwrap_or_else(|| "graph_admin".to_string());
        let port = match optional("DB_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidVar { var: "DB_PORT", value: raw })?,
            None => 5432,
        };

        Ok(Self {
            host,
            port,
            database,
            user,
            password,
            application_name: None,
            min_connections: 1,
            max_connections: 10,
        })
    }

    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn pool_size(mut self, min: u32, max: u32) -> Self {
        self.min_connections = min;
        self.max_connections = max;
        self
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    optional(var).ok_or(ConfigError::MissingVar(var))
}

fn optional(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
