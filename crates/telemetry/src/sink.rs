// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log sink trait and the in-tree tracing-backed sink.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Log level of a structured event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }

    /// Case-insensitive parse; unknown levels degrade to `Info`.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => LogLevel::Debug,
            "WARNING" | "WARN" => LogLevel::Warning,
            "ERROR" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

gl_core::simple_display! {
    LogLevel {
        Debug => "DEBUG",
        Info => "INFO",
        Warning => "WARNING",
        Error => "ERROR",
    }
}

/// One buffered event: a millisecond timestamp plus the serialized payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp_ms: u64,
    pub payload: String,
}

#[derive(Debug, Error)]
pub enum SinkError {
    /// The service rejected the flush because the sequence token was stale.
    /// `expected` carries the token the service reported, when it did.
    #[error("sequence token out of order")]
    InvalidSequenceToken { expected: Option<String> },
    #[error("log transport failed: {0}")]
    Transport(String),
}

/// Transport for a batch of events. One call per flush.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Emit a batch to the named stream. Returns the next sequence token if
    /// the service uses them.
    async fn emit(
        &self,
        stream: &str,
        events: &[LogEvent],
        sequence_token: Option<&str>,
    ) -> Result<Option<String>, SinkError>;
}

/// Sink that re-emits events through `tracing`. The default when no
/// external log service is configured.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

#[async_trait]
impl LogSink for TracingSink {
    async fn emit(
        &self,
        stream: &str,
        events: &[LogEvent],
        _sequence_token: Option<&str>,
    ) -> Result<Option<String>, SinkError> {
        for event in events {
            tracing::info!(target: "gleaner::telemetry", stream, payload = %event.payload);
        }
        Ok(None)
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
