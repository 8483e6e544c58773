// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batched logger.
//!
//! Events accumulate in a mutex-guarded buffer and flush when either the
//! batch size is reached or the background flusher's interval fires. Each
//! flush is one sink call; a stale sequence token is corrected from the
//! sink's report and the flush retried once; any other failure puts the
//! events back at the head of the buffer. Shutdown cancels the flusher and
//! drains synchronously.

use crate::sink::{LogEvent, LogLevel, LogSink, SinkError};
use chrono::{DateTime, NaiveDate, Utc};
use gl_core::Clock;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Name of the log stream for a worker on a given day:
/// `worker-YYYY-MM-DD[-worker_id]`.
pub fn stream_name(date: NaiveDate, worker_id: Option<&str>) -> String {
    match worker_id {
        Some(id) => format!("worker-{}-{}", date.format("%Y-%m-%d"), id),
        None => format!("worker-{}", date.format("%Y-%m-%d")),
    }
}

/// A structured event as callers log it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredLog {
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
}

impl StructuredLog {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Info,
            message: message.into(),
            metadata: None,
            job_id: None,
            worker_id: None,
        }
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn worker_id(mut self, worker_id: impl Into<String>) -> Self {
        self.worker_id = Some(worker_id.into());
        self
    }
}

struct Inner {
    sink: Box<dyn LogSink>,
    stream: String,
    batch_size: usize,
    buffer: Mutex<VecDeque<LogEvent>>,
    sequence_token: Mutex<Option<String>>,
    shutdown: CancellationToken,
}

/// Batched structured logger with a background flusher task.
#[derive(Clone)]
pub struct BatchedLogger {
    inner: Arc<Inner>,
    flusher: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,
    flush_interval: Duration,
}

impl BatchedLogger {
    pub fn new(
        sink: Box<dyn LogSink>,
        stream: impl Into<String>,
        batch_size: usize,
        flush_interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                sink,
                stream: stream.into(),
                batch_size: batch_size.max(1),
                buffer: Mutex::new(VecDeque::new()),
                sequence_token: Mutex::new(None),
                shutdown: CancellationToken::new(),
            }),
            flusher: Arc::new(Mutex::new(None)),
            flush_interval,
        }
    }

    /// Spawn the background flusher. Idempotent.
    pub fn start(&self) {
        let mut guard = self.flusher.lock();
        if guard.is_some() {
            return;
        }
        let inner = Arc::clone(&self.inner);
        let interval = self.flush_interval;
        *guard = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = inner.shutdown.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        flush_once(&inner).await;
                    }
                }
            }
        }));
    }

    /// Buffer one event; flushes inline when the batch size is reached.
    pub async fn log(&self, clock: &impl Clock, entry: StructuredLog) {
        let timestamp_ms = clock.epoch_ms();
        let payload = serde_json::json!({
            "timestamp": to_iso(timestamp_ms),
            "level": entry.level.as_str(),
            "message": entry.message,
            "log_stream": self.inner.stream,
            "metadata": entry.metadata,
            "job_id": entry.job_id,
            "worker_id": entry.worker_id,
        });

        let should_flush = {
            let mut buffer = self.inner.buffer.lock();
            buffer.push_back(LogEvent { timestamp_ms, payload: payload.to_string() });
            buffer.len() >= self.inner.batch_size
        };
        if should_flush {
            flush_once(&self.inner).await;
        }
    }

    /// Force a flush of one batch.
    pub async fn flush(&self) {
        flush_once(&self.inner).await;
    }

    /// Number of events currently buffered.
    pub fn buffered(&self) -> usize {
        self.inner.buffer.lock().len()
    }

    /// Stop the flusher and drain the buffer synchronously.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        let handle = self.flusher.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        // Final drain; stop if the sink keeps failing so shutdown terminates.
        while !self.inner.buffer.lock().is_empty() {
            if !flush_once(&self.inner).await {
                break;
            }
        }
    }
}

/// Flush up to one batch. Returns false when the sink failed and the events
/// were reinserted.
async fn flush_once(inner: &Inner) -> bool {
    let events: Vec<LogEvent> = {
        let mut buffer = inner.buffer.lock();
        let take = buffer.len().min(inner.batch_size);
        buffer.drain(..take).collect()
    };
    if events.is_empty() {
        return true;
    }

    let token = inner.sequence_token.lock().clone();
    match inner.sink.emit(&inner.stream, &events, token.as_deref()).await {
        Ok(next) => {
            *inner.sequence_token.lock() = next;
            true
        }
        Err(SinkError::InvalidSequenceToken { expected }) => {
            // Token drifted (another writer, service restart). Adopt the
            // reported token and retry the same batch once.
            *inner.sequence_token.lock() = expected.clone();
            match inner.sink.emit(&inner.stream, &events, expected.as_deref()).await {
                Ok(next) => {
                    *inner.sequence_token.lock() = next;
                    true
                }
                Err(error) => {
                    tracing::warn!(%error, "log flush failed after token correction");
                    reinsert(inner, events);
                    false
                }
            }
        }
        Err(error) => {
            tracing::warn!(%error, "log flush failed");
            reinsert(inner, events);
            false
        }
    }
}

fn reinsert(inner: &Inner, events: Vec<LogEvent>) {
    let mut buffer = inner.buffer.lock();
    for event in events.into_iter().rev() {
        buffer.push_front(event);
    }
}

fn to_iso(epoch_ms: u64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms as i64)
        .unwrap_or_default()
        .to_rfc3339()
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
