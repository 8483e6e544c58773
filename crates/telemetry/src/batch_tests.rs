// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::sink::{LogSink, SinkError};
use async_trait::async_trait;
use gl_core::FakeClock;

/// Scripted sink: pops one behavior per emit and records what it saw.
#[derive(Default)]
struct ScriptedSink {
    script: Mutex<VecDeque<Behavior>>,
    calls: Mutex<Vec<(usize, Option<String>)>>,
}

enum Behavior {
    Ok(Option<String>),
    BadToken(Option<String>),
    Fail,
}

impl ScriptedSink {
    fn push(&self, behavior: Behavior) {
        self.script.lock().push_back(behavior);
    }

    fn calls(&self) -> Vec<(usize, Option<String>)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LogSink for Arc<ScriptedSink> {
    async fn emit(
        &self,
        _stream: &str,
        events: &[LogEvent],
        sequence_token: Option<&str>,
    ) -> Result<Option<String>, SinkError> {
        self.calls.lock().push((events.len(), sequence_token.map(String::from)));
        match self.script.lock().pop_front() {
            Some(Behavior::Ok(next)) => Ok(next),
            Some(Behavior::BadToken(expected)) => {
                Err(SinkError::InvalidSequenceToken { expected })
            }
            Some(Behavior::Fail) | None => Err(SinkError::Transport("down".into())),
        }
    }
}

fn logger_with(sink: Arc<ScriptedSink>, batch_size: usize) -> BatchedLogger {
    BatchedLogger::new(Box::new(sink), "worker-2026-08-01", batch_size, Duration::from_secs(5))
}

#[test]
fn stream_name_formats() {
    let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
    assert_eq!(stream_name(date, None), "worker-2026-08-01");
    assert_eq!(stream_name(date, Some("rpi-001")), "worker-2026-08-01-rpi-001");
}

#[tokio::test]
async fn flushes_when_batch_size_reached() {
    let sink = Arc::new(ScriptedSink::default());
    sink.push(Behavior::Ok(Some("tok-1".into())));
    let logger = logger_with(Arc::clone(&sink), 2);
    let clock = FakeClock::new();

    logger.log(&clock, StructuredLog::info("one")).await;
    assert_eq!(logger.buffered(), 1);
    assert!(sink.calls().is_empty());

    logger.log(&clock, StructuredLog::info("two")).await;
    assert_eq!(logger.buffered(), 0);
    assert_eq!(sink.calls(), vec![(2, None)]);
}

#[tokio::test]
async fn sequence_token_threads_through_flushes() {
    let sink = Arc::new(ScriptedSink::default());
    sink.push(Behavior::Ok(Some("tok-1".into())));
    sink.push(Behavior::Ok(Some("tok-2".into())));
    let logger = logger_with(Arc::clone(&sink), 1);
    let clock = FakeClock::new();

    logger.log(&clock, StructuredLog::info("one")).await;
    logger.log(&clock, StructuredLog::info("two")).await;

    let calls = sink.calls();
    assert_eq!(calls[0].1, None);
    assert_eq!(calls[1].1, Some("tok-1".into()));
}

#[tokio::test]
async fn stale_token_is_corrected_and_retried() {
    let sink = Arc::new(ScriptedSink::default());
    sink.push(Behavior::BadToken(Some("tok-9".into())));
    sink.push(Behavior::Ok(Some("tok-10".into())));
    let logger = logger_with(Arc::clone(&sink), 1);
    let clock = FakeClock::new();

    logger.log(&clock, StructuredLog::info("one")).await;

    let calls = sink.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].1, Some("tok-9".into()));
    assert_eq!(logger.buffered(), 0);
}

#[tokio::test]
async fn failed_flush_reinserts_at_head_in_order() {
    let sink = Arc::new(ScriptedSink::default());
    sink.push(Behavior::Fail);
    sink.push(Behavior::Ok(None));
    let logger = logger_with(Arc::clone(&sink), 2);
    let clock = FakeClock::new();

    logger.log(&clock, StructuredLog::info("one")).await;
    logger.log(&clock, StructuredLog::info("two")).await;
    assert_eq!(logger.buffered(), 2);

    // Next flush sends the same two events, oldest first.
    logger.flush().await;
    assert_eq!(logger.buffered(), 0);
    let buffer_order: Vec<usize> = sink.calls().iter().map(|(n, _)| *n).collect();
    assert_eq!(buffer_order, vec![2, 2]);
}

#[tokio::test]
async fn shutdown_drains_buffer() {
    let sink = Arc::new(ScriptedSink::default());
    sink.push(Behavior::Ok(None));
    sink.push(Behavior::Ok(None));
    let logger = logger_with(Arc::clone(&sink), 2);
    let clock = FakeClock::new();

    logger.start();
    logger.log(&clock, StructuredLog::info("one")).await;
    logger.log(&clock, StructuredLog::info("two")).await; // flushes batch 1
    logger.log(&clock, StructuredLog::info("three")).await;

    logger.shutdown().await;
    assert_eq!(logger.buffered(), 0);
}

#[tokio::test]
async fn shutdown_stops_on_persistent_sink_failure() {
    let sink = Arc::new(ScriptedSink::default());
    let logger = logger_with(Arc::clone(&sink), 10);
    let clock = FakeClock::new();

    logger.log(&clock, StructuredLog::info("stuck")).await;
    logger.shutdown().await;
    // Event remains buffered; shutdown must not spin forever.
    assert_eq!(logger.buffered(), 1);
}

#[tokio::test]
async fn payload_carries_structure() {
    let sink = Arc::new(ScriptedSink::default());
    let logger = logger_with(Arc::clone(&sink), 10);
    let clock = FakeClock::new();

    logger
        .log(
            &clock,
            StructuredLog::info("progress")
                .level(crate::sink::LogLevel::Warning)
                .metadata(serde_json::json!({"records": 100}))
                .job_id("01JOB")
                .worker_id("rpi-001"),
        )
        .await;

    let event = logger.inner.buffer.lock().front().cloned().unwrap();
    let payload: serde_json::Value = serde_json::from_str(&event.payload).unwrap();
    assert_eq!(payload["level"], "WARNING");
    assert_eq!(payload["message"], "progress");
    assert_eq!(payload["metadata"]["records"], 100);
    assert_eq!(payload["job_id"], "01JOB");
    assert_eq!(payload["log_stream"], "worker-2026-08-01");
}
