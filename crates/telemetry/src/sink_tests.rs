// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    debug = { LogLevel::Debug,   "DEBUG" },
    info  = { LogLevel::Info,    "INFO" },
    warn  = { LogLevel::Warning, "WARNING" },
    error = { LogLevel::Error,   "ERROR" },
)]
fn level_text(level: LogLevel, text: &str) {
    assert_eq!(level.as_str(), text);
    assert_eq!(level.to_string(), text);
}

#[yare::parameterized(
    lowercase = { "warning", LogLevel::Warning },
    short     = { "warn",    LogLevel::Warning },
    error     = { "ERROR",   LogLevel::Error },
    unknown   = { "notice",  LogLevel::Info },
)]
fn level_parse(input: &str, expected: LogLevel) {
    assert_eq!(LogLevel::parse(input), expected);
}

#[tokio::test]
async fn tracing_sink_accepts_batches() {
    let sink = TracingSink;
    let events = vec![LogEvent { timestamp_ms: 1, payload: "{}".into() }];
    let token = sink.emit("worker-2026-08-01", &events, None).await.unwrap();
    assert_eq!(token, None);
}
