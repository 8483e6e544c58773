// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    pending   = { JobStatus::Pending,   "pending" },
    claimed   = { JobStatus::Claimed,   "claimed" },
    running   = { JobStatus::Running,   "running" },
    completed = { JobStatus::Completed, "completed" },
    failed    = { JobStatus::Failed,    "failed" },
)]
fn status_round_trips(status: JobStatus, text: &str) {
    assert_eq!(status.as_str(), text);
    assert_eq!(status.to_string(), text);
    assert_eq!(JobStatus::parse(text), Some(status));

    let json = serde_json::to_string(&status).unwrap();
    assert_eq!(json, format!("\"{}\"", text));
    let parsed: JobStatus = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, status);
}

#[test]
fn parse_rejects_unknown() {
    assert_eq!(JobStatus::parse("queued"), None);
}

#[yare::parameterized(
    pending   = { JobStatus::Pending,   false },
    claimed   = { JobStatus::Claimed,   false },
    running   = { JobStatus::Running,   false },
    completed = { JobStatus::Completed, true },
    failed    = { JobStatus::Failed,    true },
)]
fn terminal_iff_completed_or_failed(status: JobStatus, expected: bool) {
    assert_eq!(status.is_terminal(), expected);
}

#[yare::parameterized(
    claim        = { JobStatus::Pending,   JobStatus::Running,   false },
    start        = { JobStatus::Claimed,   JobStatus::Running,   true },
    complete     = { JobStatus::Running,   JobStatus::Completed, true },
    fail_running = { JobStatus::Running,   JobStatus::Failed,    true },
    fail_claimed = { JobStatus::Claimed,   JobStatus::Failed,    true },
    no_skip      = { JobStatus::Pending,   JobStatus::Completed, false },
    no_revive    = { JobStatus::Completed, JobStatus::Running,   false },
    no_backward  = { JobStatus::Running,   JobStatus::Claimed,   false },
)]
fn transition_graph(from: JobStatus, to: JobStatus, allowed: bool) {
    assert_eq!(from.can_transition_to(to), allowed);
}

#[test]
fn pending_to_claimed_is_allowed() {
    assert!(JobStatus::Pending.can_transition_to(JobStatus::Claimed));
}

// --- InputSpec resolution ---

fn spec(
    file_path: Option<&str>,
    url: Option<&str>,
    bucket: Option<&str>,
    key: Option<&str>,
) -> InputSpec {
    InputSpec {
        file_path: file_path.map(String::from),
        url: url.map(String::from),
        s3_bucket: bucket.map(String::from),
        s3_key: key.map(String::from),
    }
}

#[test]
fn resolve_local_path() {
    let source = spec(Some("/tmp/a.csv"), None, None, None).resolve().unwrap();
    assert_eq!(source, InputSource::LocalPath("/tmp/a.csv".into()));
}

#[test]
fn resolve_url() {
    let source = spec(None, Some("https://example.com/a.csv"), None, None)
        .resolve()
        .unwrap();
    assert_eq!(source, InputSource::Url("https://example.com/a.csv".into()));
}

#[test]
fn resolve_s3() {
    let source = spec(None, None, Some("bkt"), Some("data/a.csv")).resolve().unwrap();
    assert_eq!(
        source,
        InputSource::S3 { bucket: "bkt".into(), key: "data/a.csv".into() }
    );
}

#[test]
fn resolve_rejects_empty() {
    assert_eq!(spec(None, None, None, None).resolve(), Err(ConfigError::MissingInput));
}

#[test]
fn resolve_rejects_ambiguous() {
    let err = spec(Some("/tmp/a"), Some("https://x/a"), None, None).resolve();
    assert_eq!(err, Err(ConfigError::AmbiguousInput));
}

#[test]
fn resolve_rejects_partial_s3() {
    assert_eq!(spec(None, None, Some("bkt"), None).resolve(), Err(ConfigError::PartialS3));
}

#[test]
fn resolve_rejects_bad_scheme() {
    let err = spec(None, Some("ftp://example.com/a"), None, None).resolve();
    assert_eq!(err, Err(ConfigError::BadUrlScheme("ftp://example.com/a".into())));
}

#[test]
fn job_config_parses_submission_body() {
    let config: JobConfig = serde_json::from_value(serde_json::json!({
        "input": {"file_path": "/tmp/a.csv"},
        "processing": {"limit": 10, "batch_size": 100}
    }))
    .unwrap();
    assert_eq!(config.processing.limit, Some(10));
    assert_eq!(config.processing.batch_size, Some(100));
    assert!(matches!(config.input.resolve(), Ok(InputSource::LocalPath(_))));
}

#[test]
fn job_config_defaults_are_empty() {
    let config: JobConfig = serde_json::from_value(serde_json::json!({})).unwrap();
    assert_eq!(config.input.resolve(), Err(ConfigError::MissingInput));
    assert_eq!(config.processing.limit, None);
}
