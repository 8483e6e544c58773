// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    absent  = { None,             None },
    all     = { Some("all"),      None },
    empty   = { Some(""),         None },
    pending = { Some("pending"),  Some("pending") },
    failed  = { Some("failed"),   Some("failed") },
)]
fn status_filter_normalizes(input: Option<&str>, expected: Option<&str>) {
    assert_eq!(status_filter(input), expected);
}

#[test]
fn claim_request_tolerates_missing_fields() {
    let request: ClaimRequest = serde_json::from_value(serde_json::json!({})).unwrap();
    assert_eq!(request.worker_id, None);
    assert!(request.capabilities.is_empty());

    let request: ClaimRequest = serde_json::from_value(serde_json::json!({
        "worker_id": "rpi-001",
        "capabilities": ["iowa_business"]
    }))
    .unwrap();
    assert_eq!(request.worker_id.as_deref(), Some("rpi-001"));
    assert_eq!(request.capabilities, vec!["iowa_business"]);
}

#[test]
fn submit_request_defaults_config() {
    let request: SubmitRequest = serde_json::from_value(serde_json::json!({
        "job_type": "iowa_business"
    }))
    .unwrap();
    assert_eq!(request.job_type.as_deref(), Some("iowa_business"));
    assert!(request.config.is_null());
}

#[test]
fn cors_headers_cover_browser_preflight() {
    let headers = cors_headers();
    assert_eq!(headers[0].0, header::ACCESS_CONTROL_ALLOW_ORIGIN);
    assert_eq!(headers[0].1, "*");
    assert_eq!(headers[1].1, "GET, POST, OPTIONS");
    assert_eq!(headers[2].1, "Content-Type");
}
