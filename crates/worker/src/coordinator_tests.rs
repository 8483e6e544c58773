// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn claimed_job_deserializes_coordinator_payload() {
    let job: ClaimedJob = serde_json::from_value(serde_json::json!({
        "job_id": "01K6EXAMPLE",
        "job_type": "iowa_business",
        "config": {"input": {"file_path": "/tmp/a.csv"}},
        "created_at": "2026-08-01T00:00:00Z",
        "claim_instruction": {
            "sql": "UPDATE job_queue SET status = 'claimed' WHERE job_id = $2 AND status = 'pending'",
            "params": ["rpi-001", "01K6EXAMPLE"]
        }
    }))
    .unwrap();

    assert_eq!(job.job_type, "iowa_business");
    assert_eq!(job.claim_instruction.params[1], "01K6EXAMPLE");
}

#[test]
fn claimed_job_config_defaults_to_null() {
    let job: ClaimedJob = serde_json::from_value(serde_json::json!({
        "job_id": "01K6EXAMPLE",
        "job_type": "iowa_business",
        "claim_instruction": {"sql": "UPDATE", "params": []}
    }))
    .unwrap();
    assert!(job.config.is_null());
}
