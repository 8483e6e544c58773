// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn worker_row_serializes_for_http() {
    let row = WorkerRow {
        worker_id: "worker-rpi-001-1700000000".into(),
        hostname: Some("rpi-001".into()),
        status: "active".into(),
        capabilities: serde_json::json!(["iowa_business", "iowa_asbestos"]),
        last_heartbeat: Utc::now(),
        updated_at: Utc::now(),
    };
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["status"], "active");
    assert_eq!(json["capabilities"][0], "iowa_business");
}
