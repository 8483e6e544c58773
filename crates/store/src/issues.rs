// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Data-quality issue repository.

use crate::pool::{StoreError, StorePool};
use chrono::{DateTime, Utc};
use gl_core::{Clock, QualityIssue, Ulid};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of `data_quality_issues`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct IssueRow {
    pub issue_id: String,
    pub job_id: Option<String>,
    pub source_record_id: Option<String>,
    pub issue_type: String,
    pub severity: String,
    pub field_name: Option<String>,
    pub invalid_value: Option<String>,
    pub expected_format: Option<String>,
    pub message: Option<String>,
    pub raw_record: Option<serde_json::Value>,
    pub resolution_status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct IssueStore {
    pool: StorePool,
}

impl IssueStore {
    pub fn new(pool: StorePool) -> Self {
        Self { pool }
    }

    /// Record an issue against a job. The issue id is generated here,
    /// client-side, like every other primary key.
    pub async fn insert(
        &self,
        clock: &impl Clock,
        job_id: &str,
        issue: &QualityIssue,
    ) -> Result<String, StoreError> {
        let issue_id = Ulid::generate(clock);
        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "INSERT INTO data_quality_issues ( \
                 issue_id, job_id, source_record_id, issue_type, severity, \
                 field_name, invalid_value, expected_format, message, raw_record, \
                 resolution_status \
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending')",
        )
        .bind(issue_id.as_str())
        .bind(job_id)
        .bind(&issue.source_record_id)
        .bind(&issue.issue_type)
        .bind(issue.severity.as_str())
        .bind(&issue.field_name)
        .bind(&issue.invalid_value)
        .bind(&issue.expected_format)
        .bind(&issue.message)
        .bind(&issue.raw_record)
        .execute(&mut *conn)
        .await
        .map_err(StoreError::query("insert data-quality issue"))?;
        Ok(issue_id.to_string())
    }

    /// List issues by resolution status, newest first.
    pub async fn list(
        &self,
        resolution_status: &str,
        limit: i64,
    ) -> Result<Vec<IssueRow>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query_as(
            "SELECT * FROM data_quality_issues \
             WHERE resolution_status = $1 \
             ORDER BY created_at DESC LIMIT $2",
        )
        .bind(resolution_status)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await
        .map_err(StoreError::query("list data-quality issues"))
    }
}
