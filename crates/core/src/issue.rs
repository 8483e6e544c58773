// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Data-quality issue types reported by loaders.

use serde::{Deserialize, Serialize};

/// Severity of a data-quality issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Info => "info",
            IssueSeverity::Warning => "warning",
            IssueSeverity::Error => "error",
        }
    }
}

crate::simple_display! {
    IssueSeverity {
        Info => "info",
        Warning => "warning",
        Error => "error",
    }
}

/// Review status of a recorded issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Pending,
    Resolved,
    Ignored,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStatus::Pending => "pending",
            ResolutionStatus::Resolved => "resolved",
            ResolutionStatus::Ignored => "ignored",
        }
    }
}

crate::simple_display! {
    ResolutionStatus {
        Pending => "pending",
        Resolved => "resolved",
        Ignored => "ignored",
    }
}

/// A data-quality issue as reported from the record pipeline.
///
/// The job id and issue id are attached by the worker when the issue is
/// persisted; loaders only describe what went wrong.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_record_id: Option<String>,
    pub issue_type: String,
    pub severity: IssueSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_format: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_record: Option<serde_json::Value>,
}

impl QualityIssue {
    /// A warning-severity issue with only a type and message.
    pub fn warning(issue_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_record_id: None,
            issue_type: issue_type.into(),
            severity: IssueSeverity::Warning,
            field_name: None,
            invalid_value: None,
            expected_format: None,
            message: message.into(),
            raw_record: None,
        }
    }

    pub fn record_id(mut self, id: impl Into<String>) -> Self {
        self.source_record_id = Some(id.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.field_name = Some(name.into());
        self
    }

    pub fn raw(mut self, record: serde_json::Value) -> Self {
        self.raw_record = Some(record);
        self
    }
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
