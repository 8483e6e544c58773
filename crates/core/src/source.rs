// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source registry status, counters, and version derivation.
//!
//! A source row tracks one ingested input file, keyed by
//! `(source_type, file_hash)`. The version string is derived from a
//! `YYYYMMDD` token in the filename when present, otherwise from a fallback
//! timestamp (the file's mtime), mapped to a calendar quarter.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a source row: `processing → (completed | failed)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Processing,
    Completed,
    Failed,
}

impl SourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::Processing => "processing",
            SourceStatus::Completed => "completed",
            SourceStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(SourceStatus::Processing),
            "completed" => Some(SourceStatus::Completed),
            "failed" => Some(SourceStatus::Failed),
            _ => None,
        }
    }
}

crate::simple_display! {
    SourceStatus {
        Processing => "processing",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Per-source record counters, persisted at every checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCounters {
    pub records_processed: i64,
    pub records_imported: i64,
    pub records_failed: i64,
    pub records_skipped: i64,
}

/// Derive a `YYYY-Qn` version from an 8-digit date token in the filename.
///
/// Scans for the first run of exactly eight ASCII digits whose month part is
/// plausible (01–12), e.g. `Active_Business_Entities_20251001.csv` → `2025-Q4`.
pub fn version_from_filename(file_name: &str) -> Option<String> {
    let bytes = file_name.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - start == 8 {
                let year: u32 = file_name[start..start + 4].parse().ok()?;
                let month: u32 = file_name[start + 4..start + 6].parse().ok()?;
                if (1..=12).contains(&month) {
                    return Some(format!("{}-Q{}", year, quarter(month)));
                }
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Derive a `YYYY-Qn` version from a timestamp (filename-token fallback).
pub fn version_from_datetime(ts: DateTime<Utc>) -> String {
    format!("{}-Q{}", ts.year(), quarter(ts.month()))
}

fn quarter(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
