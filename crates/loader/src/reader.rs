// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batched record readers.
//!
//! `read_in_batches` semantics: yield batches of raw records starting at a
//! skip offset, so a resumed run never re-reads records below its cursor.

use crate::pipeline::RawRecord;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use thiserror::Error;

/// Input format of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFormat {
    /// Header row + one record per row.
    Csv,
    /// One JSON object per line.
    JsonLines,
    /// A single top-level JSON array of objects.
    JsonArray,
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid json on line {line}: {message}")]
    Json { line: u64, message: String },
    #[error("expected a top-level json array of objects")]
    NotAnArray,
    #[error("record {index} is not a json object")]
    NotAnObject { index: u64 },
}

enum Records {
    Csv { headers: csv::StringRecord, rows: csv::StringRecordsIntoIter<File> },
    JsonLines { lines: Lines<BufReader<File>>, line: u64 },
    JsonArray(std::vec::IntoIter<(u64, serde_json::Value)>),
}

impl std::fmt::Debug for Records {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Records::Csv { headers, .. } => {
                f.debug_struct("Csv").field("headers", headers).finish_non_exhaustive()
            }
            Records::JsonLines { line, .. } => {
                f.debug_struct("JsonLines").field("line", line).finish_non_exhaustive()
            }
            Records::JsonArray(_) => f.debug_tuple("JsonArray").finish_non_exhaustive(),
        }
    }
}

/// Iterator of record batches with a skip offset.
#[derive(Debug)]
pub struct BatchReader {
    records: Records,
    batch_size: usize,
    exhausted: bool,
}

impl BatchReader {
    /// Open a file and position the reader `start_from` records in.
    pub fn open(
        path: &Path,
        format: RecordFormat,
        batch_size: usize,
        start_from: u64,
    ) -> Result<Self, ReadError> {
        let records = match format {
            RecordFormat::Csv => {
                let mut reader = csv::Reader::from_path(path)?;
                let headers = reader.headers()?.clone();
                Records::Csv { headers, rows: reader.into_records() }
            }
            RecordFormat::JsonLines => {
                let file = File::open(path)?;
                Records::JsonLines { lines: BufReader::new(file).lines(), line: 0 }
            }
            RecordFormat::JsonArray => {
                let file = File::open(path)?;
                let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))
                    .map_err(|e| ReadError::Json { line: 0, message: e.to_string() })?;
                let items = match value {
                    serde_json::Value::Array(items) => items,
                    _ => return Err(ReadError::NotAnArray),
                };
                let indexed: Vec<(u64, serde_json::Value)> =
                    items.into_iter().enumerate().map(|(i, v)| (i as u64, v)).collect();
                Records::JsonArray(indexed.into_iter())
            }
        };

        let mut reader = Self { records, batch_size: batch_size.max(1), exhausted: false };
        for _ in 0..start_from {
            match reader.next_record() {
                Some(Ok(_)) => {}
                Some(Err(error)) => return Err(error),
                None => break,
            }
        }
        Ok(reader)
    }

    fn next_record(&mut self) -> Option<Result<RawRecord, ReadError>> {
        match &mut self.records {
            Records::Csv { headers, rows } => {
                let row = match rows.next()? {
                    Ok(row) => row,
                    Err(error) => return Some(Err(error.into())),
                };
                let mut record = RawRecord::new();
                for (header, value) in headers.iter().zip(row.iter()) {
                    record.insert(
                        header.to_string(),
                        serde_json::Value::String(value.to_string()),
                    );
                }
                Some(Ok(record))
            }
            Records::JsonLines { lines, line } => loop {
                let text = match lines.next()? {
                    Ok(text) => text,
                    Err(error) => return Some(Err(error.into())),
                };
                *line += 1;
                if text.trim().is_empty() {
                    continue;
                }
                return Some(
                    serde_json::from_str::<serde_json::Value>(&text)
                        .map_err(|e| ReadError::Json { line: *line, message: e.to_string() })
                        .and_then(|value| match value {
                            serde_json::Value::Object(record) => Ok(record),
                            _ => Err(ReadError::NotAnObject { index: *line }),
                        }),
                );
            },
            Records::JsonArray(items) => {
                let (index, value) = items.next()?;
                Some(match value {
                    serde_json::Value::Object(record) => Ok(record),
                    _ => Err(ReadError::NotAnObject { index }),
                })
            }
        }
    }
}

impl Iterator for BatchReader {
    type Item = Result<Vec<RawRecord>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            match self.next_record() {
                Some(Ok(record)) => batch.push(record),
                Some(Err(error)) => {
                    self.exhausted = true;
                    return Some(Err(error));
                }
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }
        if batch.is_empty() {
            None
        } else {
            Some(Ok(batch))
        }
    }
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
