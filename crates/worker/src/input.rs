// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input acquisition: local path, HTTPS download, or object store.
//!
//! Downloads land in a temp file whose extension is inferred from the
//! source key, so format detection by suffix keeps working. The temp file
//! is deleted when the acquired input is dropped.

use gl_core::InputSource;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input file not found: {0}")]
    NotFound(PathBuf),
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),
    #[error("object store read failed: {0}")]
    ObjectStore(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A usable local file, possibly backed by a temp download.
#[derive(Debug)]
pub struct AcquiredInput {
    path: PathBuf,
    // Held for its Drop: deletes the downloaded file when the job is done.
    _temp: Option<tempfile::NamedTempFile>,
}

impl AcquiredInput {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// File extension (with dot) inferred from a URL or object key.
pub fn extension_of(key: &str) -> String {
    let name = key.rsplit('/').next().unwrap_or(key);
    let name = name.split(['?', '#']).next().unwrap_or(name);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => format!(".{}", ext),
        _ => ".dat".to_string(),
    }
}

fn temp_file_with_extension(key: &str) -> Result<tempfile::NamedTempFile, InputError> {
    Ok(tempfile::Builder::new()
        .prefix("gleaner-input-")
        .suffix(&extension_of(key))
        .tempfile()?)
}

/// Resolve an input source to a local file.
pub async fn acquire(source: &InputSource) -> Result<AcquiredInput, InputError> {
    match source {
        InputSource::LocalPath(path) => {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(InputError::NotFound(path));
            }
            Ok(AcquiredInput { path, _temp: None })
        }
        InputSource::Url(url) => {
            tracing::info!(url = %url, "downloading input");
            let response = reqwest::get(url).await?.error_for_status()?;
            let bytes = response.bytes().await?;
            let mut temp = temp_file_with_extension(url)?;
            temp.write_all(&bytes)?;
            temp.flush()?;
            let path = temp.path().to_path_buf();
            tracing::info!(bytes = bytes.len(), path = %path.display(), "download complete");
            Ok(AcquiredInput { path, _temp: Some(temp) })
        }
        InputSource::S3 { bucket, key } => {
            tracing::info!(bucket = %bucket, key = %key, "fetching input from object store");
            let aws = crate::runtime::aws_config().await;
            let client = aws_sdk_s3::Client::new(&aws);
            let object = client
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| InputError::ObjectStore(e.to_string()))?;
            let bytes = object
                .body
                .collect()
                .await
                .map_err(|e| InputError::ObjectStore(e.to_string()))?
                .into_bytes();

            let mut temp = temp_file_with_extension(key)?;
            temp.write_all(&bytes)?;
            temp.flush()?;
            let path = temp.path().to_path_buf();
            tracing::info!(bytes = bytes.len(), path = %path.display(), "object fetched");
            Ok(AcquiredInput { path, _temp: Some(temp) })
        }
    }
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
