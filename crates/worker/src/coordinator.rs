// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the coordinator.

use gl_store::ClaimInstruction;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const CLAIM_TIMEOUT: Duration = Duration::from_secs(10);
const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("coordinator request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected coordinator response: {status}")]
    UnexpectedStatus { status: u16 },
}

/// A job offer from `/jobs/claim`: the row plus the mutation this worker
/// must execute against the store to actually own it.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimedJob {
    pub job_id: String,
    pub job_type: String,
    #[serde(default)]
    pub config: serde_json::Value,
    pub claim_instruction: ClaimInstruction,
}

#[derive(Clone)]
pub struct CoordinatorClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoordinatorClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CoordinatorError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, base_url: base_url.into() })
    }

    /// Ask for a job. `Ok(None)` means no work is available.
    pub async fn claim(
        &self,
        worker_id: &str,
        capabilities: &[String],
    ) -> Result<Option<ClaimedJob>, CoordinatorError> {
        let response = self
            .http
            .post(format!("{}/jobs/claim", self.base_url))
            .timeout(CLAIM_TIMEOUT)
            .json(&serde_json::json!({
                "worker_id": worker_id,
                "capabilities": capabilities,
            }))
            .send()
            .await?;

        match response.status().as_u16() {
            204 => Ok(None),
            200 => Ok(Some(response.json().await?)),
            status => {
                tracing::error!(status, "unexpected claim response");
                Err(CoordinatorError::UnexpectedStatus { status })
            }
        }
    }

    /// Best-effort heartbeat notification; failures never interrupt work.
    pub async fn heartbeat(&self, job_id: &str, worker_id: &str) {
        let result = self
            .http
            .post(format!("{}/jobs/{}/heartbeat", self.base_url, job_id))
            .timeout(HEARTBEAT_TIMEOUT)
            .json(&serde_json::json!({ "worker_id": worker_id }))
            .send()
            .await;
        if let Err(error) = result {
            tracing::debug!(%error, "coordinator heartbeat failed");
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
