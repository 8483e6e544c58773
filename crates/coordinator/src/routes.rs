// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Router and request handlers.

use crate::error::ApiError;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gl_core::{worker, SystemClock};
use gl_store::{claim_instruction, IssueStore, JobStore, StorePool, WorkerStore};
use serde::Deserialize;

const DEFAULT_JOB_LIMIT: i64 = 50;
const DEFAULT_ISSUE_LIMIT: i64 = 100;

/// Shared handler state. The coordinator itself is stateless beyond the
/// backing store.
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobStore,
    pub workers: WorkerStore,
    pub issues: IssueStore,
    pub clock: SystemClock,
}

impl AppState {
    pub fn new(pool: StorePool) -> Self {
        Self {
            jobs: JobStore::new(pool.clone()),
            workers: WorkerStore::new(pool.clone()),
            issues: IssueStore::new(pool),
            clock: SystemClock,
        }
    }
}

/// Build the full coordinator router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/jobs/claim", post(claim_job))
        .route("/jobs/submit", post(submit_job))
        .route("/jobs/:job_id/status", get(job_status))
        .route("/jobs/:job_id/heartbeat", post(job_heartbeat))
        .route("/jobs", get(list_jobs))
        .route("/workers", get(list_workers))
        .route("/data-quality/issues", get(list_issues))
        .fallback(not_found)
        .layer(axum::middleware::from_fn(cors))
        .with_state(state)
}

/// Browser-facing CORS: answer preflight with 204 and stamp the allow
/// headers on every response.
async fn cors(request: axum::extract::Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return (StatusCode::NO_CONTENT, cors_headers()).into_response();
    }
    let mut response = next.run(request).await;
    for (name, value) in cors_headers() {
        response.headers_mut().insert(name, value);
    }
    response
}

fn cors_headers() -> [(header::HeaderName, HeaderValue); 3] {
    [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ),
    ]
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "Not found" }))).into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "gleaner-coordinator",
        "timestamp": "ok",
    }))
}

#[derive(Debug, Deserialize)]
struct ClaimRequest {
    worker_id: Option<String>,
    #[serde(default)]
    capabilities: Vec<String>,
}

/// Hand the oldest matching pending job to a worker, along with the claim
/// instruction it must execute. Two racing workers can both receive the
/// same candidate; the conditional update decides the winner.
async fn claim_job(
    State(state): State<AppState>,
    Json(request): Json<ClaimRequest>,
) -> Result<Response, ApiError> {
    let worker_id = request
        .worker_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("worker_id required".to_string()))?;

    let Some(job) = state.jobs.next_pending(&request.capabilities).await? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    tracing::info!(job_id = %job.job_id, worker_id = %worker_id, "offering job");
    Ok(Json(serde_json::json!({
        "job_id": job.job_id,
        "job_type": job.job_type,
        "config": job.config,
        "created_at": job.created_at,
        "claim_instruction": claim_instruction(&worker_id, &job.job_id),
    }))
    .into_response())
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    job_type: Option<String>,
    #[serde(default)]
    config: serde_json::Value,
}

async fn submit_job(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Response, ApiError> {
    let job_type = request
        .job_type
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("job_type required".to_string()))?;

    let config = match request.config {
        serde_json::Value::Null => serde_json::json!({}),
        config => config,
    };
    let job_id = state.jobs.submit(&state.clock, &job_type, &config).await?;
    tracing::info!(job_id = %job_id, job_type = %job_type, "job submitted");

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "job_id": job_id,
            "status": "queued",
            "message": "Job submitted successfully",
        })),
    )
        .into_response())
}

async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(row) = state.jobs.fetch_with_worker(&job_id).await? else {
        return Err(ApiError::NotFound("Job not found"));
    };

    let worker = row.hostname.as_ref().map(|hostname| {
        let live = row
            .last_heartbeat
            .map(|hb| worker::is_live(hb.timestamp_millis().max(0) as u64, now_ms()))
            .unwrap_or(false);
        serde_json::json!({
            "hostname": hostname,
            "last_heartbeat": row.last_heartbeat,
            "live": live,
        })
    });

    let mut body = serde_json::to_value(&row.job)
        .unwrap_or_else(|_| serde_json::json!({ "job_id": job_id }));
    body["worker"] = worker.unwrap_or(serde_json::Value::Null);
    Ok(Json(body))
}

fn now_ms() -> u64 {
    use gl_core::Clock;
    SystemClock.epoch_ms()
}

#[derive(Debug, Deserialize)]
struct HeartbeatRequest {
    #[allow(dead_code)]
    worker_id: Option<String>,
    #[allow(dead_code)]
    metadata: Option<serde_json::Value>,
}

/// Workers write their heartbeat rows directly; this endpoint just
/// acknowledges so the worker can detect a dead coordinator.
async fn job_heartbeat(
    Path(job_id): Path<String>,
    Json(_request): Json<HeartbeatRequest>,
) -> Json<serde_json::Value> {
    tracing::debug!(job_id = %job_id, "heartbeat acknowledged");
    Json(serde_json::json!({ "status": "acknowledged" }))
}

#[derive(Debug, Deserialize)]
struct ListJobsParams {
    status: Option<String>,
    limit: Option<i64>,
}

/// `status=all` (or absent) lists every job.
fn status_filter(status: Option<&str>) -> Option<&str> {
    match status {
        None | Some("all") | Some("") => None,
        Some(status) => Some(status),
    }
}

async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListJobsParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_JOB_LIMIT).clamp(1, 1000);
    let jobs = state.jobs.list(status_filter(params.status.as_deref()), limit).await?;
    let jobs: Vec<serde_json::Value> = jobs
        .iter()
        .map(|job| {
            serde_json::json!({
                "job_id": job.job_id,
                "job_type": job.job_type,
                "status": job.status,
                "worker_id": job.worker_id,
                "created_at": job.created_at,
            })
        })
        .collect();
    Ok(Json(serde_json::json!({ "count": jobs.len(), "jobs": jobs })))
}

async fn list_workers(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let workers = state.workers.list_live().await?;
    Ok(Json(serde_json::json!({ "count": workers.len(), "workers": workers })))
}

#[derive(Debug, Deserialize)]
struct ListIssuesParams {
    status: Option<String>,
    limit: Option<i64>,
}

async fn list_issues(
    State(state): State<AppState>,
    Query(params): Query<ListIssuesParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status = params.status.unwrap_or_else(|| "pending".to_string());
    let limit = params.limit.unwrap_or(DEFAULT_ISSUE_LIMIT).clamp(1, 1000);
    let issues = state.issues.list(&status, limit).await?;
    Ok(Json(serde_json::json!({ "count": issues.len(), "issues": issues })))
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
