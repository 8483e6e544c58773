// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn transient_classification() {
    assert!(is_transient(&sqlx::Error::PoolTimedOut));
    assert!(is_transient(&sqlx::Error::PoolClosed));
    assert!(is_transient(&sqlx::Error::Protocol("connection reset".into())));
    assert!(!is_transient(&sqlx::Error::RowNotFound));
}

#[test]
fn query_error_carries_context() {
    let error = StoreError::query("insert job")(sqlx::Error::RowNotFound);
    assert!(error.to_string().starts_with("insert job failed"));
}

#[test]
fn exhausted_error_reports_attempts() {
    let error = StoreError::AcquireExhausted { attempts: 4, source: sqlx::Error::PoolTimedOut };
    assert!(error.to_string().contains("4 attempts"));
}

fn transient_error() -> StoreError {
    StoreError::Query { context: "probe", source: sqlx::Error::PoolTimedOut }
}

fn fatal_error() -> StoreError {
    StoreError::Query { context: "probe", source: sqlx::Error::RowNotFound }
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(3, std::time::Duration::from_millis(1), 2.0)
}

#[tokio::test]
async fn retry_transient_recovers_within_budget() {
    let calls = std::sync::atomic::AtomicU32::new(0);
    let result = retry_transient(&fast_policy(), || {
        let n = calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        async move {
            if n < 2 {
                Err(transient_error())
            } else {
                Ok(n)
            }
        }
    })
    .await;
    assert_eq!(result.unwrap(), 2);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_transient_rethrows_after_exhaustion() {
    let calls = std::sync::atomic::AtomicU32::new(0);
    let result: Result<(), _> = retry_transient(&fast_policy(), || {
        calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        async { Err(transient_error()) }
    })
    .await;
    assert!(result.is_err());
    // First call plus three retries.
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 4);
}

#[tokio::test]
async fn retry_transient_propagates_fatal_errors_immediately() {
    let calls = std::sync::atomic::AtomicU32::new(0);
    let result: Result<(), _> = retry_transient(&fast_policy(), || {
        calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        async { Err(fatal_error()) }
    })
    .await;
    assert!(result.is_err());
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn store_error_transience() {
    assert!(is_transient_store_error(&transient_error()));
    assert!(is_transient_store_error(&StoreError::AcquireExhausted {
        attempts: 4,
        source: sqlx::Error::PoolTimedOut,
    }));
    assert!(!is_transient_store_error(&fatal_error()));
}
