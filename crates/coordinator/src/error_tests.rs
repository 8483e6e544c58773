// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    bad_request = { ApiError::BadRequest("worker_id required".into()), StatusCode::BAD_REQUEST },
    not_found   = { ApiError::NotFound("Job not found"),               StatusCode::NOT_FOUND },
)]
fn status_codes(error: ApiError, expected: StatusCode) {
    assert_eq!(error.into_response().status(), expected);
}

#[test]
fn store_errors_are_internal() {
    let error = ApiError::Store(StoreError::query("select job")(sqlx::Error::PoolTimedOut));
    assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
}
