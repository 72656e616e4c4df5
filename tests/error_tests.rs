// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use unimark::db::StoreError;
use unimark::error::AppError;
use unimark::models::Coordinate;
use unimark::services::{CheckInError, SessionError};

mod common;
use common::body_json;

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn test_every_check_in_outcome_has_its_own_code() {
    let cases = [
        (CheckInError::SessionNotFound, "session_not_found"),
        (CheckInError::LocationUnavailable, "location_unavailable"),
        (CheckInError::NotEligible, "not_eligible"),
        (
            CheckInError::OutOfRange {
                distance_meters: 600.0,
                radius_meters: 500.0,
            },
            "out_of_range",
        ),
        (CheckInError::AuthenticationFailed, "authentication_failed"),
        (CheckInError::AlreadyMarked, "already_marked"),
    ];

    for (err, code) in cases {
        let (_, body) = render(err.into()).await;
        assert_eq!(body["error"], code);
    }
}

#[tokio::test]
async fn test_store_errors_hide_details() {
    let (status, body) = render(StoreError::Backend("connection reset".to_string()).into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());

    let (status, _) =
        render(SessionError::Store(StoreError::Backend("boom".to_string())).into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_invalid_coordinate_is_bad_request() {
    let err = Coordinate::new(f64::NAN, 0.0).unwrap_err();
    let (status, body) = render(err.into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_code_space_exhausted_is_unavailable() {
    let (status, body) = render(SessionError::CodeSpaceExhausted.into()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "code_space_exhausted");
}
