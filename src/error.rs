// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::db::StoreError;
use crate::models::CoordinateError;
use crate::services::{CheckInError, SessionError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid username, password or role")]
    InvalidCredentials,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    CheckIn(#[from] CheckInError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(what),
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<CoordinateError> for AppError {
    fn from(err: CoordinateError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

fn message(msg: impl ToString) -> Option<serde_json::Value> {
    Some(serde_json::Value::String(msg.to_string()))
}

impl AppError {
    /// Status, machine-readable code and optional details for this error.
    fn parts(&self) -> (StatusCode, &'static str, Option<serde_json::Value>) {
        match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "invalid_credentials", None)
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", message(msg)),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", message(msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", message(msg)),
            AppError::CheckIn(err) => check_in_parts(err),
            AppError::Session(err) => session_parts(err),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        }
    }
}

fn check_in_parts(err: &CheckInError) -> (StatusCode, &'static str, Option<serde_json::Value>) {
    match err {
        CheckInError::SessionNotFound => {
            (StatusCode::NOT_FOUND, "session_not_found", message(err))
        }
        CheckInError::LocationUnavailable => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "location_unavailable",
            message(err),
        ),
        CheckInError::NotEligible => (StatusCode::FORBIDDEN, "not_eligible", message(err)),
        CheckInError::OutOfRange {
            distance_meters,
            radius_meters,
        } => (
            StatusCode::FORBIDDEN,
            "out_of_range",
            Some(serde_json::json!({
                "distance_meters": distance_meters.round(),
                "radius_meters": radius_meters,
            })),
        ),
        CheckInError::AuthenticationFailed => (
            StatusCode::UNAUTHORIZED,
            "authentication_failed",
            message(err),
        ),
        CheckInError::AlreadyMarked => (StatusCode::CONFLICT, "already_marked", message(err)),
        CheckInError::Store(store) => {
            tracing::error!(error = %store, "Database error during check-in");
            (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
        }
    }
}

fn session_parts(err: &SessionError) -> (StatusCode, &'static str, Option<serde_json::Value>) {
    match err {
        SessionError::InvalidDuration => {
            (StatusCode::BAD_REQUEST, "invalid_duration", message(err))
        }
        SessionError::InvalidRadius => (StatusCode::BAD_REQUEST, "invalid_radius", message(err)),
        SessionError::CodeSpaceExhausted => (
            StatusCode::SERVICE_UNAVAILABLE,
            "code_space_exhausted",
            message(err),
        ),
        SessionError::NotFound(id) => (StatusCode::NOT_FOUND, "not_found", message(id)),
        SessionError::NotOwner => (StatusCode::FORBIDDEN, "forbidden", message(err)),
        SessionError::NoUniversity => (StatusCode::BAD_REQUEST, "bad_request", message(err)),
        SessionError::Store(store) => {
            tracing::error!(error = %store, "Database error in session lifecycle");
            (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = self.parts();

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
