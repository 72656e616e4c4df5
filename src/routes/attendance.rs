// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Student routes: code pre-check, check-in, history and location reports.

use crate::db::AttendanceStore;
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{AttendanceRecord, Coordinate, Role};
use crate::routes::checked;
use crate::services::location::LocationStatus;
use crate::services::{CheckInRequest, LocationFix};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes<S: AttendanceStore>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/api/attendance", get(history::<S>))
        .route("/api/attendance/verify", post(verify_code::<S>))
        .route("/api/attendance/check-in", post(check_in::<S>))
        .route(
            "/api/location",
            get(location_status::<S>).put(report_location::<S>),
        )
}

/// Body location if present, else the last fix the device reported.
fn observed_location<S>(
    state: &AppState<S>,
    student_id: &str,
    submitted: Option<Coordinate>,
) -> Result<Option<Coordinate>> {
    match submitted {
        Some(c) => Ok(Some(checked(c)?)),
        None => Ok(state.locations.last_known(student_id)),
    }
}

// ─── Code pre-check ──────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(length(min = 1, max = 16))]
    pub code: String,
    pub location: Option<Coordinate>,
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    pub session_id: String,
    pub title: String,
    pub faculty_name: String,
    pub distance_meters: f64,
    pub radius_meters: f64,
}

/// Run the session, location, eligibility and range checks without
/// recording anything.
async fn verify_code<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>> {
    auth.require(Role::can_check_in)?;
    body.validate()?;
    let student = auth.load(state.store.as_ref()).await?;
    let observed = observed_location(&state, &student.id, body.location)?;

    let verified = state
        .gate
        .verify(&body.code, &student, observed, Utc::now())
        .await?;

    Ok(Json(VerifyCodeResponse {
        session_id: verified.session.id,
        title: verified.session.title,
        faculty_name: verified.session.faculty_name,
        distance_meters: verified.distance_meters.round(),
        radius_meters: verified.session.radius_meters,
    }))
}

// ─── Check-in ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CheckInBody {
    #[validate(length(min = 1, max = 16))]
    pub code: String,
    #[validate(length(max = 32))]
    pub pin: String,
    pub location: Option<Coordinate>,
}

async fn check_in<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CheckInBody>,
) -> Result<(StatusCode, Json<AttendanceRecord>)> {
    auth.require(Role::can_check_in)?;
    body.validate()?;
    let student = auth.load(state.store.as_ref()).await?;
    let observed = observed_location(&state, &student.id, body.location)?;

    let record = state
        .gate
        .check_in(
            CheckInRequest {
                code: &body.code,
                student: &student,
                observed,
                auth_proof: &body.pin,
            },
            Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// The caller's attendance history, newest first.
async fn history<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<AttendanceRecord>>> {
    auth.require(Role::can_check_in)?;
    Ok(Json(
        state.store.attendance_for_student(&auth.user_id).await?,
    ))
}

// ─── Location reports ────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LocationReport {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
}

async fn report_location<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<LocationReport>,
) -> Result<Json<LocationStatus>> {
    auth.require(Role::can_check_in)?;
    let coordinate = Coordinate::new(body.latitude, body.longitude)?;
    let now = Utc::now();

    state.locations.record(
        &auth.user_id,
        LocationFix {
            coordinate,
            accuracy_meters: body.accuracy_meters.filter(|a| a.is_finite() && *a >= 0.0),
            acquired_at: now,
        },
    );
    tracing::debug!(student_id = %auth.user_id, "Location fix recorded");

    Ok(Json(state.locations.status(&auth.user_id, now)))
}

async fn location_status<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<LocationStatus>> {
    auth.require(Role::can_check_in)?;
    Ok(Json(state.locations.status(&auth.user_id, Utc::now())))
}
