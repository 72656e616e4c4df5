// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Faculty session routes: create, list, close, attendance roll.

use crate::db::AttendanceStore;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{AttendanceRecord, Coordinate, Eligibility, Role, Session, SessionStatus};
use crate::routes::checked;
use crate::services::NewSession;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes<S: AttendanceStore>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route(
            "/api/sessions",
            get(list_sessions::<S>).post(create_session::<S>),
        )
        .route("/api/sessions/{id}/close", post(close_session::<S>))
        .route(
            "/api/sessions/{id}/attendance",
            get(session_attendance::<S>),
        )
}

/// A session together with its state at response time.
#[derive(Debug, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: Session,
    pub status: SessionStatus,
}

impl SessionView {
    fn at(session: Session, now: DateTime<Utc>) -> Self {
        let status = session.status(now);
        Self { session, status }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub location: Coordinate,
    /// Defaults to the configured radius
    pub radius_meters: Option<f64>,
    pub duration_minutes: i64,
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub batches: Vec<String>,
}

async fn create_session<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>)> {
    auth.require(Role::can_run_sessions)?;
    body.validate()?;
    let faculty = auth.load(state.store.as_ref()).await?;

    let params = NewSession {
        title: body.title.trim().to_string(),
        anchor: checked(body.location)?,
        radius_meters: body
            .radius_meters
            .unwrap_or(state.config.default_radius_meters),
        eligibility: Eligibility {
            branches: body.branches,
            classes: body.classes,
            batches: body.batches,
        },
        duration_minutes: body.duration_minutes,
    };

    let now = Utc::now();
    let session = state.sessions.create(&faculty, params, now).await?;
    Ok((StatusCode::CREATED, Json(SessionView::at(session, now))))
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    /// Open now
    pub active: Vec<SessionView>,
    /// Closed or expired (and any not yet started)
    pub past: Vec<SessionView>,
}

/// Sessions of the caller's university, split by state.
async fn list_sessions<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<SessionListResponse>> {
    auth.require(Role::can_view_university)?;
    let user = auth.load(state.store.as_ref()).await?;
    let university_id = user
        .university_id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("account has no university".to_string()))?;

    let now = Utc::now();
    let (active, past): (Vec<_>, Vec<_>) = state
        .sessions
        .for_university(university_id)
        .await?
        .into_iter()
        .map(|s| SessionView::at(s, now))
        .partition(|v| v.status == SessionStatus::Open);

    Ok(Json(SessionListResponse { active, past }))
}

async fn close_session<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>> {
    auth.require(Role::can_run_sessions)?;
    let faculty = auth.load(state.store.as_ref()).await?;

    let session = state.sessions.close(&faculty, &id).await?;
    Ok(Json(SessionView::at(session, Utc::now())))
}

/// Attendance roll of one session, oldest first. Owner only.
async fn session_attendance<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AttendanceRecord>>> {
    auth.require(Role::can_run_sessions)?;
    let faculty = auth.load(state.store.as_ref()).await?;

    let session = state.sessions.owned_session(&faculty, &id).await?;
    let records = state.store.attendance_for_session(&session.id).await?;
    Ok(Json(records))
}
