// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes shared by all signed-in users, plus the university overview.

use crate::db::AttendanceStore;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Role, UserProfile};
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes<S: AttendanceStore>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/api/me", get(get_me::<S>))
        .route("/api/university/overview", get(university_overview::<S>))
}

// ─── User Profile ────────────────────────────────────────────

/// Get current user profile.
async fn get_me<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let user = auth.load(state.store.as_ref()).await?;
    Ok(Json(UserProfile::from(&user)))
}

// ─── University Overview ─────────────────────────────────────

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UniversityOverview {
    pub university_id: String,
    pub university_name: Option<String>,
    pub total_sessions: usize,
    pub open_sessions: usize,
    pub closed_sessions: usize,
    pub total_attendance: u64,
}

/// Session and attendance totals for the caller's university.
async fn university_overview<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UniversityOverview>> {
    auth.require(|r| *r == Role::UniversityAdmin)?;
    let admin = auth.load(state.store.as_ref()).await?;
    let university_id = admin
        .university_id
        .clone()
        .ok_or_else(|| AppError::BadRequest("account has no university".to_string()))?;

    let now = Utc::now();
    let sessions = state.sessions.for_university(&university_id).await?;
    let open_sessions = sessions.iter().filter(|s| s.is_open(now)).count();

    Ok(Json(UniversityOverview {
        university_id,
        university_name: admin.university_name,
        total_sessions: sessions.len(),
        open_sessions,
        closed_sessions: sessions.len() - open_sessions,
        total_attendance: sessions.iter().map(|s| u64::from(s.attendance_count)).sum(),
    }))
}
