// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Super-admin university management.

use crate::db::AttendanceStore;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Role, Subscription, University, UniversityStatus, UniversityUpdate};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Trial length for newly added universities.
const TRIAL_DAYS: i64 = 30;

pub fn routes<S: AttendanceStore>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route(
            "/api/universities",
            get(list_universities::<S>).post(create_university::<S>),
        )
        .route("/api/universities/summary", get(summary::<S>))
        .route(
            "/api/universities/{id}",
            get(get_university::<S>)
                .patch(update_university::<S>)
                .delete(delete_university::<S>),
        )
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

async fn list_universities<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<University>>> {
    auth.require(Role::can_manage_universities)?;

    let mut universities = state.store.list_universities().await?;
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        universities.retain(|u| u.matches_search(term));
    }
    Ok(Json(universities))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUniversityRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 3, max = 253))]
    pub domain: String,
    #[validate(email)]
    pub admin_email: String,
    /// Subscription plan; new universities start on a trial of it
    pub plan: Option<String>,
}

/// Add a university. It starts in trial status with zero counts.
async fn create_university<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateUniversityRequest>,
) -> Result<(StatusCode, Json<University>)> {
    auth.require(Role::can_manage_universities)?;
    body.validate()?;

    let now = Utc::now();
    let university = University {
        id: uuid::Uuid::new_v4().to_string(),
        name: body.name.trim().to_string(),
        domain: body.domain.trim().to_ascii_lowercase(),
        admin_email: body.admin_email.trim().to_string(),
        status: UniversityStatus::Trial,
        created_at: now,
        students_count: 0,
        faculty_count: 0,
        subscription: Subscription {
            plan: body.plan.unwrap_or_else(|| "trial".to_string()),
            expires_at: now + Duration::days(TRIAL_DAYS),
        },
    };
    state.store.upsert_university(&university).await?;

    tracing::info!(university_id = %university.id, name = %university.name, "University added");
    Ok((StatusCode::CREATED, Json(university)))
}

async fn get_university<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<University>> {
    auth.require(Role::can_manage_universities)?;
    state
        .store
        .get_university(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("University {}", id)))
}

async fn update_university<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(update): Json<UniversityUpdate>,
) -> Result<Json<University>> {
    auth.require(Role::can_manage_universities)?;

    let mut university = state
        .store
        .get_university(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("University {}", id)))?;
    update.apply(&mut university);
    state.store.upsert_university(&university).await?;

    tracing::info!(university_id = %id, "University updated");
    Ok(Json(university))
}

async fn delete_university<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    auth.require(Role::can_manage_universities)?;

    if !state.store.delete_university(&id).await? {
        return Err(AppError::NotFound(format!("University {}", id)));
    }
    tracing::info!(university_id = %id, "University deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct PlatformSummary {
    pub total_universities: usize,
    pub total_students: u64,
    pub total_faculty: u64,
    pub active_subscriptions: usize,
}

impl PlatformSummary {
    pub fn from_universities(universities: &[University]) -> Self {
        Self {
            total_universities: universities.len(),
            total_students: universities
                .iter()
                .map(|u| u64::from(u.students_count))
                .sum(),
            total_faculty: universities.iter().map(|u| u64::from(u.faculty_count)).sum(),
            active_subscriptions: universities
                .iter()
                .filter(|u| u.status == UniversityStatus::Active)
                .count(),
        }
    }
}

async fn summary<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<PlatformSummary>> {
    auth.require(Role::can_manage_universities)?;
    let universities = state.store.list_universities().await?;
    Ok(Json(PlatformSummary::from_universities(&universities)))
}
