// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle: creation with unique codes, closing, listing.

use crate::db::{AttendanceStore, StoreError};
use crate::models::{Coordinate, Eligibility, Session, User};
use crate::time_utils::end_time_after;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;

/// Smallest session code.
pub const CODE_MIN: u16 = 100;
/// Largest session code.
pub const CODE_MAX: u16 = 999;

/// Draw a three-digit code uniformly from `[CODE_MIN, CODE_MAX]`.
pub fn generate_session_code() -> String {
    rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX).to_string()
}

/// Parameters for a new session, as supplied by the owning faculty member.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub title: String,
    pub anchor: Coordinate,
    pub radius_meters: f64,
    pub eligibility: Eligibility,
    pub duration_minutes: i64,
}

/// Session lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session duration must be positive")]
    InvalidDuration,

    #[error("Geofence radius must be positive")]
    InvalidRadius,

    #[error("No free session code available")]
    CodeSpaceExhausted,

    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session is owned by another faculty member")]
    NotOwner,

    #[error("Faculty account has no university")]
    NoUniversity,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Creates and closes sessions on top of a store.
pub struct SessionService<S> {
    store: Arc<S>,
    code_attempts: usize,
}

impl<S: AttendanceStore> SessionService<S> {
    pub fn new(store: Arc<S>, code_attempts: usize) -> Self {
        Self {
            store,
            code_attempts,
        }
    }

    /// Create a session open from `now` for `duration_minutes`.
    ///
    /// Codes are drawn at random; a draw that collides with an open session is
    /// discarded. After `code_attempts` collisions every code is tried in
    /// order, so creation only fails when all 900 codes are held.
    pub async fn create(
        &self,
        faculty: &User,
        params: NewSession,
        now: DateTime<Utc>,
    ) -> Result<Session, SessionError> {
        if params.duration_minutes <= 0 {
            return Err(SessionError::InvalidDuration);
        }
        if !(params.radius_meters.is_finite() && params.radius_meters > 0.0) {
            return Err(SessionError::InvalidRadius);
        }
        let end_time =
            end_time_after(now, params.duration_minutes).ok_or(SessionError::InvalidDuration)?;
        let university_id = faculty
            .university_id
            .clone()
            .ok_or(SessionError::NoUniversity)?;

        let mut session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            faculty_id: faculty.id.clone(),
            faculty_name: faculty.name.clone(),
            university_id,
            code: String::new(),
            title: params.title,
            eligibility: params.eligibility,
            location: params.anchor,
            radius_meters: params.radius_meters,
            start_time: now,
            end_time,
            is_active: true,
            attendance_count: 0,
        };

        let random = (0..self.code_attempts).map(|_| generate_session_code());
        let sequential = (CODE_MIN..=CODE_MAX).map(|c| c.to_string());

        for code in random.chain(sequential) {
            session.code = code;
            match self.store.insert_session(&session, now).await {
                Ok(()) => {
                    tracing::info!(
                        session_id = %session.id,
                        faculty_id = %session.faculty_id,
                        code = %session.code,
                        radius_meters = session.radius_meters,
                        end_time = %session.end_time,
                        "Session created"
                    );
                    return Ok(session);
                }
                Err(StoreError::CodeInUse(code)) => {
                    tracing::debug!(code = %code, "Session code collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::warn!(faculty_id = %faculty.id, "All session codes are in use");
        Err(SessionError::CodeSpaceExhausted)
    }

    /// Close a session early. Only the owner may close; closing twice is a no-op.
    pub async fn close(&self, faculty: &User, session_id: &str) -> Result<Session, SessionError> {
        self.owned_session(faculty, session_id).await?;

        let session = self
            .store
            .close_session(session_id)
            .await?
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        tracing::info!(
            session_id = %session.id,
            attendance_count = session.attendance_count,
            "Session closed"
        );
        Ok(session)
    }

    /// Fetch a session and check that `faculty` owns it.
    pub async fn owned_session(
        &self,
        faculty: &User,
        session_id: &str,
    ) -> Result<Session, SessionError> {
        let session = self
            .store
            .get_session(session_id)
            .await?
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        if session.faculty_id != faculty.id {
            return Err(SessionError::NotOwner);
        }
        Ok(session)
    }

    /// All sessions of a university, newest first.
    pub async fn for_university(&self, university_id: &str) -> Result<Vec<Session>, SessionError> {
        Ok(self.store.list_sessions(Some(university_id)).await?)
    }
}
