// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attendance gate: the single path from a check-in attempt to a committed
//! attendance record.
//!
//! Checks run in a fixed order and the first failure wins:
//! 1. code resolves to an open session
//! 2. a location is available
//! 3. the student's roster matches the session filters
//! 4. the location is inside the geofence
//! 5. the authentication proof is accepted
//! 6. no record exists yet for (session, student)
//!
//! Only a fully successful run writes anything: one record plus one
//! attendance-count increment.

use crate::db::{AttendanceStore, StoreError};
use crate::models::{AttendanceRecord, Coordinate, Session, User};
use crate::services::auth_proof::AuthProofVerifier;
use crate::services::geofence::Geofence;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Named check-in outcomes. None are retried by the gate.
#[derive(Debug, thiserror::Error)]
pub enum CheckInError {
    #[error("Invalid or expired session code")]
    SessionNotFound,

    #[error("Location is required to mark attendance")]
    LocationUnavailable,

    #[error("Student is not enrolled in the session's branch, class or batch")]
    NotEligible,

    #[error("Outside the session area ({distance_meters:.0} m from center, limit {radius_meters:.0} m)")]
    OutOfRange {
        distance_meters: f64,
        radius_meters: f64,
    },

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Attendance already marked for this session")]
    AlreadyMarked,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CheckInError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => CheckInError::AlreadyMarked,
            StoreError::SessionClosed(_) => CheckInError::SessionNotFound,
            other => CheckInError::Store(other),
        }
    }
}

/// One check-in attempt.
#[derive(Debug, Clone, Copy)]
pub struct CheckInRequest<'a> {
    pub code: &'a str,
    pub student: &'a User,
    pub observed: Option<Coordinate>,
    pub auth_proof: &'a str,
}

/// Result of the side-effect-free checks (steps 1-4).
#[derive(Debug, Clone)]
pub struct VerifiedSession {
    pub session: Session,
    pub location: Coordinate,
    pub distance_meters: f64,
}

pub struct AttendanceGate<S> {
    store: Arc<S>,
    proof: Arc<dyn AuthProofVerifier>,
    /// Serializes steps 6-7 per (session, student) pair
    pair_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<S: AttendanceStore> AttendanceGate<S> {
    pub fn new(store: Arc<S>, proof: Arc<dyn AuthProofVerifier>) -> Self {
        Self {
            store,
            proof,
            pair_locks: DashMap::new(),
        }
    }

    /// Run steps 1-4 without touching any state.
    pub async fn verify(
        &self,
        code: &str,
        student: &User,
        observed: Option<Coordinate>,
        now: DateTime<Utc>,
    ) -> Result<VerifiedSession, CheckInError> {
        let session = self
            .store
            .find_open_session_by_code(code.trim(), now)
            .await?
            .ok_or(CheckInError::SessionNotFound)?;

        let location = observed.ok_or(CheckInError::LocationUnavailable)?;

        if !session.is_eligible(&student.roster) {
            return Err(CheckInError::NotEligible);
        }

        let fence = Geofence::new(session.location, session.radius_meters);
        let distance_meters = fence.distance_to(location);
        if !fence.contains(Some(location)) {
            return Err(CheckInError::OutOfRange {
                distance_meters,
                radius_meters: session.radius_meters,
            });
        }

        Ok(VerifiedSession {
            session,
            location,
            distance_meters,
        })
    }

    /// Attempt a check-in and commit the record on success.
    pub async fn check_in(
        &self,
        request: CheckInRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, CheckInError> {
        let student = request.student;
        let result = self.try_check_in(request, now).await;

        match &result {
            Ok(record) => tracing::info!(
                session_id = %record.session_id,
                student_id = %student.id,
                "Attendance marked"
            ),
            Err(CheckInError::Store(e)) => tracing::error!(
                student_id = %student.id,
                error = %e,
                "Check-in failed on store error"
            ),
            Err(e) => tracing::info!(
                student_id = %student.id,
                code = %request.code,
                reason = %e,
                "Check-in rejected"
            ),
        }

        result
    }

    async fn try_check_in(
        &self,
        request: CheckInRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, CheckInError> {
        let verified = self
            .verify(request.code, request.student, request.observed, now)
            .await?;

        if !self.proof.verify(request.student, request.auth_proof) {
            return Err(CheckInError::AuthenticationFailed);
        }

        let session = verified.session;
        let key = AttendanceRecord::pair_key(&session.id, &request.student.id);
        let lock = self
            .pair_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock().await;
            self.commit(&session, request.student, verified.location, now)
                .await
        };

        drop(lock);
        self.pair_locks
            .remove_if(&key, |_, l| Arc::strong_count(l) == 1);

        result
    }

    async fn commit(
        &self,
        session: &Session,
        student: &User,
        location: Coordinate,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, CheckInError> {
        if self.store.has_attendance(&session.id, &student.id).await? {
            return Err(CheckInError::AlreadyMarked);
        }

        let record = AttendanceRecord {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session.id.clone(),
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            session_title: session.title.clone(),
            timestamp: now,
            location,
            verified: true,
        };

        // The store enforces uniqueness again for writers outside this process
        let updated = self.store.commit_attendance(&record).await?;
        tracing::debug!(
            session_id = %updated.id,
            attendance_count = updated.attendance_count,
            "Attendance count incremented"
        );

        Ok(record)
    }
}
