// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer.
//!
//! The core only talks to [`AttendanceStore`]. Two backends implement it:
//! [`MemoryStore`] (process memory, reset on restart) and [`FirestoreDb`].

pub mod firestore;
pub mod memory;
pub mod seed;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::models::{AttendanceRecord, Role, Session, University, User};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const UNIVERSITIES: &str = "universities";
    pub const SESSIONS: &str = "sessions";
    /// Attendance records (document ID = session/student pair key)
    pub const ATTENDANCE: &str = "attendance";
}

/// Errors surfaced by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An attendance record already exists for the (session, student) pair.
    #[error("Attendance already recorded")]
    Duplicate,

    /// Another open session currently holds this code.
    #[error("Session code {0} is in use")]
    CodeInUse(String),

    /// The session closed or expired before the record could be written.
    #[error("Session {0} is no longer open")]
    SessionClosed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Repository interface for sessions, attendance, users and universities.
pub trait AttendanceStore: Send + Sync + 'static {
    // ─── Sessions ────────────────────────────────────────────────

    /// Insert a new session. Fails with [`StoreError::CodeInUse`] if another
    /// session open at `now` has the same code.
    fn insert_session(
        &self,
        session: &Session,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn get_session(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send;

    /// Sessions newest first, optionally restricted to one university.
    fn list_sessions(
        &self,
        university_id: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Session>, StoreError>> + Send;

    /// The session open at `now` with this code, if any.
    fn find_open_session_by_code(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send;

    /// Clear the active flag and return the updated session.
    fn close_session(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Session>, StoreError>> + Send;

    // ─── Attendance ──────────────────────────────────────────────

    /// Insert the record and increment the session's attendance count as one
    /// atomic unit. Returns the updated session, [`StoreError::Duplicate`] if
    /// the pair already has a record, or [`StoreError::SessionClosed`] if the
    /// session is not open at the record's timestamp. Nothing is written on
    /// error.
    fn commit_attendance(
        &self,
        record: &AttendanceRecord,
    ) -> impl Future<Output = Result<Session, StoreError>> + Send;

    fn has_attendance(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// A student's records, newest first.
    fn attendance_for_student(
        &self,
        student_id: &str,
    ) -> impl Future<Output = Result<Vec<AttendanceRecord>, StoreError>> + Send;

    /// A session's records, oldest first.
    fn attendance_for_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Vec<AttendanceRecord>, StoreError>> + Send;

    // ─── Users ───────────────────────────────────────────────────

    fn get_user(&self, id: &str)
        -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Case-insensitive username lookup restricted to one role.
    fn find_user_by_username(
        &self,
        username: &str,
        role: Role,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;

    fn upsert_user(&self, user: &User) -> impl Future<Output = Result<(), StoreError>> + Send;

    // ─── Universities ────────────────────────────────────────────

    fn list_universities(&self)
        -> impl Future<Output = Result<Vec<University>, StoreError>> + Send;

    fn get_university(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<University>, StoreError>> + Send;

    fn upsert_university(
        &self,
        university: &University,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Returns `false` if no such university existed.
    fn delete_university(&self, id: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;
}
