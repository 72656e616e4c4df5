// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store.
//!
//! Collections live in `DashMap`s; writes spanning more than one collection
//! (session insert with code check, attendance commit) are serialized through
//! a single mutex so each is atomic with respect to the others.

use crate::db::{AttendanceStore, StoreError};
use crate::models::{AttendanceRecord, Role, Session, University, User};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    universities: DashMap<String, University>,
    sessions: DashMap<String, Session>,
    /// Keyed by [`AttendanceRecord::key`]
    attendance: DashMap<String, AttendanceRecord>,
    write_lock: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttendanceStore for MemoryStore {
    async fn insert_session(&self, session: &Session, now: DateTime<Utc>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let conflict = self
            .sessions
            .iter()
            .any(|s| s.code == session.code && s.is_open(now));
        if conflict {
            return Err(StoreError::CodeInUse(session.code.clone()));
        }

        self.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.get(id).map(|s| s.clone()))
    }

    async fn list_sessions(&self, university_id: Option<&str>) -> Result<Vec<Session>, StoreError> {
        let mut sessions: Vec<Session> = self
            .sessions
            .iter()
            .filter(|s| university_id.is_none_or(|u| s.university_id == u))
            .map(|s| s.clone())
            .collect();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(sessions)
    }

    async fn find_open_session_by_code(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, StoreError> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.code == code && s.is_open(now))
            .max_by_key(|s| s.start_time)
            .map(|s| s.clone()))
    }

    async fn close_session(&self, id: &str) -> Result<Option<Session>, StoreError> {
        let _guard = self.write_lock.lock().await;

        Ok(self.sessions.get_mut(id).map(|mut s| {
            s.close();
            s.clone()
        }))
    }

    async fn commit_attendance(&self, record: &AttendanceRecord) -> Result<Session, StoreError> {
        let _guard = self.write_lock.lock().await;

        let key = record.key();
        if self.attendance.contains_key(&key) {
            return Err(StoreError::Duplicate);
        }

        let updated = {
            let mut session = self
                .sessions
                .get_mut(&record.session_id)
                .ok_or_else(|| StoreError::NotFound(format!("session {}", record.session_id)))?;
            if !session.is_open(record.timestamp) {
                return Err(StoreError::SessionClosed(session.id.clone()));
            }
            session.record_attendance();
            session.clone()
        };
        self.attendance.insert(key, record.clone());

        Ok(updated)
    }

    async fn has_attendance(&self, session_id: &str, student_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .attendance
            .contains_key(&AttendanceRecord::pair_key(session_id, student_id)))
    }

    async fn attendance_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let mut records: Vec<AttendanceRecord> = self
            .attendance
            .iter()
            .filter(|r| r.student_id == student_id)
            .map(|r| r.clone())
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    async fn attendance_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let mut records: Vec<AttendanceRecord> = self
            .attendance
            .iter()
            .filter(|r| r.session_id == session_id)
            .map(|r| r.clone())
            .collect();
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(records)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn find_user_by_username(
        &self,
        username: &str,
        role: Role,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.role == role && u.username.eq_ignore_ascii_case(username))
            .map(|u| u.clone()))
    }

    async fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn list_universities(&self) -> Result<Vec<University>, StoreError> {
        let mut universities: Vec<University> =
            self.universities.iter().map(|u| u.clone()).collect();
        universities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(universities)
    }

    async fn get_university(&self, id: &str) -> Result<Option<University>, StoreError> {
        Ok(self.universities.get(id).map(|u| u.clone()))
    }

    async fn upsert_university(&self, university: &University) -> Result<(), StoreError> {
        self.universities
            .insert(university.id.clone(), university.clone());
        Ok(())
    }

    async fn delete_university(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.universities.remove(id).is_some())
    }
}
