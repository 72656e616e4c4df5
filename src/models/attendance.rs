// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attendance record model.

use crate::models::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only attendance record. At most one exists per (session, student).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub session_id: String,
    pub student_id: String,
    pub student_name: String,
    /// Session title at check-in time (for history listings)
    pub session_title: String,
    pub timestamp: DateTime<Utc>,
    /// Student position captured at submission
    pub location: Coordinate,
    pub verified: bool,
}

impl AttendanceRecord {
    /// Storage key enforcing the one-record-per-pair constraint.
    pub fn pair_key(session_id: &str, student_id: &str) -> String {
        format!(
            "{}+{}",
            urlencoding::encode(session_id),
            urlencoding::encode(student_id)
        )
    }

    pub fn key(&self) -> String {
        Self::pair_key(&self.session_id, &self.student_id)
    }
}
