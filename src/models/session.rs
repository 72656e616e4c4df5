// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attendance session model.
//!
//! A session is open only while `is_active` is set AND the current time is
//! inside `[start_time, end_time)`. Expiry is evaluated lazily on every query,
//! so a stored `is_active = true` past the end time still reads as closed.

use crate::models::user::Roster;
use crate::models::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Branch / class / batch filters. An empty list matches everyone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Eligibility {
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub batches: Vec<String>,
}

impl Eligibility {
    /// True iff the roster matches every non-empty filter.
    pub fn admits(&self, roster: &Roster) -> bool {
        matches_filter(&self.branches, roster.branch.as_deref())
            && matches_filter(&self.classes, roster.class.as_deref())
            && matches_filter(&self.batches, roster.batch.as_deref())
    }
}

fn matches_filter(allowed: &[String], value: Option<&str>) -> bool {
    if allowed.is_empty() {
        return true;
    }
    match value {
        Some(v) => allowed.iter().any(|a| a == v),
        None => false,
    }
}

/// Derived lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Open,
    Closed,
}

/// Stored session document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque ID (also used as document ID)
    pub id: String,
    pub faculty_id: String,
    pub faculty_name: String,
    pub university_id: String,
    /// Three-digit check-in code
    pub code: String,
    pub title: String,
    pub eligibility: Eligibility,
    /// Geofence center
    pub location: Coordinate,
    /// Geofence radius in meters
    pub radius_meters: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Cleared when the owner closes the session early
    pub is_active: bool,
    pub attendance_count: u32,
}

impl Session {
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_time <= now && now < self.end_time
    }

    pub fn status(&self, now: DateTime<Utc>) -> SessionStatus {
        if !self.is_active || now >= self.end_time {
            SessionStatus::Closed
        } else if now < self.start_time {
            SessionStatus::Scheduled
        } else {
            SessionStatus::Open
        }
    }

    pub fn is_eligible(&self, roster: &Roster) -> bool {
        self.eligibility.admits(roster)
    }

    /// Force-close. Idempotent; there is no reopening.
    pub fn close(&mut self) {
        self.is_active = false;
    }

    pub fn record_attendance(&mut self) {
        self.attendance_count = self.attendance_count.saturating_add(1);
    }
}
