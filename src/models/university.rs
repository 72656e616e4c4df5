// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! University tenant model (managed by the platform super-admin).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniversityStatus {
    Active,
    Trial,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub plan: String,
    pub expires_at: DateTime<Utc>,
}

/// Stored university document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct University {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub admin_email: String,
    pub status: UniversityStatus,
    pub created_at: DateTime<Utc>,
    pub students_count: u32,
    pub faculty_count: u32,
    pub subscription: Subscription,
}

impl University {
    /// Case-insensitive match on name or domain.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.domain.to_lowercase().contains(&term)
    }
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UniversityUpdate {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub admin_email: Option<String>,
    pub status: Option<UniversityStatus>,
    pub subscription: Option<Subscription>,
}

impl UniversityUpdate {
    pub fn apply(self, university: &mut University) {
        if let Some(name) = self.name {
            university.name = name;
        }
        if let Some(domain) = self.domain {
            university.domain = domain;
        }
        if let Some(admin_email) = self.admin_email {
            university.admin_email = admin_email;
        }
        if let Some(status) = self.status {
            university.status = status;
        }
        if let Some(subscription) = self.subscription {
            university.subscription = subscription;
        }
    }
}
