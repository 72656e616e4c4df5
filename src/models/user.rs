// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model and role capabilities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Closed set of account roles. Capability checks dispatch on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    SuperAdmin,
    UniversityAdmin,
    Faculty,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super-admin",
            Role::UniversityAdmin => "university-admin",
            Role::Faculty => "faculty",
            Role::Student => "student",
        }
    }

    pub fn can_manage_universities(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    pub fn can_run_sessions(&self) -> bool {
        matches!(self, Role::Faculty)
    }

    pub fn can_view_university(&self) -> bool {
        matches!(self, Role::UniversityAdmin | Role::Faculty)
    }

    pub fn can_check_in(&self) -> bool {
        matches!(self, Role::Student)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super-admin" => Ok(Role::SuperAdmin),
            "university-admin" => Ok(Role::UniversityAdmin),
            "faculty" => Ok(Role::Faculty),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Branch / class / batch placement of a student.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub branch: Option<String>,
    pub class: Option<String>,
    pub batch: Option<String>,
}

/// Account stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque ID (also used as document ID)
    pub id: String,
    /// Login name; the email address for everyone except the platform admin
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub university_id: Option<String>,
    pub university_name: Option<String>,
    #[serde(default)]
    pub roster: Roster,
    /// HMAC-SHA256 of the password, hex encoded
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user (no credential material).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub university_id: Option<String>,
    pub university_name: Option<String>,
    pub branch: Option<String>,
    pub class: Option<String>,
    pub batch: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            university_id: user.university_id.clone(),
            university_name: user.university_name.clone(),
            branch: user.roster.branch.clone(),
            class: user.roster.class.clone(),
            batch: user.roster.batch.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_tags() {
        assert_eq!(
            serde_json::to_string(&Role::UniversityAdmin).unwrap(),
            "\"university-admin\""
        );
        let role: Role = serde_json::from_str("\"super-admin\"").unwrap();
        assert_eq!(role, Role::SuperAdmin);
        assert_eq!("faculty".parse::<Role>(), Ok(Role::Faculty));
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_capabilities() {
        assert!(Role::SuperAdmin.can_manage_universities());
        assert!(!Role::Faculty.can_manage_universities());
        assert!(Role::Faculty.can_run_sessions());
        assert!(!Role::Student.can_run_sessions());
        assert!(Role::Student.can_check_in());
        assert!(!Role::Faculty.can_check_in());
        assert!(Role::UniversityAdmin.can_view_university());
    }
}
