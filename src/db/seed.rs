// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Demo data for local development: three universities, one account per
//! role and an open session with code `123`.

use crate::db::{AttendanceStore, StoreError};
use crate::models::{
    Coordinate, Eligibility, Role, Roster, Session, Subscription, University, UniversityStatus,
    User,
};
use chrono::{DateTime, Duration, Utc};

pub const DEMO_SESSION_CODE: &str = "123";

fn university(
    id: &str,
    name: &str,
    domain: &str,
    status: UniversityStatus,
    plan: &str,
    counts: (u32, u32),
    now: DateTime<Utc>,
) -> University {
    University {
        id: id.to_string(),
        name: name.to_string(),
        domain: domain.to_string(),
        admin_email: format!("admin@{}", domain),
        status,
        created_at: now,
        students_count: counts.0,
        faculty_count: counts.1,
        subscription: Subscription {
            plan: plan.to_string(),
            expires_at: now + Duration::days(365),
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn user(
    id: &str,
    username: &str,
    name: &str,
    role: Role,
    university: Option<&University>,
    roster: Roster,
    password_hash: &str,
    now: DateTime<Utc>,
) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        email: if username.contains('@') {
            username.to_string()
        } else {
            format!("{}@unimark.app", username.to_ascii_lowercase())
        },
        name: name.to_string(),
        role,
        university_id: university.map(|u| u.id.clone()),
        university_name: university.map(|u| u.name.clone()),
        roster,
        password_hash: password_hash.to_string(),
        created_at: now,
    }
}

/// Load the demo data set. Every account gets `password_hash`.
///
/// Safe to call more than once: documents are upserted and an existing demo
/// session is left alone.
pub async fn seed_demo_data<S: AttendanceStore>(
    store: &S,
    password_hash: &str,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let darshan = university(
        "univ-1",
        "Darshan University",
        "darshan.ac.in",
        UniversityStatus::Active,
        "Premium",
        (1250, 85),
        now,
    );
    let gujarat = university(
        "univ-2",
        "Gujarat University",
        "gujaratuniversity.ac.in",
        UniversityStatus::Trial,
        "Trial",
        (0, 0),
        now,
    );
    let nirma = university(
        "univ-3",
        "Nirma University",
        "nirmauni.ac.in",
        UniversityStatus::Active,
        "Standard",
        (2100, 140),
        now,
    );
    for u in [&darshan, &gujarat, &nirma] {
        store.upsert_university(u).await?;
    }

    let computer = Some("Computer Engineering".to_string());
    let users = [
        user(
            "super-admin-1",
            "SUPERADMIN",
            "Super Admin",
            Role::SuperAdmin,
            None,
            Roster::default(),
            password_hash,
            now,
        ),
        user(
            "admin-1",
            "admin@darshan.ac.in",
            "Darshan Admin",
            Role::UniversityAdmin,
            Some(&darshan),
            Roster::default(),
            password_hash,
            now,
        ),
        user(
            "faculty-1",
            "prof.sharma@darshan.ac.in",
            "Prof. Priya Sharma",
            Role::Faculty,
            Some(&darshan),
            Roster {
                branch: computer.clone(),
                ..Roster::default()
            },
            password_hash,
            now,
        ),
        user(
            "student-1",
            "student@darshan.ac.in",
            "Rahul Patel",
            Role::Student,
            Some(&darshan),
            Roster {
                branch: computer,
                class: Some("B.Tech".to_string()),
                batch: Some("2022-2026".to_string()),
            },
            password_hash,
            now,
        ),
    ];
    for u in &users {
        store.upsert_user(u).await?;
    }

    if store.get_session("session-1").await?.is_none() {
        let session = Session {
            id: "session-1".to_string(),
            faculty_id: "faculty-1".to_string(),
            faculty_name: "Prof. Priya Sharma".to_string(),
            university_id: darshan.id.clone(),
            code: DEMO_SESSION_CODE.to_string(),
            title: "Data Structures & Algorithms".to_string(),
            eligibility: Eligibility::default(),
            location: Coordinate {
                latitude: 23.0225,
                longitude: 72.5714,
            },
            radius_meters: 500.0,
            start_time: now,
            end_time: now + Duration::hours(2),
            is_active: true,
            attendance_count: 0,
        };
        match store.insert_session(&session, now).await {
            Ok(()) => {}
            Err(StoreError::CodeInUse(code)) => {
                tracing::warn!(code = %code, "Demo session code already held; skipping");
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        universities = 3,
        users = users.len(),
        "Demo data loaded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = MemoryStore::new();
        let now = Utc::now();

        seed_demo_data(&store, "hash", now).await.unwrap();
        seed_demo_data(&store, "hash", now).await.unwrap();

        assert_eq!(store.list_universities().await.unwrap().len(), 3);
        assert_eq!(store.list_sessions(None).await.unwrap().len(), 1);

        let session = store
            .find_open_session_by_code(DEMO_SESSION_CODE, now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.id, "session-1");
    }

    #[tokio::test]
    async fn test_seeded_accounts_by_role() {
        let store = MemoryStore::new();
        seed_demo_data(&store, "hash", Utc::now()).await.unwrap();

        let student = store
            .find_user_by_username("STUDENT@darshan.ac.in", Role::Student)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(student.roster.batch.as_deref(), Some("2022-2026"));

        // Same username under a different role is not found
        assert!(store
            .find_user_by_username("student@darshan.ac.in", Role::Faculty)
            .await
            .unwrap()
            .is_none());
    }
}
