// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (`FIRESTORE_EMULATOR_HOST`); they skip otherwise.

use chrono::{Duration, Utc};
use unimark::db::{AttendanceStore, StoreError};
use unimark::models::{AttendanceRecord, Coordinate, Eligibility, Session};

mod common;
use common::test_db;

/// Unique suffix for test isolation.
fn unique_id(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}

/// Code unlikely to collide with other runs against the same emulator.
fn unique_code() -> String {
    (100 + rand::random::<u16>() % 900).to_string()
}

fn test_session(id: &str, code: &str) -> Session {
    let now = Utc::now();
    Session {
        id: id.to_string(),
        faculty_id: "faculty-it".to_string(),
        faculty_name: "Integration Faculty".to_string(),
        university_id: unique_id("univ"),
        code: code.to_string(),
        title: "Integration Session".to_string(),
        eligibility: Eligibility::default(),
        location: Coordinate::new(23.0225, 72.5714).unwrap(),
        radius_meters: 500.0,
        start_time: now - Duration::minutes(1),
        end_time: now + Duration::hours(1),
        is_active: true,
        attendance_count: 0,
    }
}

fn test_record(session: &Session, student_id: &str) -> AttendanceRecord {
    AttendanceRecord {
        id: unique_id("att"),
        session_id: session.id.clone(),
        student_id: student_id.to_string(),
        student_name: "Integration Student".to_string(),
        session_title: session.title.clone(),
        timestamp: Utc::now(),
        location: session.location,
        verified: true,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SESSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_session_round_trip_and_close() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("session");
    let session = test_session(&id, &unique_code());

    match db.insert_session(&session, Utc::now()).await {
        Ok(()) => {}
        // Another open session in the emulator holds this code; nothing to test
        Err(StoreError::CodeInUse(_)) => return,
        Err(e) => panic!("insert failed: {}", e),
    }

    let fetched = db.get_session(&id).await.unwrap().unwrap();
    assert_eq!(fetched.code, session.code);

    let closed = db.close_session(&id).await.unwrap().unwrap();
    assert!(!closed.is_active);

    let open = db
        .find_open_session_by_code(&session.code, Utc::now())
        .await
        .unwrap();
    assert!(open.is_none_or(|s| s.id != id));
}

// ═══════════════════════════════════════════════════════════════════════════
// ATTENDANCE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_commit_attendance_once_per_pair() {
    require_emulator!();

    let db = test_db().await;
    let session = test_session(&unique_id("session"), &unique_code());
    if db.insert_session(&session, Utc::now()).await.is_err() {
        return;
    }

    let student = unique_id("student");
    let updated = db
        .commit_attendance(&test_record(&session, &student))
        .await
        .unwrap();
    assert_eq!(updated.attendance_count, 1);
    assert!(db.has_attendance(&session.id, &student).await.unwrap());

    let err = db
        .commit_attendance(&test_record(&session, &student))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate));

    let stored = db.get_session(&session.id).await.unwrap().unwrap();
    assert_eq!(stored.attendance_count, 1);
    assert_eq!(
        db.attendance_for_session(&session.id).await.unwrap().len(),
        1
    );
    assert_eq!(
        db.attendance_for_student(&student).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_concurrent_commits_for_same_pair_write_once() {
    require_emulator!();

    let db = test_db().await;
    let session = test_session(&unique_id("session"), &unique_code());
    if db.insert_session(&session, Utc::now()).await.is_err() {
        return;
    }

    let student = unique_id("student");
    let first = test_record(&session, &student);
    let second = test_record(&session, &student);
    let (a, b) = tokio::join!(db.commit_attendance(&first), db.commit_attendance(&second));

    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(StoreError::Duplicate))));

    // The winning record is stored as written, not overwritten by the loser
    let winner_id = if results[0].is_ok() { &first.id } else { &second.id };
    let records = db.attendance_for_session(&session.id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0].id, winner_id);

    let stored = db.get_session(&session.id).await.unwrap().unwrap();
    assert_eq!(stored.attendance_count, 1);
}

#[tokio::test]
async fn test_concurrent_commits_for_different_students_keep_count() {
    require_emulator!();

    let db = test_db().await;
    let session = test_session(&unique_id("session"), &unique_code());
    if db.insert_session(&session, Utc::now()).await.is_err() {
        return;
    }

    let first = test_record(&session, &unique_id("student"));
    let second = test_record(&session, &unique_id("student"));
    let (a, b) = tokio::join!(db.commit_attendance(&first), db.commit_attendance(&second));
    a.unwrap();
    b.unwrap();

    let stored = db.get_session(&session.id).await.unwrap().unwrap();
    assert_eq!(stored.attendance_count, 2);
}

#[tokio::test]
async fn test_commit_to_closed_session_is_rejected() {
    require_emulator!();

    let db = test_db().await;
    let session = test_session(&unique_id("session"), &unique_code());
    if db.insert_session(&session, Utc::now()).await.is_err() {
        return;
    }
    db.close_session(&session.id).await.unwrap();

    let student = unique_id("student");
    let err = db
        .commit_attendance(&test_record(&session, &student))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::SessionClosed(_)));
    assert!(!db.has_attendance(&session.id, &student).await.unwrap());
}
