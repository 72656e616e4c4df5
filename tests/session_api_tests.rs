// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Faculty session lifecycle and university overview over HTTP.

use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;
use tower::ServiceExt;
use unimark::db::AttendanceStore;
use unimark::models::{Role, Roster, User};

mod common;
use common::{
    body_json, create_test_app, create_test_jwt, faculty_token, get_request, json_request,
    student_token,
};

fn new_session_body() -> serde_json::Value {
    json!({
        "title": "Operating Systems Lab",
        "location": { "latitude": 23.0300, "longitude": 72.5800 },
        "duration_minutes": 60,
        "branches": ["Computer Engineering"],
    })
}

#[tokio::test]
async fn test_create_list_close() {
    let (app, _) = create_test_app().await;
    let token = faculty_token();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/sessions",
            Some(&token),
            new_session_body(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let code = created["code"].as_str().unwrap().to_string();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 3);
    assert!(code.chars().all(|c| c.is_ascii_digit()));
    assert_ne!(code, "123", "code must differ from the open demo session");
    assert_eq!(created["status"], "open");
    assert_eq!(created["radius_meters"], 500.0);
    assert_eq!(created["faculty_id"], "faculty-1");
    assert_eq!(created["attendance_count"], 0);

    let response = app
        .clone()
        .oneshot(get_request("/api/sessions", &token))
        .await
        .unwrap();
    let list = body_json(response).await;
    assert_eq!(list["active"].as_array().unwrap().len(), 2);
    assert!(list["past"].as_array().unwrap().is_empty());

    let close_uri = format!("/api/sessions/{}/close", id);
    let response = app
        .clone()
        .oneshot(json_request("POST", &close_uri, Some(&token), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "closed");

    // Closing twice is a no-op
    let response = app
        .clone()
        .oneshot(json_request("POST", &close_uri, Some(&token), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/api/sessions", &token))
        .await
        .unwrap();
    let list = body_json(response).await;
    assert_eq!(list["active"].as_array().unwrap().len(), 1);
    assert_eq!(list["past"][0]["id"], id.as_str());
}

#[tokio::test]
async fn test_closed_session_rejects_check_in() {
    let (app, _) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/sessions/session-1/close",
            Some(&faculty_token()),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/attendance/check-in",
            Some(&student_token()),
            json!({
                "code": "123",
                "pin": "1234",
                "location": { "latitude": 23.0225, "longitude": 72.5714 },
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_parameters() {
    let (app, _) = create_test_app().await;
    let token = faculty_token();

    let mut body = new_session_body();
    body["duration_minutes"] = json!(0);
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/sessions", Some(&token), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid_duration");

    let mut body = new_session_body();
    body["radius_meters"] = json!(-5.0);
    let response = app
        .oneshot(json_request("POST", "/api/sessions", Some(&token), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid_radius");
}

#[tokio::test]
async fn test_student_cannot_create_session() {
    let (app, _) = create_test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/sessions",
            Some(&student_token()),
            new_session_body(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_only_owner_may_close_or_read_roll() {
    let (app, state) = create_test_app().await;

    state
        .store
        .upsert_user(&User {
            id: "faculty-2".to_string(),
            username: "prof.mehta@darshan.ac.in".to_string(),
            email: "prof.mehta@darshan.ac.in".to_string(),
            name: "Prof. Mehta".to_string(),
            role: Role::Faculty,
            university_id: Some("univ-1".to_string()),
            university_name: Some("Darshan University".to_string()),
            roster: Roster::default(),
            password_hash: String::new(),
            created_at: Utc::now(),
        })
        .await
        .unwrap();
    let other = create_test_jwt("faculty-2", Role::Faculty);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/sessions/session-1/close",
            Some(&other),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "forbidden");

    let response = app
        .clone()
        .oneshot(get_request("/api/sessions/session-1/attendance", &other))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(get_request(
            "/api/sessions/no-such-session/attendance",
            &faculty_token(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_attendance_roll_and_overview() {
    let (app, _) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/attendance/check-in",
            Some(&student_token()),
            json!({
                "code": "123",
                "pin": "0000",
                "location": { "latitude": 23.0225, "longitude": 72.5714 },
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get_request(
            "/api/sessions/session-1/attendance",
            &faculty_token(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let roll = body_json(response).await;
    assert_eq!(roll.as_array().unwrap().len(), 1);
    assert_eq!(roll[0]["student_name"], "Rahul Patel");

    let admin = create_test_jwt("admin-1", Role::UniversityAdmin);
    let response = app
        .clone()
        .oneshot(get_request("/api/university/overview", &admin))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let overview = body_json(response).await;
    assert_eq!(overview["university_id"], "univ-1");
    assert_eq!(overview["total_sessions"], 1);
    assert_eq!(overview["open_sessions"], 1);
    assert_eq!(overview["total_attendance"], 1);

    // University admins may list sessions but not run them
    let response = app
        .clone()
        .oneshot(get_request("/api/sessions", &admin))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/api/university/overview", &faculty_token()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
