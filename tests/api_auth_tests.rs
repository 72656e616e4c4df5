// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, token and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid tokens
//! 2. Login issues a token usable as bearer header or cookie
//! 3. Role mismatches are rejected
//! 4. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use unimark::models::Role;

mod common;
use common::{body_json, create_test_app, create_test_jwt, get_request, json_request};

const DEMO_PASSWORD: &str = "demo-password";

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let (app, _) = create_test_app().await;

    let response = app
        .oneshot(get_request("/api/me", "invalid.token.here"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_unknown_user_rejected() {
    let (app, _) = create_test_app().await;
    let token = create_test_jwt("ghost-1", Role::Student);

    let response = app.oneshot(get_request("/api/me", &token)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid_token");
}

#[tokio::test]
async fn test_login_then_me() {
    let (app, _) = create_test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            json!({
                "username": "Student@Darshan.ac.in",
                "password": DEMO_PASSWORD,
                "role": "student",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login sets a cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("unimark_token="));
    assert!(cookie.contains("HttpOnly"));

    let body = body_json(response).await;
    assert_eq!(body["user"]["id"], "student-1");
    assert_eq!(body["user"]["role"], "student");
    assert!(body["user"].get("password_hash").is_none());
    let token = body["token"].as_str().unwrap().to_string();

    // Bearer header
    let response = app
        .clone()
        .oneshot(get_request("/api/me", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["batch"], "2022-2026");

    // Cookie
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header(header::COOKIE, format!("unimark_token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_wrong_role_rejected() {
    let (app, _) = create_test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            json!({
                "username": "student@darshan.ac.in",
                "password": DEMO_PASSWORD,
                "role": "faculty",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_login_wrong_password_rejected() {
    let (app, _) = create_test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            json!({
                "username": "SUPERADMIN",
                "password": "not-the-password",
                "role": "super-admin",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_empty_username_is_bad_request() {
    let (app, _) = create_test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            None,
            json!({ "username": "", "password": DEMO_PASSWORD, "role": "student" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (app, _) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header(header::COOKIE, "unimark_token=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("unimark_token="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/attendance/check-in")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let (app, _) = create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
