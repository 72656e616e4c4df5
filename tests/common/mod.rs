// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use chrono::Utc;
use std::sync::Arc;
use unimark::config::Config;
use unimark::db::{seed::seed_demo_data, FirestoreDb, MemoryStore};
use unimark::middleware::auth::create_jwt;
use unimark::models::Role;
use unimark::routes::create_router;
use unimark::services::credentials::hash_password;
use unimark::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by a seeded in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState<MemoryStore>>) {
    let config = Config::test_default();
    let store = MemoryStore::new();

    let password = config.demo_password.clone().unwrap();
    let hash = hash_password(&password, &config.password_pepper).unwrap();
    seed_demo_data(&store, &hash, Utc::now()).await.unwrap();

    let state = Arc::new(AppState::new(config, Arc::new(store)));
    (create_router(state.clone()), state)
}

/// Token for a seeded account, signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, role: Role) -> String {
    create_jwt(user_id, role, &Config::test_default().jwt_signing_key).unwrap()
}

#[allow(dead_code)]
pub fn student_token() -> String {
    create_test_jwt("student-1", Role::Student)
}

#[allow(dead_code)]
pub fn faculty_token() -> String {
    create_test_jwt("faculty-1", Role::Faculty)
}

#[allow(dead_code)]
pub fn super_admin_token() -> String {
    create_test_jwt("super-admin-1", Role::SuperAdmin)
}

/// Build a JSON request with a bearer token.
#[allow(dead_code)]
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Build a bodyless request with a bearer token.
#[allow(dead_code)]
pub fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
