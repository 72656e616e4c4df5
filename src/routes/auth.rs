// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login and logout.

use crate::db::AttendanceStore;
use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE};
use crate::models::{Role, UserProfile};
use crate::services::credentials::authenticate;
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Auth routes (public).
pub fn routes<S: AttendanceStore>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/auth/login", post(login::<S>))
        .route("/auth/logout", post(logout))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub username: String,
    #[validate(length(min = 1, max = 256))]
    pub password: String,
    pub role: Role,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Check credentials, issue a session token and set it as a cookie.
async fn login<S: AttendanceStore>(
    State(state): State<Arc<AppState<S>>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    body.validate()?;

    let user = authenticate(
        state.store.as_ref(),
        &state.config.password_pepper,
        &body.username,
        &body.password,
        body.role,
    )
    .await?;

    let token = create_jwt(&user.id, user.role, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::days(30));

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token,
            user: UserProfile::from(&user),
        }),
    ))
}

/// Clear the session cookie. Bearer tokens are discarded client-side.
async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        StatusCode::NO_CONTENT,
    )
}
