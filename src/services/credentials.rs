// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password hashing and login.

use crate::db::AttendanceStore;
use crate::error::{AppError, Result};
use crate::models::{Role, User};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of `password` keyed with the server pepper.
pub fn hash_password(password: &str, pepper: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(pepper)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(password.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time comparison of `password` against a stored hash.
pub fn verify_password(password: &str, stored_hash: &str, pepper: &[u8]) -> bool {
    match hash_password(password, pepper) {
        Ok(computed) => computed.as_bytes().ct_eq(stored_hash.as_bytes()).into(),
        Err(_) => false,
    }
}

/// Resolve a login attempt to a user.
///
/// Unknown user, wrong role and wrong password all yield the same error.
pub async fn authenticate<S: AttendanceStore>(
    store: &S,
    pepper: &[u8],
    username: &str,
    password: &str,
    role: Role,
) -> Result<User> {
    let user = store
        .find_user_by_username(username.trim(), role)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash, pepper) {
        tracing::info!(user_id = %user.id, role = role.as_str(), "Login rejected: bad password");
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!(user_id = %user.id, role = role.as_str(), "Login succeeded");
    Ok(user)
}
