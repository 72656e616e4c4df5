// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

/// Which [`crate::db::AttendanceStore`] backend to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process memory; reset on restart
    Memory,
    Firestore,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "firestore" => Ok(StorageBackend::Firestore),
            _ => Err(ConfigError::Invalid("STORAGE_BACKEND")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Server ---
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,

    // --- Storage ---
    pub storage_backend: StorageBackend,
    /// GCP project ID (Firestore backend)
    pub gcp_project_id: String,
    /// Load demo universities, users and a session at startup
    pub seed_demo_data: bool,
    /// Password given to seeded accounts
    pub demo_password: Option<String>,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// HMAC key for password hashes
    pub password_pepper: Vec<u8>,

    // --- Attendance policy ---
    /// Length of the placeholder check-in PIN
    pub pin_length: usize,
    /// Geofence radius used when a new session does not specify one
    pub default_radius_meters: f64,
    /// Random code draws before falling back to a full scan
    pub session_code_attempts: usize,
    /// Reported location fixes older than this are flagged stale
    pub location_max_age: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let storage_backend: StorageBackend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .parse()?;

        let seed_demo_data = match env::var("SEED_DEMO_DATA") {
            Ok(v) => parse_bool(&v).ok_or(ConfigError::Invalid("SEED_DEMO_DATA"))?,
            Err(_) => storage_backend == StorageBackend::Memory,
        };

        let demo_password = env::var("DEMO_PASSWORD").ok().map(|v| v.trim().to_string());
        if seed_demo_data && demo_password.is_none() {
            return Err(ConfigError::Missing("DEMO_PASSWORD"));
        }

        let default_radius_meters =
            parse_or("DEFAULT_RADIUS_METERS", 500.0_f64)?;
        if !(default_radius_meters.is_finite() && default_radius_meters > 0.0) {
            return Err(ConfigError::Invalid("DEFAULT_RADIUS_METERS"));
        }

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            storage_backend,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            seed_demo_data,
            demo_password,

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            password_pepper: env::var("PASSWORD_PEPPER")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("PASSWORD_PEPPER"))?
                .into_bytes(),

            pin_length: pin_length(parse_or("PIN_LENGTH", 4)?)?,
            default_radius_meters,
            session_code_attempts: parse_or("SESSION_CODE_ATTEMPTS", 32)?,
            location_max_age: Duration::from_secs(parse_or("LOCATION_MAX_AGE_SECS", 30)?),
        })
    }

    /// Deterministic config for tests.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            storage_backend: StorageBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            seed_demo_data: true,
            demo_password: Some("demo-password".to_string()),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            password_pepper: b"test_password_pepper".to_vec(),
            pin_length: 4,
            default_radius_meters: 500.0,
            session_code_attempts: 32,
            location_max_age: Duration::from_secs(30),
        }
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// A zero-length PIN would let an empty proof through.
fn pin_length(len: usize) -> Result<usize, ConfigError> {
    if len == 0 {
        return Err(ConfigError::Invalid("PIN_LENGTH"));
    }
    Ok(len)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
