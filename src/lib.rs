// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! UniMark: geofenced attendance for universities
//!
//! Faculty open short-lived sessions identified by a three-digit code; students
//! check in by proving they are inside the session's geofence. This crate
//! provides the backend API, the check-in gate and the storage backends.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::AttendanceStore;
use services::{AttendanceGate, LocationPolicy, LocationRegistry, PinVerifier, SessionService};
use std::sync::Arc;

/// Shared application state, generic over the storage backend.
pub struct AppState<S> {
    pub config: Config,
    pub store: Arc<S>,
    pub sessions: SessionService<S>,
    pub gate: AttendanceGate<S>,
    pub locations: LocationRegistry,
}

impl<S: AttendanceStore> AppState<S> {
    pub fn new(config: Config, store: Arc<S>) -> Self {
        let proof = Arc::new(PinVerifier::new(config.pin_length));
        Self {
            sessions: SessionService::new(store.clone(), config.session_code_attempts),
            gate: AttendanceGate::new(store.clone(), proof),
            locations: LocationRegistry::new(LocationPolicy {
                max_age: config.location_max_age,
                ..LocationPolicy::default()
            }),
            store,
            config,
        }
    }
}
