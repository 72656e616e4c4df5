// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth_proof;
pub mod checkin;
pub mod credentials;
pub mod geofence;
pub mod location;
pub mod session;

pub use auth_proof::{AuthProofVerifier, PinVerifier};
pub use checkin::{AttendanceGate, CheckInError, CheckInRequest, VerifiedSession};
pub use geofence::{distance_meters, is_within_radius, Geofence};
pub use location::{LocationFeed, LocationFix, LocationPolicy, LocationRegistry, LocationTracker};
pub use session::{NewSession, SessionError, SessionService};
