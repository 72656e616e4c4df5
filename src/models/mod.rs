// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod attendance;
pub mod coordinate;
pub mod session;
pub mod university;
pub mod user;

pub use attendance::AttendanceRecord;
pub use coordinate::{Coordinate, CoordinateError};
pub use session::{Eligibility, Session, SessionStatus};
pub use university::{Subscription, University, UniversityStatus, UniversityUpdate};
pub use user::{Role, Roster, User, UserProfile};
