// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device location tracking.
//!
//! A [`LocationTracker`] holds the last known fix for one device. Refreshing
//! awaits a [`LocationFeed`] under a timeout; failures keep the previous fix,
//! so callers always get the best location known so far or `None` if the
//! device never produced one.

use crate::models::Coordinate;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// A position reported by a device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub coordinate: Coordinate,
    /// Reported accuracy radius, if the device supplied one
    pub accuracy_meters: Option<f64>,
    pub acquired_at: DateTime<Utc>,
}

/// Platform location failures. All of them degrade to "no new fix".
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),

    #[error("Location request timed out")]
    Timeout,
}

/// Source of single position requests (the device location service).
pub trait LocationFeed: Send + Sync {
    fn current_position(&self) -> impl Future<Output = Result<LocationFix, LocationError>> + Send;
}

/// Timeouts and staleness tolerance for location acquisition.
///
/// The timeouts apply to [`LocationTracker::refresh`] callers that poll a
/// [`LocationFeed`] themselves. The server only receives pushed fixes, so it
/// configures `max_age` alone.
#[derive(Debug, Clone, Copy)]
pub struct LocationPolicy {
    /// Timeout while no fix has ever been obtained
    pub first_fix_timeout: Duration,
    /// Timeout for subsequent refreshes
    pub refresh_timeout: Duration,
    /// A fix older than this should be refreshed
    pub max_age: Duration,
}

impl Default for LocationPolicy {
    fn default() -> Self {
        Self {
            first_fix_timeout: Duration::from_secs(10),
            refresh_timeout: Duration::from_secs(15),
            max_age: Duration::from_secs(30),
        }
    }
}

/// Last known fix of one device.
#[derive(Debug, Clone, Default)]
pub struct LocationTracker {
    last_fix: Option<LocationFix>,
    last_error: Option<LocationError>,
}

impl LocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, fix: LocationFix) {
        self.last_fix = Some(fix);
        self.last_error = None;
    }

    pub fn current(&self) -> Option<LocationFix> {
        self.last_fix
    }

    pub fn last_error(&self) -> Option<&LocationError> {
        self.last_error.as_ref()
    }

    /// True if there is no fix or the fix is older than `max_age`.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        match self.last_fix {
            None => true,
            Some(fix) => {
                let age = now.signed_duration_since(fix.acquired_at);
                age.to_std().map(|a| a > max_age).unwrap_or(false)
            }
        }
    }

    /// Request a new fix from `feed`, keeping the previous one on failure.
    pub async fn refresh<F: LocationFeed>(
        &mut self,
        feed: &F,
        policy: &LocationPolicy,
    ) -> Option<LocationFix> {
        let timeout = if self.last_fix.is_some() {
            policy.refresh_timeout
        } else {
            policy.first_fix_timeout
        };

        let outcome = match tokio::time::timeout(timeout, feed.current_position()).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout),
        };

        match outcome {
            Ok(fix) => self.record(fix),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    has_previous_fix = self.last_fix.is_some(),
                    "Location refresh failed"
                );
                self.last_error = Some(e);
            }
        }

        self.last_fix
    }
}

/// Snapshot of a device's location state for status displays.
#[derive(Debug, Clone, Serialize)]
pub struct LocationStatus {
    pub has_fix: bool,
    pub stale: bool,
    pub last_fix: Option<LocationFix>,
}

/// Per-student trackers, fed by location reports from student devices.
#[derive(Default)]
pub struct LocationRegistry {
    trackers: DashMap<String, LocationTracker>,
    policy: LocationPolicy,
}

impl LocationRegistry {
    pub fn new(policy: LocationPolicy) -> Self {
        Self {
            trackers: DashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &LocationPolicy {
        &self.policy
    }

    pub fn record(&self, student_id: &str, fix: LocationFix) {
        self.trackers
            .entry(student_id.to_string())
            .or_default()
            .record(fix);
    }

    /// Last known coordinate, whatever its age.
    pub fn last_known(&self, student_id: &str) -> Option<Coordinate> {
        self.trackers
            .get(student_id)
            .and_then(|t| t.current())
            .map(|fix| fix.coordinate)
    }

    pub fn status(&self, student_id: &str, now: DateTime<Utc>) -> LocationStatus {
        match self.trackers.get(student_id) {
            Some(tracker) => LocationStatus {
                has_fix: tracker.current().is_some(),
                stale: tracker.is_stale(now, self.policy.max_age),
                last_fix: tracker.current(),
            },
            None => LocationStatus {
                has_fix: false,
                stale: true,
                last_fix: None,
            },
        }
    }
}
