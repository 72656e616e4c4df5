// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geographic coordinate value type.

use serde::{Deserialize, Serialize};

/// A point on the Earth in decimal degrees.
///
/// Constructed through [`Coordinate::new`] at the API boundary so the core
/// only ever sees finite, in-range values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Validate and build a coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(c: Coordinate) -> Self {
        // geo uses (x, y) = (longitude, latitude)
        geo::Point::new(c.longitude, c.latitude)
    }
}

/// Rejected coordinate input.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CoordinateError {
    #[error("Coordinate must be finite")]
    NotFinite,

    #[error("Latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}
