// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geofence containment using the Haversine great-circle distance.

use crate::models::Coordinate;
use serde::{Deserialize, Serialize};

/// Mean Earth radius of the spherical model, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates, in meters.
///
/// Inputs must be finite (see [`Coordinate::new`]).
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// True iff `observed` is present and within `radius_meters` of `reference`.
pub fn is_within_radius(
    observed: Option<Coordinate>,
    reference: Coordinate,
    radius_meters: f64,
) -> bool {
    match observed {
        Some(point) => distance_meters(point, reference) <= radius_meters,
        None => false,
    }
}

/// Circular region: center plus radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    pub center: Coordinate,
    pub radius_meters: f64,
}

impl Geofence {
    pub fn new(center: Coordinate, radius_meters: f64) -> Self {
        Self {
            center,
            radius_meters,
        }
    }

    /// Distance from the fence center to `point`.
    pub fn distance_to(&self, point: Coordinate) -> f64 {
        distance_meters(point, self.center)
    }

    pub fn contains(&self, observed: Option<Coordinate>) -> bool {
        is_within_radius(observed, self.center, self.radius_meters)
    }
}
