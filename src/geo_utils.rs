//! # Geographic Utilities
//!
//! Great-circle geometry on a sphere of configurable radius.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`great_circle_distance`] | Haversine distance between two lat/lng pairs |
//! | [`haversine_distance`] | Same, between two [`Waypoint`]s |
//! | [`polyline_length`] | Sum of consecutive distances along a trajectory |
//! | [`nearest_waypoint`] | Trajectory waypoint closest to a location |
//!
//! ## Example
//!
//! ```rust
//! use route_analyzer::{Waypoint, geo_utils};
//!
//! let track = vec![
//!     Waypoint::new(0.0, 51.5074, -0.1278),  // London
//!     Waypoint::new(1.0, 51.5080, -0.1290),
//!     Waypoint::new(2.0, 51.5090, -0.1300),
//! ];
//!
//! let length = geo_utils::polyline_length(&track, 6371.0);
//! println!("Track length: {:.3} km", length);
//! ```
//!
//! ## Algorithm Notes
//!
//! The haversine formula assumes a spherical Earth. Distances come out in the
//! unit of the radius passed in, which is kilometers everywhere in this crate.
//!
//! Reference: [Haversine formula (Wikipedia)](https://en.wikipedia.org/wiki/Haversine_formula)

use crate::Waypoint;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance between two points given in degrees.
///
/// Returns the distance in the same unit as `radius`. NaN inputs propagate.
///
/// # Example
///
/// ```rust
/// use route_analyzer::geo_utils::great_circle_distance;
///
/// // One degree of longitude along the 10th parallel
/// let d = great_circle_distance(10.0, 0.0, 10.0, 1.0, 6371.0);
/// assert!((d - 109.5).abs() < 0.2);
/// ```
#[inline]
pub fn great_circle_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64, radius: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let half_lat = (delta_lat / 2.0).sin();
    let half_lng = (delta_lng / 2.0).sin();
    let a = half_lat * half_lat + lat1_rad.cos() * lat2_rad.cos() * half_lng * half_lng;
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    radius * c
}

/// Great-circle distance between two waypoints.
#[inline]
pub fn haversine_distance(p1: &Waypoint, p2: &Waypoint, radius: f64) -> f64 {
    great_circle_distance(p1.latitude, p1.longitude, p2.latitude, p2.longitude, radius)
}

/// Total length of the recorded path.
///
/// Sums the distance between consecutive waypoints. Empty or single-point
/// tracks return 0.0. This is neither a shortest path nor a closed perimeter.
pub fn polyline_length(points: &[Waypoint], radius: f64) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1], radius))
        .sum()
}

/// Find the waypoint closest to `(lat, lng)`.
///
/// Ties keep the earliest waypoint. Returns `None` for an empty slice.
pub fn nearest_waypoint(points: &[Waypoint], lat: f64, lng: f64, radius: f64) -> Option<&Waypoint> {
    let mut best: Option<(&Waypoint, f64)> = None;

    for p in points {
        let d = great_circle_distance(lat, lng, p.latitude, p.longitude, radius);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((p, d)),
        }
    }

    best.map(|(p, _)| p)
}

// =============================================================================
// Unit Tests
// =============================================================================
