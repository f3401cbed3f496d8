//! # Route Analyzer
//!
//! Metrics for a recorded GPS trajectory.
//!
//! This library provides:
//! - Farthest waypoint from the start of the trajectory
//! - Most frequented area using an H3 hexagonal grid
//! - Waypoints outside a circular geofence
//! - Straight-line (recorded path) length
//! - Self-intersections of the path using an R-tree over segments
//!
//! ## Features
//!
//! - **`parallel`** - Run the independent analyses concurrently with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use route_analyzer::{Config, Geofence, RouteAnalyzer, Waypoint};
//!
//! let waypoints = vec![
//!     Waypoint::new(0.0, 45.0700, 7.6800),
//!     Waypoint::new(1.0, 45.0710, 7.6820),
//!     Waypoint::new(2.0, 45.0725, 7.6850),
//! ];
//!
//! let config = Config {
//!     geofence: Geofence::new(45.0700, 7.6800, 0.2),
//!     ..Config::default()
//! };
//!
//! let report = RouteAnalyzer::new(config).analyze(&waypoints);
//! let farthest = report.max_distance_from_start.unwrap();
//! println!("Farthest point: {:.3} km", farthest.distance_km);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{AnalysisError, OptionExt, Result};

// Geographic utilities (great-circle distance, path length)
pub mod geo_utils;

// Distance-based metrics
pub mod distance;
pub use distance::{
    max_distance_from_start, straight_line_distance, MaxDistanceFromStart, StraightLineDistance,
};

// Circular geofence classification
pub mod geofence;
pub use geofence::{
    waypoints_outside_geofence, PercentageOfWaypointsOutsideGeofence, WaypointsOutsideGeofence,
};

// Most frequented area on a hexagonal grid
pub mod hexgrid;
pub use hexgrid::{most_frequented_area, MostFrequentedArea};

// Self-intersections of the recorded path
pub mod intersections;
pub use intersections::{find_intersections, Intersection, Segment};

// Orchestration and report assembly
pub mod analyzer;
pub use analyzer::{Analysis, AnalysisFailure, DataReport, RouteAnalyzer};

// Trajectory, configuration and report adapters
pub mod io;

// ============================================================================
// Core Types
// ============================================================================

/// Mean Earth radius in kilometers used when no other radius is configured.
pub const DEFAULT_EARTH_RADIUS_KM: f64 = 6371.0;

/// A timestamped GPS sample.
///
/// # Example
/// ```
/// use route_analyzer::Waypoint;
/// let wp = Waypoint::new(1_700_000_000.0, 45.0703, 7.6869); // Turin
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub timestamp: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl Waypoint {
    /// Create a new waypoint.
    pub fn new(timestamp: f64, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
        }
    }

    /// Check that both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// A circular region on the sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geofence {
    pub center_lat: f64,
    pub center_lng: f64,
    pub radius_km: f64,
}

impl Geofence {
    /// Create a new geofence.
    pub fn new(center_lat: f64, center_lng: f64, radius_km: f64) -> Self {
        Self {
            center_lat,
            center_lng,
            radius_km,
        }
    }
}

/// Parameters for one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Sphere radius used by every distance computation.
    /// Default: 6371.0 km
    pub earth_radius_km: f64,

    /// Boundary for the outside-geofence metrics.
    pub geofence: Geofence,

    /// Radius of the most frequented area. When absent it is derived from
    /// the farthest distance from the start.
    pub most_frequented_area_radius_km: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            earth_radius_km: DEFAULT_EARTH_RADIUS_KM,
            geofence: Geofence::new(0.0, 0.0, 0.0),
            most_frequented_area_radius_km: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
