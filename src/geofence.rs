//! Circular geofence classification.

use serde::Serialize;

use crate::geo_utils::great_circle_distance;
use crate::{Geofence, Waypoint};

/// Waypoints lying outside a geofence.
///
/// `central_waypoint` echoes the geofence center with a zero timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaypointsOutsideGeofence {
    pub central_waypoint: Waypoint,
    pub area_radius_km: f64,
    pub count: usize,
    pub waypoints: Vec<Waypoint>,
}

/// Share of waypoints on each side of the geofence, in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentageOfWaypointsOutsideGeofence {
    pub waypoints_outside_geofence: f64,
    pub waypoints_inside_geofence: f64,
}

impl Geofence {
    /// Distance from the geofence center to `wp`.
    pub fn distance_to(&self, wp: &Waypoint, earth_radius_km: f64) -> f64 {
        great_circle_distance(
            self.center_lat,
            self.center_lng,
            wp.latitude,
            wp.longitude,
            earth_radius_km,
        )
    }

    /// Outside means strictly farther than the radius.
    pub fn is_outside(&self, wp: &Waypoint, earth_radius_km: f64) -> bool {
        self.distance_to(wp, earth_radius_km) > self.radius_km
    }

    /// A waypoint on the boundary counts as inside.
    pub fn contains(&self, wp: &Waypoint, earth_radius_km: f64) -> bool {
        !self.is_outside(wp, earth_radius_km)
    }

    /// The center as a zero-timestamp waypoint.
    pub fn center(&self) -> Waypoint {
        Waypoint::new(0.0, self.center_lat, self.center_lng)
    }
}

/// Collect the waypoints whose distance to the center strictly exceeds the radius.
///
/// Never fails: an empty trajectory yields a count of 0.
pub fn waypoints_outside_geofence(
    waypoints: &[Waypoint],
    geofence: &Geofence,
    earth_radius_km: f64,
) -> WaypointsOutsideGeofence {
    let outside: Vec<Waypoint> = waypoints
        .iter()
        .filter(|wp| geofence.is_outside(wp, earth_radius_km))
        .copied()
        .collect();

    WaypointsOutsideGeofence {
        central_waypoint: geofence.center(),
        area_radius_km: geofence.radius_km,
        count: outside.len(),
        waypoints: outside,
    }
}

impl WaypointsOutsideGeofence {
    /// Percent breakdown against the size of the analysed trajectory.
    ///
    /// Returns `None` when the trajectory was empty.
    pub fn percentage(
        &self,
        total_waypoints: usize,
    ) -> Option<PercentageOfWaypointsOutsideGeofence> {
        if total_waypoints == 0 {
            return None;
        }
        let outside = self.count as f64 * 100.0 / total_waypoints as f64;
        Some(PercentageOfWaypointsOutsideGeofence {
            waypoints_outside_geofence: outside,
            waypoints_inside_geofence: 100.0 - outside,
        })
    }
}
