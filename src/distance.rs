//! Distance metrics over a whole trajectory.

use serde::Serialize;

use crate::error::{OptionExt, Result};
use crate::geo_utils::{haversine_distance, polyline_length};
use crate::Waypoint;

/// The waypoint farthest from the first one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxDistanceFromStart {
    pub waypoint: Waypoint,
    pub distance_km: f64,
}

/// Length of the recorded path, summed segment by segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StraightLineDistance {
    pub distance_km: f64,
}

/// Find the waypoint farthest from the start of the trajectory.
///
/// Only a strictly greater distance replaces the current best, so ties keep
/// the earliest waypoint. A single-waypoint trajectory returns the start
/// itself at distance 0.
///
/// # Example
/// ```
/// use route_analyzer::{Waypoint, max_distance_from_start};
///
/// let track = vec![
///     Waypoint::new(0.0, 45.00, 7.00),
///     Waypoint::new(1.0, 45.10, 7.00),
///     Waypoint::new(2.0, 45.05, 7.00),
/// ];
/// let result = max_distance_from_start(&track, 6371.0).unwrap();
/// assert_eq!(result.waypoint.timestamp, 1.0);
/// ```
pub fn max_distance_from_start(
    waypoints: &[Waypoint],
    earth_radius_km: f64,
) -> Result<MaxDistanceFromStart> {
    let start = waypoints.first().ok_or_empty("maxDistanceFromStart")?;

    let mut farthest = *start;
    let mut max_distance = 0.0;

    for wp in &waypoints[1..] {
        let d = haversine_distance(start, wp, earth_radius_km);
        if d > max_distance {
            max_distance = d;
            farthest = *wp;
        }
    }

    Ok(MaxDistanceFromStart {
        waypoint: farthest,
        distance_km: max_distance,
    })
}

/// Total recorded-path length.
///
/// Fails on an empty trajectory; a single waypoint yields 0.
pub fn straight_line_distance(
    waypoints: &[Waypoint],
    earth_radius_km: f64,
) -> Result<StraightLineDistance> {
    waypoints.first().ok_or_empty("straightLineDistance")?;

    Ok(StraightLineDistance {
        distance_km: polyline_length(waypoints, earth_radius_km),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisError;

    const R: f64 = 6371.0;

    fn sample_track() -> Vec<Waypoint> {
        vec![
            Waypoint::new(0.0, 45.0700, 7.6800),
            Waypoint::new(10.0, 45.0750, 7.6850),
            Waypoint::new(20.0, 45.0900, 7.7000),
            Waypoint::new(30.0, 45.0800, 7.6900),
        ]
    }

    #[test]
    fn test_max_distance_empty() {
        assert!(matches!(
            max_distance_from_start(&[], R),
            Err(AnalysisError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_max_distance_single_point() {
        let wp = Waypoint::new(5.0, 45.0, 7.0);
        let result = max_distance_from_start(&[wp], R).unwrap();
        assert_eq!(result.waypoint, wp);
        assert_eq!(result.distance_km, 0.0);
    }

    #[test]
    fn test_max_distance_matches_haversine() {
        let track = sample_track();
        let result = max_distance_from_start(&track, R).unwrap();
        assert_eq!(result.waypoint.timestamp, 20.0);
        assert!(result.distance_km >= 0.0);
        assert_eq!(
            result.distance_km,
            haversine_distance(&track[0], &result.waypoint, R)
        );
    }

    #[test]
    fn test_max_distance_tie_keeps_earliest() {
        let track = vec![
            Waypoint::new(0.0, 0.0, 0.0),
            Waypoint::new(1.0, 0.0, 1.0),
            Waypoint::new(2.0, 0.0, -1.0),
        ];
        let result = max_distance_from_start(&track, R).unwrap();
        assert_eq!(result.waypoint.timestamp, 1.0);
    }

    #[test]
    fn test_straight_line_distance() {
        assert!(straight_line_distance(&[], R).is_err());

        let single = [Waypoint::new(0.0, 45.0, 7.0)];
        assert_eq!(straight_line_distance(&single, R).unwrap().distance_km, 0.0);

        let track = sample_track();
        let total = straight_line_distance(&track, R).unwrap().distance_km;
        let direct = haversine_distance(&track[0], &track[3], R);
        assert!(total >= direct);
    }
}
