//! Integration tests for RouteAnalyzer
//!
//! Exercises the report-level properties of a full analysis run.

use route_analyzer::geo_utils::great_circle_distance;
use route_analyzer::{straight_line_distance, Analysis, Config, Geofence, RouteAnalyzer, Waypoint};

const R: f64 = 6371.0;

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn config() -> Config {
    Config {
        geofence: Geofence::new(45.0703, 7.6869, 1.0),
        ..Config::default()
    }
}

/// Morning run around Turin: out along the river, a loop, and back
fn turin_run() -> Vec<Waypoint> {
    vec![
        Waypoint::new(1_700_000_000.0, 45.0703, 7.6869),
        Waypoint::new(1_700_000_060.0, 45.0650, 7.6920),
        Waypoint::new(1_700_000_120.0, 45.0600, 7.6950),
        Waypoint::new(1_700_000_180.0, 45.0550, 7.6900),
        Waypoint::new(1_700_000_240.0, 45.0620, 7.6880),
        Waypoint::new(1_700_000_300.0, 45.0640, 7.6990),
        Waypoint::new(1_700_000_360.0, 45.0703, 7.6869),
    ]
}

/// Five points tracing a closed figure eight with exactly-representable offsets
fn figure_eight() -> Vec<Waypoint> {
    [(45.0, 7.0), (45.25, 7.25), (45.25, 7.0), (45.0, 7.25), (45.0, 7.0)]
        .iter()
        .enumerate()
        .map(|(i, &(lat, lng))| Waypoint::new(i as f64 * 10.0, lat, lng))
        .collect()
}

#[test]
fn test_max_distance_is_distance_to_reported_waypoint() {
    let track = turin_run();
    let report = RouteAnalyzer::new(config()).analyze(&track);
    let max = report.max_distance_from_start.unwrap();

    assert!(max.distance_km >= 0.0);
    let expected = great_circle_distance(
        track[0].latitude,
        track[0].longitude,
        max.waypoint.latitude,
        max.waypoint.longitude,
        R,
    );
    assert_eq!(max.distance_km, expected);
    assert_eq!(max.waypoint.timestamp, 1_700_000_180.0);
}

#[test]
fn test_every_section_present_for_valid_track() {
    let report = RouteAnalyzer::new(config()).analyze(&turin_run());

    assert!(report.is_complete());
    assert!(report.max_distance_from_start.is_some());
    assert!(report.most_frequented_area.is_some());
    assert!(report.percentage_of_waypoints_outside_geofence.is_some());
    assert!(report.straight_line_distance.is_some());
    assert!(report.intersections.is_some());
}

#[test]
fn test_figure_eight_has_one_intersection() {
    let report = RouteAnalyzer::new(config()).analyze(&figure_eight());
    let intersections = report.intersections.unwrap();

    assert_eq!(intersections.len(), 1);
    let hit = &intersections[0];
    assert_eq!(hit.segment1.index, 0);
    assert_eq!(hit.segment2.index, 2);
    // The diagonals cross between fixes
    assert_eq!(hit.intersection_point.timestamp, 0.0);
    assert!(approx_eq(hit.intersection_point.latitude, 45.125, 1e-9));
    assert!(approx_eq(hit.intersection_point.longitude, 7.125, 1e-9));
}

#[test]
fn test_no_adjacent_segments_reported() {
    let report = RouteAnalyzer::new(config()).analyze(&turin_run());
    for hit in report.intersections.unwrap() {
        assert!(hit.segment2.index > hit.segment1.index + 1);
    }
}

#[test]
fn test_stationary_fix_is_not_a_crossing() {
    let track = vec![
        Waypoint::new(0.0, 45.000, 7.0),
        Waypoint::new(10.0, 45.001, 7.0),
        Waypoint::new(20.0, 45.001, 7.0),
        Waypoint::new(30.0, 45.002, 7.0),
    ];
    let report = RouteAnalyzer::new(config()).analyze(&track);
    assert_eq!(report.intersections, Some(vec![]));
}

#[test]
fn test_path_length_of_short_tracks() {
    let single = [Waypoint::new(0.0, 45.0, 7.0)];
    assert_eq!(straight_line_distance(&single, R).unwrap().distance_km, 0.0);

    let pair = [Waypoint::new(0.0, 10.0, 0.0), Waypoint::new(1.0, 10.0, 1.0)];
    let length = straight_line_distance(&pair, R).unwrap().distance_km;
    assert_eq!(length, great_circle_distance(10.0, 0.0, 10.0, 1.0, R));
    assert!(approx_eq(length, 109.5, 0.2));
}

#[test]
fn test_zero_radius_geofence() {
    let track = turin_run();
    let config = Config {
        geofence: Geofence::new(track[0].latitude, track[0].longitude, 0.0),
        ..Config::default()
    };
    let report = RouteAnalyzer::new(config).analyze(&track);

    // First and last fixes share the center coordinates
    assert_eq!(report.waypoints_outside_geofence.count, track.len() - 2);
    assert!(report
        .waypoints_outside_geofence
        .waypoints
        .iter()
        .all(|wp| wp.latitude != track[0].latitude || wp.longitude != track[0].longitude));
}

#[test]
fn test_larger_area_radius_keeps_cluster() {
    let mut track: Vec<Waypoint> = (0..15)
        .map(|i| Waypoint::new(i as f64, 45.0703, 7.6869))
        .collect();
    track.push(Waypoint::new(15.0, 51.5074, -0.1278)); // London
    track.push(Waypoint::new(16.0, 40.7128, -74.0060)); // New York

    let mut previous = 0;
    for radius in [0.05, 1.0, 10.0, 100.0] {
        let config = Config {
            most_frequented_area_radius_km: Some(radius),
            ..config()
        };
        let area = RouteAnalyzer::new(config)
            .analyze(&track)
            .most_frequented_area
            .unwrap();
        assert!(area.entries_count >= previous, "radius {radius}");
        assert_eq!(area.area_radius_km, radius);
        previous = area.entries_count;
    }
    assert!(previous >= 15);
}

#[test]
fn test_empty_track_reports_failures() {
    let report = RouteAnalyzer::new(config()).analyze(&[]);

    assert!(!report.is_complete());
    assert_eq!(report.waypoints_outside_geofence.count, 0);
    assert_eq!(report.intersections, Some(vec![]));
    assert!(report
        .failures
        .iter()
        .any(|f| f.analysis == Analysis::MaxDistanceFromStart));
}

#[test]
fn test_non_finite_waypoint_isolated_to_affected_analyses() {
    let mut track = turin_run();
    track[3].longitude = f64::NAN;
    let report = RouteAnalyzer::new(config()).analyze(&track);

    let failed: Vec<Analysis> = report.failures.iter().map(|f| f.analysis).collect();
    assert!(failed.contains(&Analysis::MostFrequentedArea));
    assert!(failed.contains(&Analysis::Intersections));
    assert!(report.max_distance_from_start.is_some());
    assert!(report.straight_line_distance.is_some());
}

#[test]
fn test_idempotent() {
    let analyzer = RouteAnalyzer::new(config());
    let track = turin_run();
    let first = analyzer.analyze(&track);
    let second = analyzer.analyze(&track);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
