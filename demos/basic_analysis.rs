//! Basic example of analysing a GPS trajectory.
//!
//! Run with: cargo run --example basic_analysis

use route_analyzer::{Config, Geofence, RouteAnalyzer, Waypoint};

fn main() {
    // A short walk around Piazza Castello, Turin, that loops back on itself
    let walk = vec![
        Waypoint::new(0.0, 45.0710, 7.6850), // Start
        Waypoint::new(60.0, 45.0730, 7.6870),
        Waypoint::new(120.0, 45.0730, 7.6900),
        Waypoint::new(180.0, 45.0700, 7.6880),
        Waypoint::new(240.0, 45.0740, 7.6860),
        Waypoint::new(300.0, 45.0760, 7.6920), // End
    ];

    let config = Config {
        geofence: Geofence::new(45.0711, 7.6857, 0.2),
        ..Config::default()
    };

    println!("Route Analysis Example\n");
    println!(
        "Config: earth radius={} km, geofence=({}, {}) r={} km\n",
        config.earth_radius_km,
        config.geofence.center_lat,
        config.geofence.center_lng,
        config.geofence.radius_km
    );

    let report = RouteAnalyzer::new(config).analyze(&walk);

    if let Some(max) = &report.max_distance_from_start {
        println!(
            "Farthest from start: {:.3} km at t={}",
            max.distance_km, max.waypoint.timestamp
        );
    }
    if let Some(area) = &report.most_frequented_area {
        println!(
            "Most frequented area: {} fixes within {} km of ({:.4}, {:.4})",
            area.entries_count,
            area.area_radius_km,
            area.central_waypoint.latitude,
            area.central_waypoint.longitude
        );
    }
    println!(
        "Outside geofence: {} of {} waypoints",
        report.waypoints_outside_geofence.count,
        walk.len()
    );
    if let Some(pct) = &report.percentage_of_waypoints_outside_geofence {
        println!(
            "  {:.1}% outside, {:.1}% inside",
            pct.waypoints_outside_geofence, pct.waypoints_inside_geofence
        );
    }
    if let Some(length) = &report.straight_line_distance {
        println!("Path length: {:.3} km", length.distance_km);
    }
    if let Some(intersections) = &report.intersections {
        println!("Self-intersections: {}", intersections.len());
        for hit in intersections {
            println!(
                "  segments {} and {} at ({:.5}, {:.5})",
                hit.segment1.index,
                hit.segment2.index,
                hit.intersection_point.latitude,
                hit.intersection_point.longitude
            );
        }
    }
    for failure in &report.failures {
        println!("Failed {:?}: {}", failure.analysis, failure.error);
    }
}
