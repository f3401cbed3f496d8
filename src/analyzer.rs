//! Runs every analysis over one trajectory and assembles the report.
//!
//! Analyses are independent: a failure in one (for example an empty
//! trajectory) is recorded in [`DataReport::failures`] and every other
//! metric is still reported. The only shared input is the farthest distance
//! from the start, which the most-frequented-area analysis reuses to derive
//! its radius when none is configured.

use std::time::Instant;

use log::{info, warn};
use serde::{Serialize, Serializer};

use crate::distance::{
    max_distance_from_start, straight_line_distance, MaxDistanceFromStart, StraightLineDistance,
};
use crate::error::{AnalysisError, Result};
use crate::geofence::{
    waypoints_outside_geofence, PercentageOfWaypointsOutsideGeofence, WaypointsOutsideGeofence,
};
use crate::hexgrid::{most_frequented_area, MostFrequentedArea};
use crate::intersections::{find_intersections, Intersection};
use crate::{Config, Waypoint};

/// Identifies an analysis in a failure record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Analysis {
    MaxDistanceFromStart,
    MostFrequentedArea,
    StraightLineDistance,
    Intersections,
}

/// An analysis that could not produce its metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisFailure {
    pub analysis: Analysis,
    #[serde(serialize_with = "serialize_display")]
    pub error: AnalysisError,
}

fn serialize_display<T, S>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: std::fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

/// Everything computed for one trajectory.
///
/// Sections that failed or were not requested are `None` and are left out of
/// the serialized form. The advanced sections (percentage breakdown,
/// straight-line distance, intersections) are only filled in advanced mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_distance_from_start: Option<MaxDistanceFromStart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_frequented_area: Option<MostFrequentedArea>,
    pub waypoints_outside_geofence: WaypointsOutsideGeofence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage_of_waypoints_outside_geofence: Option<PercentageOfWaypointsOutsideGeofence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub straight_line_distance: Option<StraightLineDistance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersections: Option<Vec<Intersection>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<AnalysisFailure>,
}

impl DataReport {
    /// True when every requested analysis succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// Raw per-analysis outcomes before assembly
struct Outcomes {
    max_distance: Result<MaxDistanceFromStart>,
    frequented: Result<MostFrequentedArea>,
    outside: WaypointsOutsideGeofence,
    straight: Option<Result<StraightLineDistance>>,
    intersections: Option<Result<Vec<Intersection>>>,
}

/// Runs the analyses for a fixed configuration.
///
/// # Example
/// ```
/// use route_analyzer::{Config, RouteAnalyzer};
///
/// let report = RouteAnalyzer::new(Config::default()).analyze(&[]);
/// assert!(report.max_distance_from_start.is_none());
/// assert_eq!(report.waypoints_outside_geofence.count, 0);
/// assert!(!report.is_complete());
/// ```
#[derive(Debug, Clone)]
pub struct RouteAnalyzer {
    config: Config,
    advanced: bool,
}

impl RouteAnalyzer {
    /// Create an analyzer producing the full (advanced) report.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            advanced: true,
        }
    }

    /// Toggle the advanced sections of the report.
    pub fn with_advanced(mut self, advanced: bool) -> Self {
        self.advanced = advanced;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyse a trajectory sequentially.
    pub fn analyze(&self, waypoints: &[Waypoint]) -> DataReport {
        let start = Instant::now();
        let radius = self.config.earth_radius_km;

        let (max_distance, frequented) = self.distance_and_area(waypoints);
        let outside = waypoints_outside_geofence(waypoints, &self.config.geofence, radius);
        let (straight, intersections) = if self.advanced {
            (
                Some(straight_line_distance(waypoints, radius)),
                Some(find_intersections(waypoints)),
            )
        } else {
            (None, None)
        };

        let report = self.assemble(
            waypoints.len(),
            Outcomes {
                max_distance,
                frequented,
                outside,
                straight,
                intersections,
            },
        );
        info!(
            "[Analyzer] {} waypoints analysed in {}ms ({} failures)",
            waypoints.len(),
            start.elapsed().as_millis(),
            report.failures.len()
        );
        report
    }

    /// Analyse a trajectory with the independent analyses running concurrently.
    ///
    /// Produces the same report as [`RouteAnalyzer::analyze`].
    #[cfg(feature = "parallel")]
    pub fn analyze_parallel(&self, waypoints: &[Waypoint]) -> DataReport {
        let start = Instant::now();
        let radius = self.config.earth_radius_km;

        let ((max_distance, frequented), (outside, (straight, intersections))) = rayon::join(
            || self.distance_and_area(waypoints),
            || {
                rayon::join(
                    || waypoints_outside_geofence(waypoints, &self.config.geofence, radius),
                    || {
                        if self.advanced {
                            let (straight, intersections) = rayon::join(
                                || straight_line_distance(waypoints, radius),
                                || find_intersections(waypoints),
                            );
                            (Some(straight), Some(intersections))
                        } else {
                            (None, None)
                        }
                    },
                )
            },
        );

        let report = self.assemble(
            waypoints.len(),
            Outcomes {
                max_distance,
                frequented,
                outside,
                straight,
                intersections,
            },
        );
        info!(
            "[Analyzer] {} waypoints analysed in parallel in {}ms ({} failures)",
            waypoints.len(),
            start.elapsed().as_millis(),
            report.failures.len()
        );
        report
    }

    /// The farthest distance feeds the area radius, so these two run together.
    fn distance_and_area(
        &self,
        waypoints: &[Waypoint],
    ) -> (Result<MaxDistanceFromStart>, Result<MostFrequentedArea>) {
        let max_distance = max_distance_from_start(waypoints, self.config.earth_radius_km);
        let known_distance = max_distance.as_ref().ok().map(|m| m.distance_km);
        let frequented = most_frequented_area(waypoints, &self.config, known_distance);
        (max_distance, frequented)
    }

    fn assemble(&self, total_waypoints: usize, outcomes: Outcomes) -> DataReport {
        let mut failures = Vec::new();

        let max_distance_from_start = record(
            Analysis::MaxDistanceFromStart,
            outcomes.max_distance,
            &mut failures,
        );
        let most_frequented_area =
            record(Analysis::MostFrequentedArea, outcomes.frequented, &mut failures);
        let straight_line_distance = outcomes
            .straight
            .and_then(|r| record(Analysis::StraightLineDistance, r, &mut failures));
        let intersections = outcomes
            .intersections
            .and_then(|r| record(Analysis::Intersections, r, &mut failures));

        let percentage_of_waypoints_outside_geofence = if self.advanced {
            outcomes.outside.percentage(total_waypoints)
        } else {
            None
        };

        DataReport {
            max_distance_from_start,
            most_frequented_area,
            waypoints_outside_geofence: outcomes.outside,
            percentage_of_waypoints_outside_geofence,
            straight_line_distance,
            intersections,
            failures,
        }
    }
}

fn record<T>(
    analysis: Analysis,
    outcome: Result<T>,
    failures: &mut Vec<AnalysisFailure>,
) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(error) => {
            warn!("[Analyzer] {:?} failed: {}", analysis, error);
            failures.push(AnalysisFailure { analysis, error });
            None
        }
    }
}
