//! Most frequented area on a hierarchical hexagonal grid.
//!
//! Waypoints are bucketed into H3 cells at a resolution whose average edge
//! length best matches the target area radius. The busiest cell wins and the
//! trajectory waypoint nearest to its centroid represents the area.
//!
//! ## Radius
//!
//! - configured radius: used verbatim
//! - otherwise derived from the farthest distance from the start: below 1 km
//!   it is 0.1 km, else one tenth of it rounded down to one decimal

use std::collections::HashMap;

use h3o::{CellIndex, LatLng, Resolution};
use log::debug;
use serde::Serialize;

use crate::distance::max_distance_from_start;
use crate::error::{AnalysisError, Result};
use crate::geo_utils::nearest_waypoint;
use crate::{Config, Waypoint};

/// Radius used for short trajectories when none is configured.
const SMALL_AREA_RADIUS_KM: f64 = 0.1;

/// The most visited area of the trajectory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MostFrequentedArea {
    pub central_waypoint: Waypoint,
    pub area_radius_km: f64,
    pub entries_count: usize,
}

// Internal cell data during construction
#[derive(Debug, Default)]
struct CellBuilder {
    waypoints: Vec<Waypoint>,
}

impl CellBuilder {
    fn visit_count(&self) -> usize {
        self.waypoints.len()
    }
}

/// Hexagonal grid at a single resolution
struct HexGrid {
    resolution: Resolution,
    cells: HashMap<CellIndex, CellBuilder>,
}

impl HexGrid {
    fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            cells: HashMap::new(),
        }
    }

    /// Add a waypoint to the grid
    fn add_point(&mut self, index: usize, wp: &Waypoint) -> Result<()> {
        let coord = LatLng::new(wp.latitude, wp.longitude).map_err(|_| {
            AnalysisError::InvalidNumeric {
                index,
                latitude: wp.latitude,
                longitude: wp.longitude,
            }
        })?;

        let cell = self.cells.entry(coord.to_cell(self.resolution)).or_default();
        cell.waypoints.push(*wp);
        Ok(())
    }

    /// Busiest cell; equal counts go to the lowest cell id.
    fn busiest(&self) -> Option<(CellIndex, &CellBuilder)> {
        self.cells
            .iter()
            .max_by(|(a_cell, a), (b_cell, b)| {
                a.visit_count()
                    .cmp(&b.visit_count())
                    .then_with(|| u64::from(**b_cell).cmp(&u64::from(**a_cell)))
            })
            .map(|(cell, builder)| (*cell, builder))
    }
}

/// Area radius to use when none is configured.
pub fn derive_area_radius(max_distance_km: f64) -> f64 {
    if max_distance_km < 1.0 {
        SMALL_AREA_RADIUS_KM
    } else {
        max_distance_km.floor() / 10.0
    }
}

/// Pick the resolution whose average edge length is closest to `radius_km`.
///
/// Resolutions are scanned from coarse to fine and the scan stops at the first
/// increase of the distance to the target. Edge lengths shrink monotonically
/// with resolution, so this lands on the closest one.
pub fn select_resolution(radius_km: f64) -> Resolution {
    let mut best = Resolution::Zero;
    let mut best_diff = f64::INFINITY;

    for res in Resolution::range(Resolution::Zero, Resolution::Fifteen) {
        let diff = (res.edge_length_km() - radius_km).abs();
        if diff > best_diff {
            break;
        }
        best = res;
        best_diff = diff;
    }

    best
}

/// Find the most frequented area of the trajectory.
///
/// `max_distance_km` lets a caller that already computed the farthest distance
/// from the start skip recomputing it; it is only used when no radius is
/// configured.
pub fn most_frequented_area(
    waypoints: &[Waypoint],
    config: &Config,
    max_distance_km: Option<f64>,
) -> Result<MostFrequentedArea> {
    if waypoints.is_empty() {
        return Err(AnalysisError::empty("mostFrequentedArea"));
    }

    let (radius_km, resolution) = match config.most_frequented_area_radius_km {
        Some(radius) => (radius, select_resolution(radius)),
        None => {
            let max_km = match max_distance_km {
                Some(d) => d,
                None => max_distance_from_start(waypoints, config.earth_radius_km)?.distance_km,
            };
            let radius = derive_area_radius(max_km);
            if radius < 1.0 {
                (radius, Resolution::Fifteen)
            } else {
                (radius, select_resolution(radius))
            }
        }
    };

    let mut grid = HexGrid::new(resolution);
    for (i, wp) in waypoints.iter().enumerate() {
        grid.add_point(i, wp)?;
    }

    let (cell, builder) = grid
        .busiest()
        .ok_or(AnalysisError::empty("mostFrequentedArea"))?;
    let centroid = LatLng::from(cell);
    let central = nearest_waypoint(
        waypoints,
        centroid.lat(),
        centroid.lng(),
        config.earth_radius_km,
    )
    .copied()
    .ok_or(AnalysisError::empty("mostFrequentedArea"))?;

    debug!(
        "[HexGrid] resolution {:?}, {} cells, busiest {} with {} waypoints",
        resolution,
        grid.cells.len(),
        cell,
        builder.visit_count()
    );

    Ok(MostFrequentedArea {
        central_waypoint: central,
        area_radius_km: radius_km,
        entries_count: builder.visit_count(),
    })
}
