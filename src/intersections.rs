//! # Self-Intersections
//!
//! Finds the places where a recorded path crosses itself.
//!
//! ## Algorithm
//! 1. Reject non-finite coordinates before any indexing
//! 2. Build the consecutive segments (segment `i` joins waypoints `i` and `i + 1`)
//! 3. Bulk-load an R-tree over the segment bounding boxes
//! 4. For every segment, query overlapping boxes and drop itself and its
//!    neighbours (they always share an endpoint). Segments separated only by
//!    zero-length segments count as neighbours too, as do the first and last
//!    segments of a closed path
//! 5. Test each remaining unordered pair once with an exact line intersection
//!
//! Geometry is planar on (longitude, latitude). Paths crossing the antimeridian
//! are not unwrapped.
//!
//! Zero-length segments (two consecutive identical fixes) are treated as
//! points, so a stationary fix never turns a straight path into a crossing.
//! Collinear overlaps count as intersections and are reported at the
//! first shared point.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Intersects, Line};
use log::{debug, info};
use rstar::{RTree, RTreeObject, AABB};
use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::Waypoint;

/// Straight line between two consecutive waypoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Position of the segment along the path
    pub index: usize,
    pub point1: Waypoint,
    pub point2: Waypoint,
}

/// A crossing between two non-adjacent segments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Intersection {
    /// Carries the timestamp of a recorded waypoint at exactly this
    /// coordinate, or 0 when the crossing lies between fixes.
    pub intersection_point: Waypoint,
    /// The segment with the lower index
    pub segment1: Segment,
    pub segment2: Segment,
}

// =============================================================================
// R-tree Indexed Segment
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct IndexedSegment {
    idx: usize,
    line: Line<f64>,
}

impl RTreeObject for IndexedSegment {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.line.start.x, self.line.start.y],
            [self.line.end.x, self.line.end.y],
        )
    }
}

impl IndexedSegment {
    fn from_segment(segment: &Segment) -> Self {
        Self {
            idx: segment.index,
            line: Line::new(to_coord(&segment.point1), to_coord(&segment.point2)),
        }
    }
}

#[inline]
fn to_coord(wp: &Waypoint) -> Coord<f64> {
    Coord {
        x: wp.longitude,
        y: wp.latitude,
    }
}

// =============================================================================
// Timestamp Lookup
// =============================================================================

/// Coordinate to timestamp map. The first waypoint recorded at a coordinate
/// wins, so later fixes at the same spot are not recoverable.
struct TimestampLookup {
    by_coord: HashMap<(u64, u64), f64>,
}

impl TimestampLookup {
    fn new(waypoints: &[Waypoint]) -> Self {
        let mut by_coord = HashMap::with_capacity(waypoints.len());
        for wp in waypoints {
            by_coord
                .entry(coord_key(wp.latitude, wp.longitude))
                .or_insert(wp.timestamp);
        }
        Self { by_coord }
    }

    fn waypoint_at(&self, coord: Coord<f64>) -> Waypoint {
        let timestamp = self
            .by_coord
            .get(&coord_key(coord.y, coord.x))
            .copied()
            .unwrap_or(0.0);
        Waypoint::new(timestamp, coord.y, coord.x)
    }
}

fn coord_key(lat: f64, lng: f64) -> (u64, u64) {
    // + 0.0 folds -0.0 into 0.0
    ((lat + 0.0).to_bits(), (lng + 0.0).to_bits())
}

// =============================================================================
// Segment Construction
// =============================================================================

/// Build the ordered segments of a trajectory.
///
/// Fails with [`AnalysisError::InvalidNumeric`] on a non-finite coordinate and
/// with [`AnalysisError::InsufficientPoints`] below two waypoints.
pub fn trajectory_segments(waypoints: &[Waypoint]) -> Result<Vec<Segment>> {
    if let Some((index, wp)) = waypoints.iter().enumerate().find(|(_, wp)| !wp.is_finite()) {
        return Err(AnalysisError::InvalidNumeric {
            index,
            latitude: wp.latitude,
            longitude: wp.longitude,
        });
    }

    if waypoints.len() < 2 {
        return Err(AnalysisError::InsufficientPoints {
            point_count: waypoints.len(),
            minimum_required: 2,
        });
    }

    Ok(waypoints
        .windows(2)
        .enumerate()
        .map(|(index, w)| Segment {
            index,
            point1: w[0],
            point2: w[1],
        })
        .collect())
}

// =============================================================================
// Intersection Detection
// =============================================================================

/// Neighbour test that looks through runs of zero-length segments.
///
/// On a closed path (last fix equal to the first) the first and last moving
/// segments are neighbours as well.
struct Adjacency {
    // moving_before[k] = number of segments with index < k that have length
    moving_before: Vec<usize>,
    closed: bool,
}

impl Adjacency {
    fn new(segments: &[IndexedSegment]) -> Self {
        let mut moving_before = Vec::with_capacity(segments.len() + 1);
        let mut moving = 0;
        moving_before.push(moving);
        for seg in segments {
            if seg.line.start != seg.line.end {
                moving += 1;
            }
            moving_before.push(moving);
        }
        let closed = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => first.line.start == last.line.end,
            _ => false,
        };
        Self {
            moving_before,
            closed,
        }
    }

    /// True when only zero-length segments separate `i < j`, either along the
    /// path or around the closing point.
    fn are_neighbours(&self, i: usize, j: usize) -> bool {
        if j <= i + 1 || self.moving_before[j] == self.moving_before[i + 1] {
            return true;
        }
        let total = self.moving_before[self.moving_before.len() - 1];
        self.closed && self.moving_before[i] + (total - self.moving_before[j + 1]) == 0
    }
}

/// Exact intersection of two segments, if any.
fn intersection_point(a: &Line<f64>, b: &Line<f64>) -> Option<Coord<f64>> {
    let a_is_point = a.start == a.end;
    let b_is_point = b.start == b.end;

    match (a_is_point, b_is_point) {
        (true, true) => (a.start == b.start).then_some(a.start),
        (true, false) => b.intersects(&a.start).then_some(a.start),
        (false, true) => a.intersects(&b.start).then_some(b.start),
        (false, false) => match line_intersection(*a, *b)? {
            LineIntersection::SinglePoint { intersection, .. } => Some(intersection),
            LineIntersection::Collinear { intersection } => Some(intersection.start),
        },
    }
}

/// Find every crossing between non-adjacent segments of the path.
///
/// Trajectories with fewer than two waypoints have no segments and yield an
/// empty result. The output is sorted by segment indices.
///
/// # Example
/// ```
/// use route_analyzer::{Waypoint, find_intersections};
///
/// // A bow tie: the first and third segments cross
/// let track = vec![
///     Waypoint::new(0.0, 45.00, 7.00),
///     Waypoint::new(1.0, 45.01, 7.01),
///     Waypoint::new(2.0, 45.00, 7.01),
///     Waypoint::new(3.0, 45.01, 7.00),
/// ];
/// let crossings = find_intersections(&track).unwrap();
/// assert_eq!(crossings.len(), 1);
/// assert_eq!(crossings[0].segment1.index, 0);
/// assert_eq!(crossings[0].segment2.index, 2);
/// ```
pub fn find_intersections(waypoints: &[Waypoint]) -> Result<Vec<Intersection>> {
    let segments = match trajectory_segments(waypoints) {
        Ok(segments) => segments,
        Err(AnalysisError::InsufficientPoints { point_count, .. }) => {
            debug!("[Intersections] {} waypoints, no segments to test", point_count);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let start = Instant::now();

    let indexed: Vec<IndexedSegment> = segments.iter().map(IndexedSegment::from_segment).collect();
    let rtree = RTree::bulk_load(indexed.clone());
    let lookup = TimestampLookup::new(waypoints);
    let adjacency = Adjacency::new(&indexed);

    let mut tested: HashSet<(usize, usize)> = HashSet::new();
    let mut found = Vec::new();

    for seg in &indexed {
        for candidate in rtree.locate_in_envelope_intersecting(&seg.envelope()) {
            // Skip self and neighbours sharing an endpoint
            if candidate.idx.abs_diff(seg.idx) <= 1 {
                continue;
            }

            let pair = (seg.idx.min(candidate.idx), seg.idx.max(candidate.idx));
            if adjacency.are_neighbours(pair.0, pair.1) || !tested.insert(pair) {
                continue;
            }

            // Always lower index first so the computed point does not depend on query order
            if let Some(point) = intersection_point(&indexed[pair.0].line, &indexed[pair.1].line) {
                found.push(Intersection {
                    intersection_point: lookup.waypoint_at(point),
                    segment1: segments[pair.0].clone(),
                    segment2: segments[pair.1].clone(),
                });
            }
        }
    }

    found.sort_by_key(|i| (i.segment1.index, i.segment2.index));

    info!(
        "[Intersections] {} segments, {} candidate pairs, {} crossings in {}ms",
        segments.len(),
        tested.len(),
        found.len(),
        start.elapsed().as_millis()
    );

    Ok(found)
}
