//! Antimeridian (dateline) policy
//!
//! A flat, non-wrapping map draws a straight screen-space segment between
//! consecutive vertices. When two endpoints are more than 180 degrees apart in
//! raw longitude, the minor great-circle arc between them passes through the
//! ±180 meridian and would be drawn as a line across the whole map. The
//! policy only looks at the endpoints and falls back to a straight segment
//! for those pairs instead of clipping the arc.

use std::fmt;

use serde::Serialize;

use crate::coordinate::Coordinate;

/// Check whether two longitudes would wrap around the back of a flat map
pub fn crosses_dateline(lon1: f64, lon2: f64) -> bool {
    (lon1 - lon2).abs() > 180.0
}

/// How an edge is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStrategy {
    /// Dense polyline along the minor great circle
    GreatCircle,
    /// Two-point chord between the endpoints
    StraightSegment,
}

impl PathStrategy {
    /// Pick the strategy for an edge between two coordinates
    pub fn for_endpoints(origin: &Coordinate, destination: &Coordinate) -> Self {
        if crosses_dateline(origin.lon(), destination.lon()) {
            PathStrategy::StraightSegment
        } else {
            PathStrategy::GreatCircle
        }
    }
}

impl fmt::Display for PathStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStrategy::GreatCircle => write!(f, "great-circle arc"),
            PathStrategy::StraightSegment => write!(f, "straight segment"),
        }
    }
}
