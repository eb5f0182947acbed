//! Renderable edge paths
//!
//! Turns a [`CollaboratorEdge`] into a polyline and stroke style. Edges whose
//! endpoints straddle the dateline are drawn as a two-point chord, all others
//! as a sampled great-circle arc.

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::antimeridian::PathStrategy;
use crate::arc::{ArcError, interpolate_arc};
use crate::coordinate::Coordinate;

/// Default number of points sampled along each arc
pub const DEFAULT_ARC_RESOLUTION: usize = 50;

/// Errors that can occur when constructing an edge
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EdgeError {
    #[error("Edge weight must be a finite, non-negative number, got {0}")]
    InvalidWeight(f64),
}

/// A home-to-collaborator edge, weighted by co-authored publications
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CollaboratorEdge {
    origin: Coordinate,
    destination: Coordinate,
    weight: f64,
}

impl CollaboratorEdge {
    pub fn new(origin: Coordinate, destination: Coordinate, weight: f64) -> Result<Self, EdgeError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(EdgeError::InvalidWeight(weight));
        }
        Ok(Self {
            origin,
            destination,
            weight,
        })
    }

    pub fn origin(&self) -> &Coordinate {
        &self.origin
    }

    pub fn destination(&self) -> &Coordinate {
        &self.destination
    }

    /// Publication count
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn strategy(&self) -> PathStrategy {
        PathStrategy::for_endpoints(&self.origin, &self.destination)
    }
}

/// Ordered polyline of at least two coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RenderPath {
    points: Vec<Coordinate>,
}

impl RenderPath {
    /// Wrap points produced inside the crate. Callers guarantee `len >= 2`.
    pub(crate) fn from_points(points: Vec<Coordinate>) -> Self {
        debug_assert!(points.len() >= 2, "render path needs at least two points");
        Self { points }
    }

    /// Two-point chord between the endpoints
    pub fn straight(origin: Coordinate, destination: Coordinate) -> Self {
        Self::from_points(vec![origin, destination])
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> &Coordinate {
        &self.points[0]
    }

    pub fn last(&self) -> &Coordinate {
        &self.points[self.points.len() - 1]
    }

    /// Largest absolute raw longitude jump between consecutive points
    pub fn max_longitude_step(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].lon() - w[0].lon()).abs())
            .fold(0.0, f64::max)
    }

    /// True if a flat renderer would draw a segment across the whole map
    pub fn has_dateline_tear(&self) -> bool {
        self.max_longitude_step() > 180.0
    }
}

/// Stroke styling for an edge polyline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderStyle {
    pub stroke_weight: f64,
}

impl RenderStyle {
    /// `1 + weight / 5`, growing without a cap
    pub fn for_weight(weight: f64) -> Self {
        Self {
            stroke_weight: 1.0 + weight / 5.0,
        }
    }
}

/// Build the path and style for one edge
pub fn build_path(
    edge: &CollaboratorEdge,
    arc_resolution: usize,
) -> Result<(RenderPath, RenderStyle), ArcError> {
    let built = PathBuilder::new(arc_resolution).build(edge)?;
    Ok((built.path, built.style))
}

/// A built edge: the chosen strategy, its polyline and its style
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgePath {
    pub strategy: PathStrategy,
    pub path: RenderPath,
    pub style: RenderStyle,
}

/// Builds render paths at a fixed arc resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathBuilder {
    arc_resolution: usize,
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ARC_RESOLUTION)
    }
}

impl PathBuilder {
    pub fn new(arc_resolution: usize) -> Self {
        Self { arc_resolution }
    }

    pub fn arc_resolution(&self) -> usize {
        self.arc_resolution
    }

    /// Build one edge
    pub fn build(&self, edge: &CollaboratorEdge) -> Result<EdgePath, ArcError> {
        let strategy = edge.strategy();
        let path = match strategy {
            PathStrategy::StraightSegment => RenderPath::straight(edge.origin, edge.destination),
            PathStrategy::GreatCircle => {
                interpolate_arc(&edge.origin, &edge.destination, self.arc_resolution)?
            }
        };

        Ok(EdgePath {
            strategy,
            path,
            style: RenderStyle::for_weight(edge.weight),
        })
    }

    /// Build many edges in parallel, preserving input order
    pub fn build_all(&self, edges: &[CollaboratorEdge]) -> Result<Vec<EdgePath>, ArcError> {
        edges.par_iter().map(|edge| self.build(edge)).collect()
    }
}
