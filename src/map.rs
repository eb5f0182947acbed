//! Collaboration map model
//!
//! Combines the location table, continent palette and path builder into the
//! complete set of things to draw: a home marker, one marker per collaborator
//! and one styled polyline from home to each collaborator.

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::antimeridian::PathStrategy;
use crate::arc::ArcError;
use crate::config::MapConfig;
use crate::continent::Palette;
use crate::coordinate::Coordinate;
use crate::locations::{LocatedInstitution, LocationTable, SkippedInstitution};
use crate::path::{CollaboratorEdge, EdgeError, EdgePath, PathBuilder};

/// Home marker radius in pixels
pub const HOME_MARKER_RADIUS: f64 = 10.0;

/// Errors that can occur while building the map
#[derive(Error, Debug)]
pub enum MapError {
    #[error("Path error: {0}")]
    Arc(#[from] ArcError),

    #[error("Edge error for '{institution}': {source}")]
    Edge {
        institution: String,
        #[source]
        source: EdgeError,
    },
}

/// Collaborator marker radius: `3 + publications / 3`
pub fn marker_radius(publications: f64) -> f64 {
    3.0 + publications / 3.0
}

/// Popup text for a collaborator marker
pub fn marker_popup(institution: &LocatedInstitution) -> String {
    format!(
        "{} ({}) - {} papers",
        institution.name, institution.country, institution.publications
    )
}

/// The fixed origin of every edge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeMarker {
    pub coordinate: Coordinate,
    pub label: String,
    pub radius: f64,
}

/// One collaborator: marker styling plus the edge back to home
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollaboratorEntry {
    pub institution: LocatedInstitution,
    pub color: String,
    pub marker_radius: f64,
    pub popup: String,
    pub edge: EdgePath,
}

/// Everything needed to render the map
#[derive(Debug, Clone, Serialize)]
pub struct CollaborationMap {
    pub home: HomeMarker,
    pub zoom_start: u8,
    pub tile_url: String,
    pub attribution: String,
    pub arc_resolution: usize,
    pub collaborators: Vec<CollaboratorEntry>,
    pub skipped: Vec<SkippedInstitution>,
}

impl CollaborationMap {
    pub fn straight_segment_count(&self) -> usize {
        self.collaborators
            .iter()
            .filter(|c| c.edge.strategy == PathStrategy::StraightSegment)
            .count()
    }
}

/// Build the map model from resolved locations
pub fn build_map(
    table: &LocationTable,
    config: &MapConfig,
    palette: &Palette,
) -> Result<CollaborationMap, MapError> {
    let home = config.home;
    let institutions: Vec<&LocatedInstitution> = table.iter().collect();

    let edges = institutions
        .iter()
        .map(|inst| {
            CollaboratorEdge::new(home, inst.coordinate, inst.publications).map_err(|source| {
                MapError::Edge {
                    institution: inst.name.clone(),
                    source,
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let paths = PathBuilder::new(config.arc_resolution).build_all(&edges)?;

    let collaborators: Vec<CollaboratorEntry> = institutions
        .into_iter()
        .zip(paths)
        .map(|(inst, edge)| CollaboratorEntry {
            color: palette.color(inst.continent).to_string(),
            marker_radius: marker_radius(inst.publications),
            popup: marker_popup(inst),
            institution: inst.clone(),
            edge,
        })
        .collect();

    let map = CollaborationMap {
        home: HomeMarker {
            coordinate: home,
            label: config.home_label.clone(),
            radius: HOME_MARKER_RADIUS,
        },
        zoom_start: config.zoom_start,
        tile_url: config.tile_url.clone(),
        attribution: config.attribution.clone(),
        arc_resolution: config.arc_resolution,
        collaborators,
        skipped: table.skipped().to_vec(),
    };

    info!(
        collaborators = map.collaborators.len(),
        straight_segments = map.straight_segment_count(),
        "built collaboration map"
    );
    Ok(map)
}
