//! Map document output
//!
//! Writes a [`CollaborationMap`] either as GeoJSON or as a self-contained
//! Leaflet HTML page. The HTML page embeds the same GeoJSON document and
//! draws it with `web-assets/map.js`, which the web server also serves.

use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::map::CollaborationMap;

/// Drawing script shared with the web UI
pub const MAP_SCRIPT: &str = include_str!("../web-assets/map.js");

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

/// Edge line colour and opacity
pub const EDGE_COLOR: &str = "black";
pub const EDGE_OPACITY: f64 = 0.5;

const HOME_COLOR: &str = "black";
const HOME_FILL_OPACITY: f64 = 0.9;
const COLLABORATOR_FILL_OPACITY: f64 = 0.7;

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Self-contained Leaflet HTML page
    #[default]
    Html,
    /// GeoJSON FeatureCollection
    #[value(name = "geojson")]
    GeoJson,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::GeoJson => write!(f, "geojson"),
        }
    }
}

/// Convert the map to a GeoJSON FeatureCollection
///
/// Positions use GeoJSON `[lon, lat]` order. View settings are carried in a
/// top-level `map` member.
pub fn to_geojson(map: &CollaborationMap) -> Value {
    let mut features = Vec::with_capacity(1 + map.collaborators.len() * 2);

    features.push(json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": map.home.coordinate.to_lon_lat() },
        "properties": {
            "role": "home",
            "popup": map.home.label,
            "radius": map.home.radius,
            "color": HOME_COLOR,
            "fill_opacity": HOME_FILL_OPACITY,
        }
    }));

    for entry in &map.collaborators {
        let inst = &entry.institution;
        let line: Vec<[f64; 2]> = entry
            .edge
            .path
            .points()
            .iter()
            .map(|p| p.to_lon_lat())
            .collect();

        features.push(json!({
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": line },
            "properties": {
                "role": "edge",
                "institution": inst.name,
                "strategy": entry.edge.strategy,
                "stroke_weight": entry.edge.style.stroke_weight,
                "color": EDGE_COLOR,
                "opacity": EDGE_OPACITY,
            }
        }));

        features.push(json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": inst.coordinate.to_lon_lat() },
            "properties": {
                "role": "collaborator",
                "institution": inst.name,
                "country": inst.country,
                "continent": inst.continent.to_string(),
                "publications": inst.publications,
                "popup": entry.popup,
                "radius": entry.marker_radius,
                "color": entry.color,
                "fill_opacity": COLLABORATOR_FILL_OPACITY,
            }
        }));
    }

    json!({
        "type": "FeatureCollection",
        "map": {
            "center": map.home.coordinate.to_lon_lat(),
            "zoom_start": map.zoom_start,
            "tile_url": map.tile_url,
            "attribution": map.attribution,
        },
        "features": features,
    })
}

/// Write the map as pretty-printed GeoJSON
pub fn write_geojson<W: Write>(map: &CollaborationMap, writer: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &to_geojson(map))?;
    writeln!(writer)
}

/// Write the map as a self-contained HTML page
pub fn write_html<W: Write>(map: &CollaborationMap, writer: &mut W) -> io::Result<()> {
    // `</` inside an inline script would close the tag early
    let data = serde_json::to_string(&to_geojson(map))?.replace("</", "<\\/");

    writeln!(writer, "<!DOCTYPE html>")?;
    writeln!(writer, "<html lang=\"en\">")?;
    writeln!(writer, "<head>")?;
    writeln!(writer, "<meta charset=\"utf-8\">")?;
    writeln!(
        writer,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
    )?;
    writeln!(writer, "<title>Collaboration map</title>")?;
    writeln!(writer, "<link rel=\"stylesheet\" href=\"{}\">", LEAFLET_CSS)?;
    writeln!(writer, "<script src=\"{}\"></script>", LEAFLET_JS)?;
    writeln!(
        writer,
        "<style>html, body, #map {{ height: 100%; margin: 0; }}</style>"
    )?;
    writeln!(writer, "</head>")?;
    writeln!(writer, "<body>")?;
    writeln!(writer, "<div id=\"map\"></div>")?;
    writeln!(writer, "<script>")?;
    writeln!(writer, "{}", MAP_SCRIPT)?;
    writeln!(writer, "drawCollaborationMap(\"map\", {});", data)?;
    writeln!(writer, "</script>")?;
    writeln!(writer, "</body>")?;
    writeln!(writer, "</html>")?;
    Ok(())
}

/// Write the map in the requested format
pub fn render<W: Write>(
    map: &CollaborationMap,
    format: OutputFormat,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        OutputFormat::Html => write_html(map, writer),
        OutputFormat::GeoJson => write_geojson(map, writer),
    }
}
