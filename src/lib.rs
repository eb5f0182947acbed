//! # collab-map - Research Collaboration World Map
//!
//! Turns a table of collaborating institutions (name, country, co-authored
//! publication count) into a world map centered on a fixed home location,
//! with one marker per institution and one line from home to each of them.
//!
//! ## Overview
//!
//! The geometry layer decides how each line is drawn on a flat,
//! non-wrapping map:
//!
//! 1. **Spherical math** - haversine angular separation on the unit sphere
//! 2. **Arc interpolation** - slerp along the minor great circle
//! 3. **Antimeridian policy** - endpoint check for dateline wrap
//! 4. **Path building** - arc or straight chord, plus stroke weight
//!
//! Everything around it (CSV input, geocoding, continent colours, HTML and
//! GeoJSON output, the web view) is thin glue.
//!
//! ## Usage
//!
//! ```bash
//! # Geocode collab.csv and write scival_collaboration_map.html
//! collab-map collab.csv
//!
//! # GeoJSON instead of HTML, with a cached geocoder
//! collab-map --format geojson --cache geocode-cache.json collab.csv
//!
//! # Serve the map locally
//! collab-map --web collab.csv
//! ```
//!
//! ## Path Rule
//!
//! ```text
//! |lon(home) - lon(collaborator)| > 180  =>  straight 2-point segment
//! otherwise                               =>  N-point great-circle arc
//! stroke weight = 1 + publications / 5
//! ```

pub mod antimeridian;
pub mod arc;
pub mod config;
pub mod continent;
pub mod coordinate;
pub mod geocode;
pub mod input;
pub mod locations;
pub mod map;
pub mod path;
pub mod render;
pub mod report;
pub mod spherical;
pub mod web;

pub use antimeridian::{PathStrategy, crosses_dateline};
pub use arc::{ArcError, MIN_ARC_POINTS, interpolate_arc};
pub use config::{
    CollabMapConfig, ConfigError, GeocoderConfig, MapConfig, OutputConfig, load_config,
    load_config_file, parse_config,
};
pub use continent::{Continent, Palette, continent_for_country};
pub use coordinate::{Coordinate, CoordinateError, longitude_delta, normalize_longitude};
pub use geocode::{
    CachedGeocoder, FixedGeocoder, GeocodeError, Geocoder, NominatimGeocoder, OfflineGeocoder,
    RateLimiter,
};
pub use input::{CollaboratorRecord, InputError, load_records, parse_records};
pub use locations::{
    InstitutionId, LocatedInstitution, LocationTable, SkipReason, SkippedInstitution,
    resolve_locations,
};
pub use map::{CollaborationMap, CollaboratorEntry, HomeMarker, MapError, build_map};
pub use path::{
    CollaboratorEdge, DEFAULT_ARC_RESOLUTION, EdgeError, EdgePath, PathBuilder, RenderPath,
    RenderStyle, build_path,
};
pub use render::{OutputFormat, render, to_geojson, write_geojson, write_html};
pub use report::{MapSummary, generate_summary};
pub use spherical::{angular_separation, great_circle_distance_km};
