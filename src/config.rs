//! Configuration file support for collab-map
//!
//! This module handles parsing `.collab-map.toml` configuration files that
//! set the home location, arc sampling, geocoder behaviour and colours.
//!
//! ## Configuration File Format
//!
//! ```toml
//! # .collab-map.toml
//!
//! [map]
//! # Home institution: every edge starts here
//! home = { lat = -27.4975, lon = 153.0137 }
//! home_label = "You"
//!
//! # Points sampled along each great-circle arc
//! arc_resolution = 50
//! zoom_start = 2
//!
//! [geocoder]
//! endpoint = "https://nominatim.openstreetmap.org"
//! user_agent = "scival-map"
//!
//! # Minimum delay between requests (seconds)
//! min_delay_secs = 1.0
//! max_retries = 2
//! timeout_secs = 10.0
//!
//! [colors]
//! # Override marker colours per continent
//! europe = "#1f77b4"
//! other = "gray"
//!
//! [output]
//! path = "scival_collaboration_map.html"
//! format = "html"
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::arc::MIN_ARC_POINTS;
use crate::coordinate::Coordinate;
use crate::path::DEFAULT_ARC_RESOLUTION;
use crate::render::OutputFormat;

/// Config file names searched for, in order, in each directory
pub const CONFIG_FILE_NAMES: [&str; 2] = [".collab-map.toml", "collab-map.toml"];

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Map section
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    /// Home location, the origin of every edge
    #[serde(default = "default_home")]
    pub home: Coordinate,

    /// Popup label of the home marker
    #[serde(default = "default_home_label")]
    pub home_label: String,

    /// Number of points sampled along each great-circle arc
    #[serde(default = "default_arc_resolution")]
    pub arc_resolution: usize,

    /// Initial zoom level of the rendered map
    #[serde(default = "default_zoom_start")]
    pub zoom_start: u8,

    /// Tile layer URL template
    #[serde(default = "default_tile_url")]
    pub tile_url: String,

    /// Tile layer attribution
    #[serde(default = "default_attribution")]
    pub attribution: String,
}

/// University of Queensland, St Lucia
pub const DEFAULT_HOME: Coordinate = Coordinate::from_degrees(-27.4975, 153.0137);

pub fn default_home() -> Coordinate {
    DEFAULT_HOME
}

fn default_home_label() -> String {
    "You".to_string()
}

fn default_arc_resolution() -> usize {
    DEFAULT_ARC_RESOLUTION
}

fn default_zoom_start() -> u8 {
    2
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_attribution() -> String {
    "&copy; OpenStreetMap contributors".to_string()
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            home: default_home(),
            home_label: default_home_label(),
            arc_resolution: default_arc_resolution(),
            zoom_start: default_zoom_start(),
            tile_url: default_tile_url(),
            attribution: default_attribution(),
        }
    }
}

/// Geocoder section
#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderConfig {
    /// Nominatim-compatible service root
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// User-Agent sent with every request (required by Nominatim's usage policy)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Minimum delay between requests in seconds
    #[serde(default = "default_min_delay_secs")]
    pub min_delay_secs: f64,

    /// Retries after a transient failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
}

fn default_endpoint() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    "scival-map".to_string()
}

fn default_min_delay_secs() -> f64 {
    1.0
}

fn default_max_retries() -> u32 {
    2
}

fn default_timeout_secs() -> f64 {
    10.0
}

impl GeocoderConfig {
    /// Minimum delay between requests
    pub fn min_delay(&self) -> Result<Duration, ConfigError> {
        seconds("geocoder.min_delay_secs", self.min_delay_secs)
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        seconds("geocoder.timeout_secs", self.timeout_secs)
    }
}

fn seconds(field: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        ConfigError::Invalid(format!(
            "{} must be a non-negative number of seconds, got {}",
            field, value
        ))
    })
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            user_agent: default_user_agent(),
            min_delay_secs: default_min_delay_secs(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Output section
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputConfig {
    /// Output file path
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Output format
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CollabMapConfig {
    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub geocoder: GeocoderConfig,

    /// Continent key -> colour overrides
    #[serde(default)]
    pub colors: HashMap<String, String>,

    #[serde(default)]
    pub output: OutputConfig,
}

impl CollabMapConfig {
    /// Check values that would otherwise fail later in the pipeline
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map.arc_resolution < MIN_ARC_POINTS {
            return Err(ConfigError::Invalid(format!(
                "map.arc_resolution must be at least {}, got {}",
                MIN_ARC_POINTS, self.map.arc_resolution
            )));
        }
        let g = &self.geocoder;
        g.min_delay()?;
        if g.timeout()?.is_zero() {
            return Err(ConfigError::Invalid(format!(
                "geocoder.timeout_secs must be > 0, got {}",
                g.timeout_secs
            )));
        }
        if g.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "geocoder.user_agent must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<CollabMapConfig, ConfigError> {
    let config: CollabMapConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration for an input located at `start_path`
///
/// Searches for `.collab-map.toml` in the given directory and its parents,
/// then in the user config directory. Returns the config and the file it
/// came from, or defaults if none exists.
pub fn load_config(start_path: &Path) -> Result<(CollabMapConfig, Option<PathBuf>), ConfigError> {
    match find_config_file(start_path) {
        Some(path) => {
            let config = load_config_file(&path)?;
            Ok((config, Some(path)))
        }
        None => Ok((CollabMapConfig::default(), None)),
    }
}

/// Load configuration from an explicit file
pub fn load_config_file(path: &Path) -> Result<CollabMapConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Per-user config file location
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("collab-map").join("config.toml"))
}

/// Find the config file by searching up the directory tree
fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let start_path = start_path
        .canonicalize()
        .unwrap_or_else(|_| start_path.to_path_buf());
    let mut current = if start_path.is_file() {
        start_path.parent().map(Path::to_path_buf)
    } else {
        Some(start_path.to_path_buf())
    };

    while let Some(dir) = current {
        for name in &CONFIG_FILE_NAMES {
            let config_path = dir.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }
        current = dir.parent().map(Path::to_path_buf);
    }

    user_config_path().filter(|p| p.is_file())
}
