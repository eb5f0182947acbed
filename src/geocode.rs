//! Geocoding clients
//!
//! Institutions are resolved to coordinates through the [`Geocoder`] trait.
//! Clients are plain values constructed by the caller and passed by `&mut`
//! to whatever needs lookups; there is no process-wide client or limiter.
//!
//! - [`NominatimGeocoder`]: OpenStreetMap Nominatim over HTTP, rate limited
//! - [`FixedGeocoder`]: answers from an in-memory table
//! - [`OfflineGeocoder`]: refuses every lookup
//! - [`CachedGeocoder`]: JSON file cache in front of any other geocoder

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ConfigError, GeocoderConfig};
use crate::coordinate::Coordinate;

/// Errors that can occur during a lookup
#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("Geocoding service returned HTTP {0}")]
    Status(u16),

    #[error("Invalid response from geocoding service: {0}")]
    InvalidResponse(String),

    #[error("Geocoding disabled (offline mode)")]
    Offline,

    #[error("Failed to access geocode cache: {0}")]
    CacheIo(#[from] std::io::Error),

    #[error("Failed to parse geocode cache: {0}")]
    CacheFormat(#[from] serde_json::Error),
}

impl GeocodeError {
    /// Whether retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            GeocodeError::Transport(_) => true,
            GeocodeError::Status(code) => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

/// Resolves a free-text query to a coordinate
///
/// `Ok(None)` means the service answered but found nothing.
pub trait Geocoder {
    fn geocode(&mut self, query: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

impl<G: Geocoder + ?Sized> Geocoder for &mut G {
    fn geocode(&mut self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        (**self).geocode(query)
    }
}

/// Canonical form of a query used as a lookup key
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ============================================================================
// Rate limiting
// ============================================================================

/// Enforces a minimum delay between consecutive calls
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_delay: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_call: None,
        }
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// How long a call made at `now` would have to wait
    pub fn delay_at(&self, now: Instant) -> Duration {
        match self.last_call {
            Some(last) => self.min_delay.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Block until the next call is allowed, then record it
    pub fn wait(&mut self) {
        let delay = self.delay_at(Instant::now());
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        self.last_call = Some(Instant::now());
    }
}

// ============================================================================
// Nominatim
// ============================================================================

#[derive(Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// OpenStreetMap Nominatim search client
pub struct NominatimGeocoder {
    agent: ureq::Agent,
    endpoint: String,
    limiter: RateLimiter,
    max_retries: u32,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, ConfigError> {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout()?)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self {
            agent,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            limiter: RateLimiter::new(config.min_delay()?),
            max_retries: config.max_retries,
        })
    }

    fn search_once(&mut self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        self.limiter.wait();

        let url = format!("{}/search", self.endpoint);
        let response = self
            .agent
            .get(&url)
            .query("q", query)
            .query("format", "json")
            .query("limit", "1")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => GeocodeError::Status(code),
                ureq::Error::Transport(t) => GeocodeError::Transport(t.to_string()),
            })?;

        let places: Vec<NominatimPlace> = response
            .into_json()
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let lat: f64 = place
            .lat
            .parse()
            .map_err(|_| GeocodeError::InvalidResponse(format!("bad latitude '{}'", place.lat)))?;
        let lon: f64 = place
            .lon
            .parse()
            .map_err(|_| GeocodeError::InvalidResponse(format!("bad longitude '{}'", place.lon)))?;

        Coordinate::new(lat, lon)
            .map(Some)
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&mut self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let mut attempt = 0;
        loop {
            match self.search_once(query) {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(query, attempt, error = %e, "geocoding failed, retrying");
                }
                result => return result,
            }
        }
    }
}

// ============================================================================
// Fixed and offline geocoders
// ============================================================================

/// Geocoder backed by an in-memory table of query -> coordinate
#[derive(Debug, Clone, Default)]
pub struct FixedGeocoder {
    entries: HashMap<String, Coordinate>,
    lookups: usize,
}

impl FixedGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, query: &str, coordinate: Coordinate) {
        self.entries.insert(normalize_query(query), coordinate);
    }

    pub fn with(mut self, query: &str, coordinate: Coordinate) -> Self {
        self.insert(query, coordinate);
        self
    }

    /// Number of lookups served so far
    pub fn lookups(&self) -> usize {
        self.lookups
    }
}

impl Geocoder for FixedGeocoder {
    fn geocode(&mut self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        self.lookups += 1;
        Ok(self.entries.get(&normalize_query(query)).copied())
    }
}

/// Geocoder for runs without network access
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGeocoder;

impl Geocoder for OfflineGeocoder {
    fn geocode(&mut self, _query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        Err(GeocodeError::Offline)
    }
}

// ============================================================================
// File cache
// ============================================================================

/// JSON file cache in front of another geocoder
///
/// Both hits and "not found" answers are cached. Errors are not, so a
/// transient failure is retried on the next run. Call [`CachedGeocoder::save`]
/// to persist new entries.
pub struct CachedGeocoder<G> {
    inner: G,
    path: PathBuf,
    entries: BTreeMap<String, Option<Coordinate>>,
    dirty: bool,
}

impl<G: Geocoder> CachedGeocoder<G> {
    /// Open the cache at `path`, starting empty if the file does not exist
    pub fn open(path: &Path, inner: G) -> Result<Self, GeocodeError> {
        let entries = if path.exists() {
            let content = fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), entries = entries.len(), "opened geocode cache");

        Ok(Self {
            inner,
            path: path.to_path_buf(),
            entries,
            dirty: false,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the cache back to disk if anything changed
    pub fn save(&mut self) -> Result<(), GeocodeError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)?;
        self.dirty = false;
        Ok(())
    }

    pub fn into_inner(self) -> G {
        self.inner
    }
}

impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    fn geocode(&mut self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let key = normalize_query(query);
        if let Some(cached) = self.entries.get(&key) {
            debug!(query, "geocode cache hit");
            return Ok(*cached);
        }

        let result = self.inner.geocode(query)?;
        self.entries.insert(key, result);
        self.dirty = true;
        Ok(result)
    }
}
