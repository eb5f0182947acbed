//! Geographic coordinate value type
//!
//! A [`Coordinate`] is a latitude/longitude pair in degrees. Longitude is
//! normalized to `(-180, 180]` on construction, so every coordinate held by
//! the crate is already in canonical form.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing a coordinate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("Coordinate values must be finite (lat={lat}, lon={lon})")]
    NonFinite { lat: f64, lon: f64 },

    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
}

/// Normalize a longitude in degrees to `(-180, 180]`
///
/// Uses the `((lon + 540) mod 360) - 180` wrap, then folds the `-180`
/// boundary onto `180` so the interval is closed on the eastern side.
/// In-range values are returned unchanged.
pub fn normalize_longitude(lon: f64) -> f64 {
    if lon > -180.0 && lon <= 180.0 {
        return lon;
    }
    let wrapped = (lon + 540.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { 180.0 } else { wrapped }
}

/// Smallest absolute difference between two longitudes, in degrees `[0, 180]`
pub fn longitude_delta(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    if d > 180.0 { 360.0 - d } else { d }
}

/// A point on the globe in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Create a validated coordinate, normalizing the longitude
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoordinateError::NonFinite { lat, lon });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        Ok(Self {
            lat,
            lon: normalize_longitude(lon),
        })
    }

    /// Checked constructor for coordinate literals, usable in `const` items.
    ///
    /// Unlike [`Coordinate::new`] the longitude must already be in
    /// `(-180, 180]`. Out-of-range input panics, which fails the build when
    /// evaluated in a const context.
    pub const fn from_degrees(lat: f64, lon: f64) -> Self {
        assert!(lat >= -90.0 && lat <= 90.0, "latitude out of range");
        assert!(lon > -180.0 && lon <= 180.0, "longitude out of range");
        Self { lat, lon }
    }

    /// Build a coordinate from values produced by spherical math.
    ///
    /// Latitude from `atan2` is already bounded, so only the longitude is
    /// normalized. Non-finite values pass through untouched; they only arise
    /// from exactly antipodal interpolation, which is left undefined.
    pub(crate) fn from_computed(lat: f64, lon: f64) -> Self {
        let lon = if lon.is_finite() {
            normalize_longitude(lon)
        } else {
            lon
        };
        Self { lat, lon }
    }

    /// Latitude in degrees, `[-90, 90]`
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees, `(-180, 180]`
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude in radians
    pub fn lat_rad(&self) -> f64 {
        self.lat.to_radians()
    }

    /// Longitude in radians
    pub fn lon_rad(&self) -> f64 {
        self.lon.to_radians()
    }

    /// Check whether two coordinates are the same place within `tolerance` degrees.
    ///
    /// Longitude is compared around the circle, so `180` and `-179.9999999`
    /// are close. At the poles longitude is meaningless and is ignored.
    pub fn approx_eq(&self, other: &Coordinate, tolerance: f64) -> bool {
        if (self.lat - other.lat).abs() > tolerance {
            return false;
        }
        if 90.0 - self.lat.abs() <= tolerance {
            return true;
        }
        longitude_delta(self.lon, other.lon) <= tolerance
    }

    /// `[lon, lat]` pair in GeoJSON axis order
    pub fn to_lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// `[lat, lon]` pair in Leaflet axis order
    pub fn to_lat_lon(&self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}

/// Parse `"LAT,LON"` (as used by `--home`)
impl std::str::FromStr for Coordinate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LON but got '{}'", s))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|e| format!("invalid latitude '{}': {}", lat.trim(), e))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|e| format!("invalid longitude '{}': {}", lon.trim(), e))?;
        Coordinate::new(lat, lon).map_err(|e| e.to_string())
    }
}

/// Serde shape of a coordinate: `{ "lat": .., "lon": .. }`
#[derive(Serialize, Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lon)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(c: Coordinate) -> Self {
        RawCoordinate {
            lat: c.lat,
            lon: c.lon,
        }
    }
}
