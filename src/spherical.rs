//! Spherical math on the unit sphere
//!
//! Haversine angular separation plus the unit-vector conversions used by
//! arc interpolation.

use crate::coordinate::Coordinate;

/// Mean Earth radius in kilometres (IUGG)
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Angular separation between two coordinates in radians, `[0, π]`
///
/// Haversine formula:
/// `Δ = 2·asin(sqrt(sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlon/2)))`
pub fn angular_separation(a: &Coordinate, b: &Coordinate) -> f64 {
    let (lat1, lon1) = (a.lat_rad(), a.lon_rad());
    let (lat2, lon2) = (b.lat_rad(), b.lon_rad());

    let h = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);

    // Rounding can push h a hair above 1 for near-antipodal points
    2.0 * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Great-circle distance in kilometres
pub fn great_circle_distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    angular_separation(a, b) * EARTH_RADIUS_KM
}

/// Unit vector `[x, y, z]` for a coordinate
pub fn to_unit_vector(c: &Coordinate) -> [f64; 3] {
    let (lat, lon) = (c.lat_rad(), c.lon_rad());
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

/// Coordinate for a (not necessarily unit) vector
pub fn from_vector(v: [f64; 3]) -> Coordinate {
    let [x, y, z] = v;
    let lat = z.atan2((x * x + y * y).sqrt());
    let lon = y.atan2(x);
    Coordinate::from_computed(lat.to_degrees(), lon.to_degrees())
}
