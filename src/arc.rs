//! Great-circle arc interpolation
//!
//! Spherical linear interpolation (slerp) between two coordinates on the unit
//! sphere. Because the angular separation comes from the haversine formula it
//! is always the minimal one, so the emitted points lie on the minor arc.

use thiserror::Error;

use crate::coordinate::Coordinate;
use crate::path::RenderPath;
use crate::spherical::{angular_separation, from_vector, to_unit_vector};

/// Smallest number of points an arc can be sampled with
pub const MIN_ARC_POINTS: usize = 2;

/// Errors that can occur during arc interpolation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArcError {
    #[error("Invalid argument: an arc needs at least 2 points, got {0}")]
    InvalidArgument(usize),
}

/// Interpolate `num_points` coordinates along the minor great-circle arc
///
/// The first point is `origin` and the last is `destination`, with evenly
/// spaced angular fractions in between. Coincident endpoints produce
/// `num_points` copies of `origin`.
///
/// Exactly antipodal endpoints have no unique great circle; the result for
/// them is numerically unstable and not otherwise handled.
pub fn interpolate_arc(
    origin: &Coordinate,
    destination: &Coordinate,
    num_points: usize,
) -> Result<RenderPath, ArcError> {
    if num_points < MIN_ARC_POINTS {
        return Err(ArcError::InvalidArgument(num_points));
    }

    let delta = angular_separation(origin, destination);
    if delta == 0.0 {
        return Ok(RenderPath::from_points(vec![*origin; num_points]));
    }

    let [x1, y1, z1] = to_unit_vector(origin);
    let [x2, y2, z2] = to_unit_vector(destination);
    let sin_delta = delta.sin();
    let last = (num_points - 1) as f64;

    let points = (0..num_points)
        .map(|i| {
            let t = i as f64 / last;
            let a = ((1.0 - t) * delta).sin() / sin_delta;
            let b = (t * delta).sin() / sin_delta;
            from_vector([a * x1 + b * x2, a * y1 + b * y2, a * z1 + b * z2])
        })
        .collect();

    Ok(RenderPath::from_points(points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::longitude_delta;

    const TOLERANCE: f64 = 1e-6;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_rejects_fewer_than_two_points() {
        let a = c(0.0, 0.0);
        let b = c(10.0, 10.0);
        assert_eq!(interpolate_arc(&a, &b, 0), Err(ArcError::InvalidArgument(0)));
        assert_eq!(interpolate_arc(&a, &b, 1), Err(ArcError::InvalidArgument(1)));
        assert!(interpolate_arc(&a, &b, 2).is_ok());
    }

    #[test]
    fn test_home_to_london() {
        let home = c(-27.4975, 153.0137);
        let london = c(51.5074, -0.1278);

        let path = interpolate_arc(&home, &london, 50).unwrap();
        assert_eq!(path.len(), 50);
        assert!(path.first().approx_eq(&home, TOLERANCE));
        assert!(path.last().approx_eq(&london, TOLERANCE));
        assert!(!path.has_dateline_tear());
    }

    #[test]
    fn test_two_points_are_the_endpoints() {
        let a = c(35.6762, 139.6503);
        let b = c(40.7128, -74.0060);
        let path = interpolate_arc(&a, &b, 2).unwrap();
        assert_eq!(path.len(), 2);
        assert!(path.first().approx_eq(&a, TOLERANCE));
        assert!(path.last().approx_eq(&b, TOLERANCE));
    }

    #[test]
    fn test_coincident_points_collapse() {
        let p = c(12.5, -45.25);
        let path = interpolate_arc(&p, &p, 7).unwrap();
        assert_eq!(path.len(), 7);
        assert!(path.points().iter().all(|q| *q == p));
    }

    #[test]
    fn test_equator_midpoint() {
        let path = interpolate_arc(&c(0.0, 0.0), &c(0.0, 90.0), 3).unwrap();
        let mid = path.points()[1];
        assert!(mid.lat().abs() < 1e-9);
        assert!((mid.lon() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_meridian_arc_is_monotonic_in_latitude() {
        let path = interpolate_arc(&c(-40.0, 20.0), &c(60.0, 20.0), 11).unwrap();
        let lats: Vec<f64> = path.points().iter().map(|p| p.lat()).collect();
        assert!(lats.windows(2).all(|w| w[1] > w[0]));
        assert!(path.points().iter().all(|p| (p.lon() - 20.0).abs() < 1e-9));
    }

    #[test]
    fn test_arc_bulges_poleward() {
        // Great circles between mid-latitude points curve toward the pole
        let path = interpolate_arc(&c(40.0, -100.0), &c(40.0, 20.0), 21).unwrap();
        let mid = path.points()[10];
        assert!(mid.lat() > 40.0);
    }

    #[test]
    fn test_crossing_arc_normalizes_longitudes() {
        let path = interpolate_arc(&c(0.0, 170.0), &c(0.0, -170.0), 5).unwrap();
        for p in path.points() {
            assert!(p.lon() > -180.0 && p.lon() <= 180.0);
        }
        assert!(longitude_delta(path.points()[2].lon(), 180.0) < 1e-9);
        // Consecutive points are close on the sphere even though raw
        // longitudes jump from positive to negative.
        for w in path.points().windows(2) {
            assert!(longitude_delta(w[0].lon(), w[1].lon()) < 6.0);
        }
    }

    #[test]
    fn test_idempotent() {
        let a = c(-27.4975, 153.0137);
        let b = c(1.3521, 103.8198);
        assert_eq!(
            interpolate_arc(&a, &b, 50).unwrap(),
            interpolate_arc(&a, &b, 50).unwrap()
        );
    }
}
