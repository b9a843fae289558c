// Geodesy module - great-circle distance and bearing on a spherical Earth
//
// All public functions take latitude/longitude in degrees. Distances are
// derived from the haversine central angle, which stays accurate for the
// short (sub-kilometre) separations found between neighbouring sites.

use std::f64::consts::PI;

/// Degrees to radians conversion factor
const DTOR: f64 = PI / 180.0;

/// Radians to degrees conversion factor
const RTOD: f64 = 180.0 / PI;

/// Mean Earth radius in kilometres
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0;

/// Returns the great-circle central angle in radians between two points
///
/// Haversine formulation: `2·asin(√(sin²(Δφ/2) + cos φ1·cos φ2·sin²(Δλ/2)))`.
/// Co-located points give exactly 0.
pub fn central_angle(lat0: f64, lon0: f64, lat1: f64, lon1: f64) -> f64 {
    let lat0_rad = lat0 * DTOR;
    let lat1_rad = lat1 * DTOR;
    let dlat = (lat1 - lat0) * DTOR;
    let dlon = (lon1 - lon0) * DTOR;

    let h = (dlat / 2.0).sin().powi(2)
        + lat0_rad.cos() * lat1_rad.cos() * (dlon / 2.0).sin().powi(2);

    // rounding can push h a hair above 1 for antipodal points
    2.0 * h.sqrt().min(1.0).asin()
}

/// Returns great-circle distance in kilometres on a sphere of the given radius
///
/// # Example
/// ```
/// use sector_tilt::geodesy::{haversine_km, EARTH_MEAN_RADIUS_KM};
/// let d = haversine_km(51.5074, -0.1278, 48.8566, 2.3522, EARTH_MEAN_RADIUS_KM);
/// assert!((d - 343.556).abs() < 0.01); // London to Paris
/// ```
pub fn haversine_km(lat0: f64, lon0: f64, lat1: f64, lon1: f64, radius_km: f64) -> f64 {
    central_angle(lat0, lon0, lat1, lon1) * radius_km
}

/// Returns the initial bearing (forward azimuth) from point 0 to point 1
///
/// Degrees clockwise from true north, normalised to `[0, 360)`.
pub fn initial_bearing(lat0: f64, lon0: f64, lat1: f64, lon1: f64) -> f64 {
    let phi0 = lat0 * DTOR;
    let phi1 = lat1 * DTOR;
    let dlon = (lon1 - lon0) * DTOR;

    let x = dlon.sin() * phi1.cos();
    let y = phi0.cos() * phi1.sin() - phi0.sin() * phi1.cos() * dlon.cos();

    (x.atan2(y) * RTOD + 360.0) % 360.0
}

/// Smallest angle between two compass directions, in degrees
///
/// `min(|a − b|, 360 − |a − b|)`; inputs are expected in `[0, 360]`.
#[inline]
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs();
    diff.min(360.0 - diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_haversine_london_paris() {
        let dist = haversine_km(51.5074, -0.1278, 48.8566, 2.3522, EARTH_MEAN_RADIUS_KM);
        assert!((dist - 343.556_060_341).abs() < 1e-6, "Distance: {} km", dist);
    }

    #[test]
    fn test_haversine_one_degree_on_equator() {
        let dist = haversine_km(0.0, 0.0, 0.0, 1.0, EARTH_MEAN_RADIUS_KM);
        assert!((dist - 111.194_926_644_558_73).abs() < 1e-6);
    }

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(central_angle(38.130399, -77.513747, 38.130399, -77.513747), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = central_angle(38.130399, -77.513747, 38.194806, -77.501444);
        let b = central_angle(38.194806, -77.501444, 38.130399, -77.513747);
        assert!((a - b).abs() < EPSILON);
    }

    #[test]
    fn test_antipodal_points() {
        let angle = central_angle(0.0, 0.0, 0.0, 180.0);
        assert!((angle - PI).abs() < EPSILON);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        assert!((initial_bearing(0.0, 0.0, 1.0, 0.0) - 0.0).abs() < EPSILON);
        assert!((initial_bearing(0.0, 0.0, 0.0, 1.0) - 90.0).abs() < EPSILON);
        assert!((initial_bearing(0.0, 0.0, -1.0, 0.0) - 180.0).abs() < EPSILON);
        assert!((initial_bearing(0.0, 0.0, 0.0, -1.0) - 270.0).abs() < EPSILON);
    }

    #[test]
    fn test_bearing_london_paris() {
        let b = initial_bearing(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((b - 148.115_616_871).abs() < 1e-6, "Bearing: {}", b);
    }

    #[test]
    fn test_bearing_is_not_reciprocal_on_sphere() {
        let there = initial_bearing(38.130399, -77.513747, 38.194806, -77.501444);
        let back = initial_bearing(38.194806, -77.501444, 38.130399, -77.513747);
        assert!((there - 8.537_675_798).abs() < 1e-6);
        assert!((back - 188.545_277_766).abs() < 1e-6);
    }

    #[test]
    fn test_angular_difference_wraps() {
        assert_eq!(angular_difference(350.0, 10.0), 20.0);
        assert_eq!(angular_difference(10.0, 350.0), 20.0);
        assert_eq!(angular_difference(0.0, 180.0), 180.0);
        assert_eq!(angular_difference(120.0, 60.0), 60.0);
        assert_eq!(angular_difference(0.0, 360.0), 0.0);
    }
}
