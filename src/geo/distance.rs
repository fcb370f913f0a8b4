//! Great-circle distance on a spherical earth

use super::GeoPoint;

/// Equatorial earth radius in meters (WGS84 semi-major axis)
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// Haversine distance between two points, in meters.
///
/// Symmetric and zero for identical points. Inputs are expected to be
/// validated by the caller.
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);

    // Rounding can push h slightly above 1 for antipodal points
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Point reached by travelling `meters` from `origin` along the initial
/// `bearing_degrees` (clockwise from north) on the same sphere.
pub fn destination(origin: GeoPoint, bearing_degrees: f64, meters: f64) -> GeoPoint {
    let angular = meters / EARTH_RADIUS_METERS;
    let bearing = bearing_degrees.to_radians();
    let lat1 = origin.latitude.to_radians();
    let lng1 = origin.longitude.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lng2 = lng1
        + (bearing.sin() * angular.sin() * lat1.cos()).atan2(angular.cos() - lat1.sin() * lat2.sin());

    GeoPoint::new(lat2.to_degrees(), lng2.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASHKENT: GeoPoint = GeoPoint { latitude: 41.2995, longitude: 69.2401 };

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(distance(TASHKENT, TASHKENT), 0.0);
        let pole = GeoPoint::new(90.0, 0.0);
        assert_eq!(distance(pole, pole), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (TASHKENT, GeoPoint::new(41.3111, 69.2797)),
            (GeoPoint::new(-33.8688, 151.2093), GeoPoint::new(51.5074, -0.1278)),
            (GeoPoint::new(0.0, 179.9), GeoPoint::new(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert!((distance(a, b) - distance(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_known_distance() {
        // One degree of latitude on this sphere
        let d = distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((d - 111_319.49).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_longitude_scale_depends_on_latitude() {
        let equator = distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.001));
        let north = distance(GeoPoint::new(60.0, 0.0), GeoPoint::new(60.0, 0.001));
        assert!((north / equator - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_destination_round_trip() {
        for bearing in [0.0, 45.0, 90.0, 200.0] {
            let target = destination(TASHKENT, bearing, 500.0);
            assert!((distance(TASHKENT, target) - 500.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_antipodal_is_finite() {
        let d = distance(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_METERS).abs() < 1.0);
    }
}
