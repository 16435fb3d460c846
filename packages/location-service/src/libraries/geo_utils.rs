use geo::{HaversineDistance, Point};
use serde_json::Value;

use crate::models::{BoundingBox, Coordinate, GeoError, NormalizedCoordinate};

/// Mean earth radius in kilometers (spherical model)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Decimal places kept by [`normalize_coordinates`] (~0.11m at the equator)
pub const COORDINATE_PRECISION: i32 = 6;

/// Leniently parse one coordinate component.
///
/// Accepts JSON numbers and numeric-looking strings (surrounding whitespace is
/// ignored). Returns `None` for anything else, including NaN and infinities.
pub fn parse_coordinate_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => parse_numeric_str(text),
        _ => None,
    }
}

/// Parse a numeric string, rejecting empty input and non-finite results
pub fn parse_numeric_str(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Check if a numeric coordinate pair is finite and in range
pub fn is_valid_coordinate(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}

/// Check if loosely typed request values form a valid coordinate
pub fn validate_coordinates(lat: &Value, lng: &Value) -> bool {
    match (parse_coordinate_value(lat), parse_coordinate_value(lng)) {
        (Some(lat), Some(lng)) => is_valid_coordinate(lat, lng),
        _ => false,
    }
}

/// Round a value to `places` decimals, half away from zero
pub fn round_to_precision(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Validate and round a coordinate pair to [`COORDINATE_PRECISION`] decimals.
///
/// Rounding is half away from zero (`f64::round`). Applying this to its own
/// output returns the same value.
pub fn normalize_coordinates(lat: f64, lng: f64) -> Result<NormalizedCoordinate, GeoError> {
    if !is_valid_coordinate(lat, lng) {
        return Err(GeoError::InvalidCoordinate {
            latitude: lat,
            longitude: lng,
        });
    }

    Ok(NormalizedCoordinate::from_rounded(
        round_to_precision(lat, COORDINATE_PRECISION),
        round_to_precision(lng, COORDINATE_PRECISION),
    ))
}

/// Wrap a longitude into [-180, 180]
pub fn wrap_longitude(lng: f64) -> f64 {
    if (-180.0..=180.0).contains(&lng) {
        lng
    } else {
        (lng + 180.0).rem_euclid(360.0) - 180.0
    }
}

/// Derive the bounding box of a circle of `radius_km` around `center`.
///
/// Longitude deltas are scaled by 1/cos(latitude). Edge cases:
/// - a box that reaches either pole is clamped to ±90 latitude and spans
///   every longitude, so no bound is ever NaN or infinite
/// - a box that crosses ±180 keeps wrapped longitudes, leaving `west > east`
pub fn get_bounding_box(center: &Coordinate, radius_km: f64) -> Result<BoundingBox, GeoError> {
    if !center.is_valid() {
        return Err(GeoError::InvalidCoordinate {
            latitude: center.latitude,
            longitude: center.longitude,
        });
    }

    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(GeoError::InvalidRadius(radius_km));
    }

    let delta_lat = (radius_km / EARTH_RADIUS_KM).to_degrees();
    let north = center.latitude + delta_lat;
    let south = center.latitude - delta_lat;

    let cos_lat = center.latitude.to_radians().cos();
    let reaches_pole = north >= 90.0 || south <= -90.0 || cos_lat <= f64::EPSILON;

    let delta_lng = if reaches_pole {
        f64::INFINITY
    } else {
        delta_lat / cos_lat
    };

    if delta_lng >= 180.0 {
        return Ok(BoundingBox {
            north: north.min(90.0),
            south: south.max(-90.0),
            east: 180.0,
            west: -180.0,
        });
    }

    Ok(BoundingBox {
        north,
        south,
        east: wrap_longitude(center.longitude + delta_lng),
        west: wrap_longitude(center.longitude - delta_lng),
    })
}

/// Calculate initial great-circle bearing from one point to another in degrees [0, 360)
pub fn calculate_bearing(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

    let bearing = y.atan2(x).to_degrees();

    // Normalize to 0-360 degrees
    (bearing + 360.0) % 360.0
}

/// Calculate distance between two points in kilometers using Haversine formula
pub fn haversine_distance_km(from: &Coordinate, to: &Coordinate) -> f64 {
    let p1 = Point::new(from.longitude, from.latitude);
    let p2 = Point::new(to.longitude, to.latitude);

    meters_to_km(p1.haversine_distance(&p2))
}

pub fn meters_to_km(meters: f64) -> f64 {
    meters / 1000.0
}

pub fn km_to_meters(km: f64) -> f64 {
    km * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    const NYC: Coordinate = Coordinate {
        latitude: 40.7128,
        longitude: -74.0060,
    };

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(&json!(45.0), &json!(-120.0)));
        assert!(validate_coordinates(&json!(-90), &json!(180)));
        assert!(validate_coordinates(&json!(90.0), &json!(-180.0)));

        assert!(!validate_coordinates(&json!(91.0), &json!(0.0)));
        assert!(!validate_coordinates(&json!(0.0), &json!(181.0)));
        assert!(!validate_coordinates(&json!(-91.0), &json!(0.0)));
        assert!(!validate_coordinates(&json!(0.0), &json!(-181.0)));
    }

    #[test]
    fn test_validate_coordinates_lenient_strings() {
        assert!(validate_coordinates(&json!("40.7128"), &json!(" -74.0060 ")));
        assert!(validate_coordinates(&json!("0"), &json!(0)));

        assert!(!validate_coordinates(&json!("abc"), &json!("-74.0")));
        assert!(!validate_coordinates(&json!(""), &json!("-74.0")));
        assert!(!validate_coordinates(&json!("NaN"), &json!("0")));
        assert!(!validate_coordinates(&json!("inf"), &json!("0")));
        assert!(!validate_coordinates(&json!("40.7"), &json!("-Infinity")));
    }

    #[test]
    fn test_validate_coordinates_non_numeric_values() {
        assert!(!validate_coordinates(&Value::Null, &json!(0.0)));
        assert!(!validate_coordinates(&json!(true), &json!(0.0)));
        assert!(!validate_coordinates(&json!([40.7]), &json!(0.0)));
        assert!(!validate_coordinates(&json!({"lat": 1}), &json!(0.0)));
    }

    #[test]
    fn test_is_valid_coordinate_rejects_non_finite() {
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
        assert!(!is_valid_coordinate(0.0, f64::INFINITY));
        assert!(!is_valid_coordinate(f64::NEG_INFINITY, 0.0));
    }

    #[test]
    fn test_normalize_coordinates() {
        let normalized = normalize_coordinates(40.712812345678901, -74.006012345678901).unwrap();
        assert_eq!(normalized.latitude(), 40.712812);
        assert_eq!(normalized.longitude(), -74.006012);
    }

    #[test]
    fn test_normalize_rounds_half_away_from_zero() {
        assert_eq!(round_to_precision(0.5, 0), 1.0);
        assert_eq!(round_to_precision(-0.5, 0), -1.0);
        assert_eq!(round_to_precision(2.5, 0), 3.0);
    }

    #[test]
    fn test_normalize_is_fixed_point() {
        let once = normalize_coordinates(40.712812345678901, -74.006012345678901).unwrap();
        let twice = normalize_coordinates(once.latitude(), once.longitude()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_rejects_invalid() {
        assert!(matches!(
            normalize_coordinates(91.0, 0.0),
            Err(GeoError::InvalidCoordinate { .. })
        ));
        assert!(normalize_coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_bounding_box_city_scale() {
        let bbox = get_bounding_box(&NYC, 5.0).unwrap();
        let delta_lat = bbox.north - NYC.latitude;

        assert!((delta_lat - 0.045).abs() < 0.001);
        assert!((NYC.latitude - bbox.south - delta_lat).abs() < 1e-9);

        let delta_lng = bbox.east - NYC.longitude;
        assert!(delta_lng > delta_lat);
        assert!((delta_lng - delta_lat / NYC.latitude.to_radians().cos()).abs() < 1e-9);

        assert!(bbox.south < NYC.latitude && NYC.latitude < bbox.north);
        assert!(bbox.west < NYC.longitude && NYC.longitude < bbox.east);
        assert!(!bbox.crosses_antimeridian());
    }

    #[test]
    fn test_bounding_box_equator_is_square() {
        let bbox = get_bounding_box(&Coordinate::new(0.0, 0.0), 10.0).unwrap();
        assert!(((bbox.north - bbox.south) - (bbox.east - bbox.west)).abs() < 1e-9);
    }

    #[test]
    fn test_bounding_box_near_pole_is_finite() {
        let center = Coordinate::new(89.9, 10.0);
        let bbox = get_bounding_box(&center, 5.0).unwrap();

        for bound in [bbox.north, bbox.south, bbox.east, bbox.west] {
            assert!(bound.is_finite());
        }
        assert!(bbox.north < 90.0);
        assert!(bbox.east - bbox.west > 2.0 * (bbox.north - center.latitude));
        assert!(bbox.contains(&center));
    }

    #[test]
    fn test_bounding_box_reaching_pole_spans_all_longitudes() {
        let bbox = get_bounding_box(&Coordinate::new(89.99, 10.0), 5.0).unwrap();

        assert_eq!(bbox.north, 90.0);
        assert_eq!(bbox.east, 180.0);
        assert_eq!(bbox.west, -180.0);
        assert!(bbox.spans_all_longitudes());
        assert!(bbox.contains(&Coordinate::new(89.995, -170.0)));

        let south_pole = get_bounding_box(&Coordinate::new(-90.0, 0.0), 1.0).unwrap();
        assert_eq!(south_pole.south, -90.0);
        assert!(south_pole.spans_all_longitudes());
    }

    #[test]
    fn test_bounding_box_wraps_at_antimeridian() {
        let center = Coordinate::new(0.0, 179.99);
        let bbox = get_bounding_box(&center, 5.0).unwrap();

        assert!(bbox.crosses_antimeridian());
        assert!(bbox.west > 179.9 && bbox.west < 180.0);
        assert!(bbox.east > -180.0 && bbox.east < -179.9);
        assert!(bbox.contains(&center));
        assert!(bbox.contains(&Coordinate::new(0.0, -179.98)));
        assert!(!bbox.contains(&Coordinate::new(0.0, 0.0)));

        let west_side = get_bounding_box(&Coordinate::new(0.0, -179.99), 5.0).unwrap();
        assert!(west_side.crosses_antimeridian());
        assert!(west_side.west > 179.9);
    }

    #[test]
    fn test_bounding_box_rejects_bad_input() {
        assert!(matches!(
            get_bounding_box(&NYC, 0.0),
            Err(GeoError::InvalidRadius(_))
        ));
        assert!(get_bounding_box(&NYC, -1.0).is_err());
        assert!(get_bounding_box(&NYC, f64::NAN).is_err());
        assert!(matches!(
            get_bounding_box(&Coordinate::new(100.0, 0.0), 1.0),
            Err(GeoError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(-180.0), -180.0);
        assert!((wrap_longitude(180.5) - -179.5).abs() < 1e-9);
        assert!((wrap_longitude(-180.5) - 179.5).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_bearing_nyc_to_boston() {
        let boston = Coordinate::new(42.3601, -71.0589);
        let bearing = calculate_bearing(&NYC, &boston);

        assert!((0.0..360.0).contains(&bearing));
        assert!(bearing > 30.0 && bearing < 55.0);
    }

    #[test]
    fn test_calculate_bearing_cardinal_directions() {
        let from = Coordinate::new(37.7749, -122.4194);
        let to_north = Coordinate::new(37.7849, -122.4194);
        let to_east = Coordinate::new(37.7749, -122.4094);
        let to_south = Coordinate::new(37.7649, -122.4194);
        let to_west = Coordinate::new(37.7749, -122.4294);

        assert!(calculate_bearing(&from, &to_north).abs() < 1.0);
        assert!((calculate_bearing(&from, &to_east) - 90.0).abs() < 1.0);
        assert!((calculate_bearing(&from, &to_south) - 180.0).abs() < 1.0);
        assert!((calculate_bearing(&from, &to_west) - 270.0).abs() < 1.0);
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(meters_to_km(5500.0), 5.5);
        assert_eq!(km_to_meters(3.2), 3200.0);
    }

    #[test]
    fn test_haversine_distance() {
        let boston = Coordinate::new(42.3601, -71.0589);
        let distance = haversine_distance_km(&NYC, &boston);

        assert!((distance - 306.0).abs() < 5.0); // ~306 km
        assert_eq!(haversine_distance_km(&NYC, &NYC), 0.0);
    }

    proptest! {
        #[test]
        fn prop_in_range_coordinates_validate(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
            prop_assert!(validate_coordinates(&json!(lat), &json!(lng)));
            prop_assert!(validate_coordinates(&json!(lat.to_string()), &json!(lng.to_string())));
        }

        #[test]
        fn prop_out_of_range_latitude_rejected(lat in 90.000001f64..1e6, lng in -180.0f64..=180.0) {
            prop_assert!(!validate_coordinates(&json!(lat), &json!(lng)));
            prop_assert!(!validate_coordinates(&json!(-lat), &json!(lng)));
        }

        #[test]
        fn prop_out_of_range_longitude_rejected(lat in -90.0f64..=90.0, lng in 180.000001f64..1e6) {
            prop_assert!(!validate_coordinates(&json!(lat), &json!(lng)));
            prop_assert!(!validate_coordinates(&json!(lat), &json!(-lng)));
        }

        #[test]
        fn prop_normalize_idempotent(lat in -90.0f64..=90.0, lng in -180.0f64..=180.0) {
            let once = normalize_coordinates(lat, lng).unwrap();
            let twice = normalize_coordinates(once.latitude(), once.longitude()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_bearing_in_range(
            lat1 in -89.0f64..89.0, lng1 in -180.0f64..180.0,
            lat2 in -89.0f64..89.0, lng2 in -180.0f64..180.0
        ) {
            let bearing = calculate_bearing(&Coordinate::new(lat1, lng1), &Coordinate::new(lat2, lng2));
            prop_assert!((0.0..360.0).contains(&bearing));
        }

        #[test]
        fn prop_bounding_box_contains_center(
            lat in -90.0f64..=90.0, lng in -180.0f64..=180.0, radius in 0.01f64..50.0
        ) {
            let center = Coordinate::new(lat, lng);
            let bbox = get_bounding_box(&center, radius).unwrap();
            prop_assert!(bbox.south <= bbox.north);
            prop_assert!(bbox.east.is_finite() && bbox.west.is_finite());
            prop_assert!(bbox.contains(&center));
        }
    }
}
