use serde::{Deserialize, Serialize};

use crate::libraries::geo_utils::{is_valid_coordinate, normalize_coordinates};

/// A raw latitude/longitude pair as parsed from request input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Validate that coordinates are finite and within valid GPS ranges
    pub fn is_valid(&self) -> bool {
        is_valid_coordinate(self.latitude, self.longitude)
    }
}

/// A coordinate rounded to a fixed 6-decimal precision.
///
/// Only [`normalize_coordinates`] produces one, so holding a value means the
/// pair was validated. Deserializing goes through the same path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Coordinate")]
pub struct NormalizedCoordinate {
    latitude: f64,
    longitude: f64,
}

impl NormalizedCoordinate {
    pub(crate) fn from_rounded(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn as_coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

impl TryFrom<Coordinate> for NormalizedCoordinate {
    type Error = GeoError;

    fn try_from(value: Coordinate) -> Result<Self, Self::Error> {
        normalize_coordinates(value.latitude, value.longitude)
    }
}

impl From<NormalizedCoordinate> for Coordinate {
    fn from(value: NormalizedCoordinate) -> Self {
        value.as_coordinate()
    }
}

/// Axis-aligned latitude/longitude rectangle around a search center.
///
/// Longitudes are always within [-180, 180]. A box that straddles the
/// antimeridian has `west > east`; consumers building a query predicate must
/// split it into two ranges (see [`BoundingBox::longitude_ranges`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// True when the box covers every longitude (polar boxes).
    pub fn spans_all_longitudes(&self) -> bool {
        self.west <= -180.0 && self.east >= 180.0
    }

    /// Longitude intervals covered by the box, west to east.
    pub fn longitude_ranges(&self) -> Vec<(f64, f64)> {
        if self.crosses_antimeridian() {
            vec![(self.west, 180.0), (-180.0, self.east)]
        } else {
            vec![(self.west, self.east)]
        }
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        if coordinate.latitude < self.south || coordinate.latitude > self.north {
            return false;
        }

        self.longitude_ranges()
            .iter()
            .any(|(west, east)| coordinate.longitude >= *west && coordinate.longitude <= *east)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid radius: {0} km")]
    InvalidRadius(f64),
}
