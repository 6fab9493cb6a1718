//! Coordinate representations and the conversions between them.
//!
//! The map surface speaks `(lat, lng)`; the persisted format speaks
//! `[lon, lat]`. A swapped pair near the equator still looks plausible on a
//! map, so neither type can be built from an anonymous tuple and every swap
//! goes through [`to_persisted`] or [`from_persisted`].

use serde::{Deserialize, Serialize};

/// A coordinate in map-native `(latitude, longitude)` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapCoordinate {
    pub lat: f64,
    pub lng: f64,
}

impl MapCoordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are within `tolerance` degrees of `other`.
    pub fn approx_eq(&self, other: &MapCoordinate, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lng - other.lng).abs() <= tolerance
    }

    /// True when latitude and longitude are both inside their valid ranges.
    pub fn is_in_range(&self) -> bool {
        shared::validation::validate_latitude(self.lat).is_ok()
            && shared::validation::validate_longitude(self.lng).is_ok()
    }
}

/// A coordinate in persisted `[longitude, latitude]` order.
///
/// Serializes as a two-element JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersistedCoordinate([f64; 2]);

impl PersistedCoordinate {
    /// Builds a persisted coordinate from explicitly named components.
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Self([lon, lat])
    }

    pub fn lon(&self) -> f64 {
        self.0[0]
    }

    pub fn lat(&self) -> f64 {
        self.0[1]
    }

    /// Raw `[lon, lat]` array as it appears on the wire.
    pub fn as_array(&self) -> [f64; 2] {
        self.0
    }
}

/// Converts a map-native coordinate into persisted order.
pub fn to_persisted(coord: MapCoordinate) -> PersistedCoordinate {
    PersistedCoordinate([coord.lng, coord.lat])
}

/// Converts a persisted coordinate back into map-native order.
pub fn from_persisted(coord: PersistedCoordinate) -> MapCoordinate {
    MapCoordinate {
        lat: coord.0[1],
        lng: coord.0[0],
    }
}

/// `geo` works in `x = longitude, y = latitude`.
pub(crate) fn to_geo_coord(coord: MapCoordinate) -> geo::Coord<f64> {
    geo::Coord {
        x: coord.lng,
        y: coord.lat,
    }
}

pub(crate) fn from_geo_coord(coord: geo::Coord<f64>) -> MapCoordinate {
    MapCoordinate {
        lat: coord.y,
        lng: coord.x,
    }
}
