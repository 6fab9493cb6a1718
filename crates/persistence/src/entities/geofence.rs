//! Geofence record (backend JSON mapping).

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use domain::models::geometry::{CircleGeometry, PolygonGeometry, RectangleGeometry};
use domain::models::{
    AlertConfig, Geofence, GeofenceId, GeofenceStatus, Geometry, NotificationConfig,
    PersistedCoordinate, Schedule, ShapeType, VehicleId,
};

/// Geofence document as exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub shape_type: ShapeType,
    pub geometry: GeometryRecord,
    pub alert_type: AlertTypeRecord,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub vehicles: Vec<String>,
    #[serde(default)]
    pub status: GeofenceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Geometry block; which fields are set depends on the record's `type`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<PointRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Rings of `[lon, lat]` pairs; only the outer ring is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Vec<Vec<PersistedCoordinate>>>,
}

/// GeoJSON point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: PersistedCoordinate,
}

impl PointRecord {
    pub fn new(coordinates: PersistedCoordinate) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertTypeRecord {
    #[serde(default)]
    pub entry: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub dwell: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwell_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_limit: Option<f64>,
}

/// A record that cannot be turned into a domain geofence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("{shape_type} geofence is missing geometry.{field}")]
    MissingGeometryField {
        shape_type: ShapeType,
        field: &'static str,
    },

    #[error("{shape_type} geofence has an empty coordinate ring")]
    EmptyRing { shape_type: ShapeType },
}

impl From<&AlertConfig> for AlertTypeRecord {
    fn from(config: &AlertConfig) -> Self {
        Self {
            entry: config.entry,
            exit: config.exit,
            dwell: config.dwell,
            dwell_time: config.effective_dwell_minutes(),
            speed_limit: config.speed_limit_kph,
        }
    }
}

impl From<AlertTypeRecord> for AlertConfig {
    fn from(record: AlertTypeRecord) -> Self {
        Self {
            entry: record.entry,
            exit: record.exit,
            dwell: record.dwell,
            dwell_minutes: record.dwell_time,
            speed_limit_kph: record.speed_limit,
        }
    }
}

impl From<&Geometry> for GeometryRecord {
    fn from(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Circle(circle) => Self {
                center: Some(PointRecord::new(circle.center)),
                radius: Some(circle.radius_meters),
                coordinates: None,
            },
            Geometry::Rectangle(rect) => Self {
                coordinates: Some(vec![rect.ring().to_vec()]),
                ..Self::default()
            },
            Geometry::Polygon(polygon) => Self {
                coordinates: Some(vec![polygon.ring().to_vec()]),
                ..Self::default()
            },
        }
    }
}

impl GeometryRecord {
    /// Reads the geometry for the given shape type. The `type` field decides
    /// which geometry fields are required; unrelated fields are ignored.
    pub fn into_geometry(self, shape_type: ShapeType) -> Result<Geometry, RecordError> {
        let missing = |field| RecordError::MissingGeometryField { shape_type, field };

        match shape_type {
            ShapeType::Circle => {
                let center = self.center.ok_or_else(|| missing("center"))?;
                let radius = self.radius.ok_or_else(|| missing("radius"))?;
                Ok(Geometry::Circle(CircleGeometry {
                    center: center.coordinates,
                    radius_meters: radius,
                }))
            }
            ShapeType::Rectangle => {
                let ring = self.outer_ring().ok_or_else(|| missing("coordinates"))?;
                RectangleGeometry::from_ring(ring)
                    .map(Geometry::Rectangle)
                    .ok_or(RecordError::EmptyRing { shape_type })
            }
            ShapeType::Polygon => {
                let ring = self.outer_ring().ok_or_else(|| missing("coordinates"))?;
                if ring.is_empty() {
                    return Err(RecordError::EmptyRing { shape_type });
                }
                Ok(Geometry::Polygon(PolygonGeometry::from_ring(ring)))
            }
        }
    }

    fn outer_ring(self) -> Option<Vec<PersistedCoordinate>> {
        self.coordinates.and_then(|rings| rings.into_iter().next())
    }
}

impl From<&Geofence> for GeofenceRecord {
    fn from(geofence: &Geofence) -> Self {
        Self {
            id: geofence.id.as_ref().map(|id| id.as_str().to_string()),
            name: geofence.name.clone(),
            description: geofence.description.clone(),
            shape_type: geofence.shape_type(),
            geometry: GeometryRecord::from(&geofence.geometry),
            alert_type: AlertTypeRecord::from(&geofence.alert_config),
            schedule: geofence.schedule.clone(),
            notifications: geofence.notifications.clone(),
            vehicles: geofence
                .assigned_vehicle_ids
                .iter()
                .map(|v| v.as_str().to_string())
                .collect(),
            status: geofence.status,
            created_at: geofence.created_at,
            updated_at: geofence.updated_at,
        }
    }
}

impl TryFrom<GeofenceRecord> for Geofence {
    type Error = RecordError;

    fn try_from(record: GeofenceRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id.map(GeofenceId::new),
            name: record.name,
            description: record.description,
            geometry: record.geometry.into_geometry(record.shape_type)?,
            alert_config: record.alert_type.into(),
            schedule: record.schedule,
            notifications: record.notifications,
            assigned_vehicle_ids: record.vehicles.into_iter().map(VehicleId::new).collect(),
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Decodes a response body that is either the bare payload or wrapped as
/// `{ "data": ... }`.
///
/// A body with a `data` field is tried wrapped first, then bare. On failure
/// the error of the matching form is returned, so it names the bad field.
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    let value: Value = serde_json::from_slice(body)?;
    let Some(data) = value.get("data") else {
        return serde_json::from_value(value);
    };
    match T::deserialize(data) {
        Ok(inner) => Ok(inner),
        Err(wrapped) => serde_json::from_value(value).map_err(|_| wrapped),
    }
}

/// Error body returned by the backend.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// The backend's own message, `message` taking precedence over `error`.
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}
