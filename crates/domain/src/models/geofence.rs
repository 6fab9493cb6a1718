//! Geofence domain model and the editable state it is authored from.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::alert::AlertConfig;
use super::coordinate::MapCoordinate;
use super::geometry::{Geometry, MapShape, ShapeType, DEFAULT_CIRCLE_RADIUS_METERS};
use super::notification::NotificationConfig;
use super::schedule::Schedule;

/// Maximum geofence name length in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// Server-assigned geofence identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeofenceId(String);

impl GeofenceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GeofenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a vehicle assigned to a geofence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeofenceStatus {
    #[default]
    Active,
    Inactive,
}

impl GeofenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeofenceStatus::Active => "active",
            GeofenceStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(GeofenceStatus::Active),
            "inactive" => Some(GeofenceStatus::Inactive),
            _ => None,
        }
    }
}

/// A persistable geofence. Geometry is in persisted coordinate order and the
/// shape type is derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Geofence {
    /// `None` until the backend has assigned one.
    pub id: Option<GeofenceId>,
    pub name: String,
    pub description: Option<String>,
    pub geometry: Geometry,
    pub alert_config: AlertConfig,
    pub schedule: Schedule,
    pub notifications: NotificationConfig,
    pub assigned_vehicle_ids: BTreeSet<VehicleId>,
    pub status: GeofenceStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Geofence {
    pub fn shape_type(&self) -> ShapeType {
        self.geometry.shape_type()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    Create,
    Edit,
}

/// Map-native editing state for one geofence.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub id: Option<GeofenceId>,
    pub mode: EditorMode,
    pub shape_type: ShapeType,
    /// Last completed shape; `None` until something has been drawn.
    pub shape: Option<MapShape>,
    /// Radius applied to the next circle and to the current one.
    pub circle_radius_meters: f64,
    pub name: String,
    pub description: Option<String>,
    pub alert_config: AlertConfig,
    pub schedule: Schedule,
    pub notifications: NotificationConfig,
    pub vehicle_ids: BTreeSet<VehicleId>,
    pub status: GeofenceStatus,
}

impl EditorState {
    /// Empty create-mode state with defaults for the given shape type.
    pub fn new(shape_type: ShapeType) -> Self {
        Self {
            id: None,
            mode: EditorMode::Create,
            shape_type,
            shape: None,
            circle_radius_meters: DEFAULT_CIRCLE_RADIUS_METERS,
            name: String::new(),
            description: None,
            alert_config: AlertConfig::default(),
            schedule: Schedule::always_on(),
            notifications: NotificationConfig::default(),
            vehicle_ids: BTreeSet::new(),
            status: GeofenceStatus::Active,
        }
    }

    /// Edit-mode state for a stored geofence, converted back to map-native
    /// coordinates.
    pub fn from_geofence(geofence: &Geofence) -> Self {
        let shape = geofence.geometry.to_map_shape();
        let circle_radius_meters = match &shape {
            MapShape::Circle { radius_meters, .. } => *radius_meters,
            _ => DEFAULT_CIRCLE_RADIUS_METERS,
        };

        Self {
            id: geofence.id.clone(),
            mode: EditorMode::Edit,
            shape_type: geofence.shape_type(),
            shape: Some(shape),
            circle_radius_meters,
            name: geofence.name.clone(),
            description: geofence.description.clone(),
            alert_config: geofence.alert_config.clone(),
            schedule: geofence.schedule.clone(),
            notifications: geofence.notifications.clone(),
            vehicle_ids: geofence.assigned_vehicle_ids.clone(),
            status: geofence.status,
        }
    }

    /// Points of the current polygon, for showing an existing outline.
    pub fn polygon_points(&self) -> &[MapCoordinate] {
        match &self.shape {
            Some(MapShape::Polygon { points }) => points,
            _ => &[],
        }
    }
}
