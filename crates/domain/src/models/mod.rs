//! Domain models for the geofence editor.

pub mod alert;
pub mod coordinate;
pub mod geofence;
pub mod geometry;
pub mod notification;
pub mod schedule;

pub use alert::{AlertConfig, AlertPolicy, TriggerCoupling, TriggerKind};
pub use coordinate::{from_persisted, to_persisted, MapCoordinate, PersistedCoordinate};
pub use geofence::{EditorMode, EditorState, Geofence, GeofenceId, GeofenceStatus, VehicleId};
pub use geometry::{
    bounds_of, close_ring, is_valid_polygon, Bounds, Geometry, MapShape, RadiusLimits, ShapeType,
};
pub use notification::NotificationConfig;
pub use schedule::{DayOfWeek, Schedule};
