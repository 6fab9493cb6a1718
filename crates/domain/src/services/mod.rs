//! Domain services for the geofence editor.
//!
//! Services contain the editing and persistence logic that operates on
//! domain models.

pub mod adapter;
pub mod drawing;
pub mod editor;
pub mod store;
pub mod validation;

pub use adapter::{GeofenceAdapter, SaveMode};
pub use drawing::{apply_click, complete_polygon, reset_drawing, DrawingSession, DrawingStage};
pub use editor::{EditorAction, EditorSettings, GeofenceEditor};
pub use store::{GeofenceStore, InMemoryGeofenceStore};
pub use validation::{to_persistable_geofence, validate_shape};
