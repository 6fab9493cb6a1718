//! Store implementations backed by the fleet backend.

pub mod geofence;

pub use geofence::HttpGeofenceStore;
