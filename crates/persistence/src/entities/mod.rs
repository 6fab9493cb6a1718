//! Wire records exchanged with the geofence backend.

pub mod geofence;

pub use geofence::{
    decode_envelope, AlertTypeRecord, ErrorBody, GeofenceRecord, GeometryRecord, PointRecord,
    RecordError,
};
