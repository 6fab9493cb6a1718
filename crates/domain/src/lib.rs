//! Domain layer for the fleet geofence console.
//!
//! This crate contains:
//! - Geometry model (map-native and persisted coordinates, shapes, rings)
//! - Alert, schedule and notification configuration
//! - The shape drawing state machine and the geofence editor
//! - Validation and the persistence adapter over an abstract store
//! - Domain error types

pub mod errors;
pub mod models;
pub mod services;

pub use errors::{RequestError, ValidationError, ValidationErrors};
