//! Persistence layer for the fleet geofence console.
//!
//! This crate contains:
//! - HTTP client construction for the geofence backend
//! - Wire record definitions (backend JSON mappings)
//! - The HTTP-backed [`domain::services::GeofenceStore`] implementation

pub mod client;
pub mod entities;
pub mod metrics;
pub mod repositories;

pub use client::{create_client, BackendSettings};
pub use repositories::HttpGeofenceStore;
