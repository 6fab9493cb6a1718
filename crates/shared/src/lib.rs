//! Shared utilities and common types for the fleet geofence console.
//!
//! This crate provides common functionality used across all other crates:
//! - Coordinate range checks
//! - Contact (email / phone) validation for notification routing
//! - Numeric clamping helpers for form inputs

pub mod validation;
