//! Fleet geofence console.
//!
//! Replays recorded editor sessions against the geofence editor and manages
//! stored geofences through the fleet backend.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod runner;
pub mod script;
