//! Turns editor state into a persistable geofence.

use crate::errors::{ValidationError, ValidationErrors};
use crate::models::geofence::{EditorState, Geofence, MAX_NAME_LENGTH};
use crate::models::geometry::{distinct_point_count, is_valid_polygon, MapShape};

/// Validates `state` and builds the geofence to send to the backend.
///
/// Every problem is reported, not just the first, so a form can flag all
/// invalid fields at once.
pub fn to_persistable_geofence(state: &EditorState) -> Result<Geofence, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = state.name.trim();
    if name.is_empty() {
        errors.push(ValidationError::EmptyName);
    } else if name.chars().count() > MAX_NAME_LENGTH {
        errors.push(ValidationError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }

    match &state.shape {
        None => errors.push(ValidationError::MissingGeometry),
        Some(shape) => {
            debug_assert_eq!(
                shape.shape_type(),
                state.shape_type,
                "editor shape does not match the selected shape type"
            );
            errors.extend(validate_shape(shape));
        }
    }

    errors.extend(state.alert_config.validate());
    errors.extend(state.schedule.validate());
    errors.extend(state.notifications.validate());

    errors.into_result()?;

    // Checked above; a missing shape always produces MissingGeometry.
    let Some(shape) = &state.shape else {
        return Err(ValidationError::MissingGeometry.into());
    };

    let mut alert_config = state.alert_config.clone();
    alert_config.dwell_minutes = alert_config.effective_dwell_minutes();

    let description = state
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    tracing::debug!(
        shape_type = %state.shape_type,
        name = %name,
        vehicles = state.vehicle_ids.len(),
        "Editor state validated"
    );

    Ok(Geofence {
        id: state.id.clone(),
        name: name.to_string(),
        description,
        geometry: shape.to_geometry(),
        alert_config,
        schedule: state.schedule.clone(),
        notifications: state.notifications.clone(),
        assigned_vehicle_ids: state.vehicle_ids.clone(),
        status: state.status,
        created_at: None,
        updated_at: None,
    })
}

/// Geometry rules for a drawn shape.
pub fn validate_shape(shape: &MapShape) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = shape
        .defining_points()
        .into_iter()
        .filter(|p| !p.is_in_range())
        .map(|p| ValidationError::InvalidCoordinate {
            lat: p.lat,
            lng: p.lng,
        })
        .collect();

    match shape {
        MapShape::Circle { radius_meters, .. } => {
            if !radius_meters.is_finite() || *radius_meters <= 0.0 {
                errors.push(ValidationError::InvalidRadius {
                    value: *radius_meters,
                });
            }
        }
        MapShape::Rectangle {
            south_west,
            north_east,
        } => {
            if south_west.lat == north_east.lat || south_west.lng == north_east.lng {
                errors.push(ValidationError::DegenerateRectangle);
            }
        }
        MapShape::Polygon { points } => {
            if !is_valid_polygon(points) {
                errors.push(ValidationError::IncompletePolygon {
                    points: distinct_point_count(points),
                });
            }
        }
    }

    errors
}
