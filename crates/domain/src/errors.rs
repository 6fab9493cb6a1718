//! Domain error types.
//!
//! Validation problems are local and recoverable; they are collected into a
//! [`ValidationErrors`] list so a form can flag every invalid field at once.
//! Request problems come from the data-access layer and are reported one per
//! request.

use thiserror::Error;

use crate::models::geofence::GeofenceId;

/// A single rule violated by editor state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    EmptyName,

    #[error("Name must be at most {max} characters")]
    NameTooLong { max: usize },

    #[error("Draw a geofence shape on the map")]
    MissingGeometry,

    #[error("A polygon needs at least 3 distinct points (has {points})")]
    IncompletePolygon { points: usize },

    #[error("Rectangle corners must differ in both latitude and longitude")]
    DegenerateRectangle,

    #[error("Coordinate ({lat}, {lng}) is outside the valid range")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("Radius must be a positive number of meters (got {value})")]
    InvalidRadius { value: f64 },

    #[error("Dwell time is required when the dwell trigger is enabled")]
    MissingDwellTime,

    #[error("Dwell time must be at least one minute")]
    InvalidDwellTime,

    #[error("Speed limit must be a positive number (got {value})")]
    InvalidSpeedLimit { value: f64 },

    #[error("Select at least one alert trigger")]
    NoTriggerSelected,

    #[error("Select at least one day for the active schedule")]
    ScheduleWithoutDays,

    #[error("An active schedule needs both a start and an end time")]
    IncompleteScheduleWindow,

    #[error("Schedule start and end time must differ")]
    EmptyScheduleWindow,

    #[error("'{address}' is not a valid email address")]
    InvalidEmail { address: String },

    #[error("'{number}' is not a valid phone number")]
    InvalidPhone { number: String },

    #[error("The shape type of an existing geofence cannot be changed")]
    ShapeTypeLocked,
}

impl ValidationError {
    /// Form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyName | ValidationError::NameTooLong { .. } => "name",
            ValidationError::MissingGeometry
            | ValidationError::IncompletePolygon { .. }
            | ValidationError::DegenerateRectangle
            | ValidationError::InvalidCoordinate { .. } => "geometry",
            ValidationError::InvalidRadius { .. } => "radius",
            ValidationError::MissingDwellTime | ValidationError::InvalidDwellTime => "dwellTime",
            ValidationError::InvalidSpeedLimit { .. } => "speedLimit",
            ValidationError::NoTriggerSelected => "alertType",
            ValidationError::ScheduleWithoutDays => "daysOfWeek",
            ValidationError::IncompleteScheduleWindow | ValidationError::EmptyScheduleWindow => {
                "scheduleWindow"
            }
            ValidationError::InvalidEmail { .. } => "email",
            ValidationError::InvalidPhone { .. } => "sms",
            ValidationError::ShapeTypeLocked => "type",
        }
    }
}

/// Every validation failure found in one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn extend(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.0.extend(errors);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<ValidationError> {
        self.0
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "no validation errors"),
            [single] => write!(f, "{}", single),
            many => {
                write!(f, "{} validation errors: ", many.len())?;
                for (i, error) in many.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Failure reported by the geofence data-access layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("Request failed: {0}")]
    Transport(String),

    /// Backend rejected the request; `message` is shown to the user as-is.
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Geofence {0} not found")]
    NotFound(GeofenceId),

    #[error("Invalid response from backend: {0}")]
    Decode(String),

    #[error("Geofence has no id; create it before updating")]
    MissingId,

    /// A later save was issued before this one finished.
    #[error("Save superseded by a newer request")]
    Superseded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_fields() {
        assert_eq!(ValidationError::EmptyName.field(), "name");
        assert_eq!(
            ValidationError::IncompletePolygon { points: 2 }.field(),
            "geometry"
        );
        assert_eq!(ValidationError::MissingDwellTime.field(), "dwellTime");
        assert_eq!(
            ValidationError::InvalidSpeedLimit { value: -1.0 }.field(),
            "speedLimit"
        );
    }

    #[test]
    fn test_validation_errors_display_single() {
        let errors = ValidationErrors::from(vec![ValidationError::EmptyName]);
        assert_eq!(errors.to_string(), "Name is required");
    }

    #[test]
    fn test_validation_errors_display_many() {
        let errors = ValidationErrors::from(vec![
            ValidationError::EmptyName,
            ValidationError::MissingDwellTime,
        ]);
        let message = errors.to_string();
        assert!(message.starts_with("2 validation errors"));
        assert!(message.contains("Dwell time is required"));
    }

    #[test]
    fn test_validation_errors_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());
        let err = ValidationErrors::from(vec![ValidationError::NoTriggerSelected])
            .into_result()
            .unwrap_err();
        assert_eq!(err.len(), 1);
    }

    #[test]
    fn test_request_error_status_message_is_verbatim() {
        let err = RequestError::Status {
            status: 409,
            message: "Geofence name already in use".to_string(),
        };
        assert_eq!(err.to_string(), "Geofence name already in use");
    }
}
