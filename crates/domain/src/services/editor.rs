//! Geofence editor: owns the editor state and at most one drawing session.
//!
//! Every user interaction is an [`EditorAction`]. Actions are applied
//! synchronously, in arrival order.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{ValidationError, ValidationErrors};
use crate::models::alert::{AlertPolicy, TriggerKind};
use crate::models::geofence::{EditorMode, EditorState, Geofence, GeofenceStatus, VehicleId};
use crate::models::geometry::{
    bounds_of, Bounds, MapShape, RadiusLimits, ShapeType, DEFAULT_CIRCLE_RADIUS_METERS,
};
use crate::models::notification::NotificationConfig;
use crate::models::schedule::Schedule;
use crate::models::MapCoordinate;
use crate::services::drawing::{self, DrawingSession, DrawingStage};
use crate::services::validation::to_persistable_geofence;

/// Tunables for an editor instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorSettings {
    pub radius_limits: RadiusLimits,
    pub alert_policy: AlertPolicy,
    pub default_radius_meters: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            radius_limits: RadiusLimits::default(),
            alert_policy: AlertPolicy::default(),
            default_radius_meters: DEFAULT_CIRCLE_RADIUS_METERS,
        }
    }
}

/// One user interaction with the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum EditorAction {
    SelectShape { shape: ShapeType },
    StartDrawing,
    Click(MapCoordinate),
    CompletePolygon,
    ResetDrawing,
    SetRadius { meters: f64 },
    SetName { name: String },
    SetDescription { description: Option<String> },
    SetStatus { status: GeofenceStatus },
    SetTrigger { trigger: TriggerKind, enabled: bool },
    SetDwellMinutes { minutes: u32 },
    SetSpeedLimit { kph: f64 },
    ClearSpeedLimit,
    SetSchedule(Schedule),
    SetNotifications(NotificationConfig),
    AssignVehicle { vehicle: VehicleId },
    UnassignVehicle { vehicle: VehicleId },
}

#[derive(Debug, Clone)]
pub struct GeofenceEditor {
    state: EditorState,
    session: Option<DrawingSession>,
    settings: EditorSettings,
}

impl GeofenceEditor {
    /// Editor for a new geofence.
    pub fn new(shape_type: ShapeType, settings: EditorSettings) -> Self {
        let mut state = EditorState::new(shape_type);
        state.circle_radius_meters = settings
            .radius_limits
            .clamp(settings.default_radius_meters);
        Self {
            state,
            session: None,
            settings,
        }
    }

    /// Editor over existing state, typically a loaded geofence.
    ///
    /// A loaded shape is shown as is; drawing only restarts on
    /// [`GeofenceEditor::start_drawing`].
    pub fn from_state(state: EditorState, settings: EditorSettings) -> Self {
        Self {
            state,
            session: None,
            settings,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn into_state(self) -> EditorState {
        self.state
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn session(&self) -> Option<&DrawingSession> {
        self.session.as_ref()
    }

    pub fn drawing_stage(&self) -> DrawingStage {
        self.session
            .as_ref()
            .map(|s| s.stage().clone())
            .unwrap_or(DrawingStage::Idle)
    }

    /// Area the map should fit to show the current shape.
    pub fn bounds(&self) -> Option<Bounds> {
        self.state.shape.as_ref().and_then(bounds_of)
    }

    /// Changes the shape type of a new geofence, discarding what was drawn.
    ///
    /// Existing geofences keep their shape type.
    pub fn select_shape_type(&mut self, shape_type: ShapeType) -> Result<(), ValidationError> {
        if shape_type == self.state.shape_type {
            return Ok(());
        }
        if self.state.mode == EditorMode::Edit {
            return Err(ValidationError::ShapeTypeLocked);
        }

        debug!(from = %self.state.shape_type, to = %shape_type, "Shape type changed");
        self.state.shape_type = shape_type;
        self.state.shape = None;
        self.session = None;
        Ok(())
    }

    /// Begins a fresh session, discarding any session in progress.
    pub fn start_drawing(&mut self) {
        if self.session.take().is_some() {
            debug!("Discarding previous drawing session");
        }
        self.session = Some(
            DrawingSession::start(self.state.shape_type)
                .with_circle_radius(self.state.circle_radius_meters),
        );
    }

    pub fn click(&mut self, coord: MapCoordinate) {
        let Some(session) = &self.session else {
            warn!(
                lat = coord.lat,
                lng = coord.lng,
                "Ignoring map click with no drawing session"
            );
            return;
        };
        let next = drawing::apply_click(session, coord);
        self.accept(next);
    }

    /// Finishes the polygon being drawn.
    ///
    /// On failure the session stays open for more points. A polygon editor
    /// with neither a session nor a finished polygon has zero points to close.
    pub fn complete_polygon(&mut self) -> Result<(), ValidationError> {
        let Some(session) = &self.session else {
            if self.state.shape_type == ShapeType::Polygon
                && !matches!(self.state.shape, Some(MapShape::Polygon { .. }))
            {
                warn!("Polygon completed before any points were drawn");
                return Err(ValidationError::IncompletePolygon { points: 0 });
            }
            warn!("No drawing session to complete");
            return Ok(());
        };
        if session.shape_type() != ShapeType::Polygon {
            warn!(shape_type = %session.shape_type(), "Only polygons complete explicitly");
            return Ok(());
        }
        let next = drawing::complete_polygon(session)?;
        self.accept(next);
        Ok(())
    }

    /// Abandons the current session. Any previously completed shape stays.
    pub fn reset_drawing(&mut self) {
        if let Some(session) = self.session.take() {
            let cancelled = drawing::reset_drawing(&session);
            debug!(stage = ?cancelled.stage(), "Drawing reset");
        }
    }

    /// Sets the circle radius, clamped to the configured limits.
    ///
    /// Returns the radius actually applied.
    pub fn set_radius(&mut self, meters: f64) -> f64 {
        let clamped = self.settings.radius_limits.clamp(meters);
        if clamped != meters {
            debug!(requested = meters, applied = clamped, "Radius clamped");
        }
        self.state.circle_radius_meters = clamped;

        if let Some(MapShape::Circle { radius_meters, .. }) = &mut self.state.shape {
            *radius_meters = clamped;
        }
        if let Some(session) = self.session.take() {
            self.session = Some(session.with_circle_radius(clamped));
        }
        clamped
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.state.name = name.into();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.state.description = description;
    }

    pub fn set_status(&mut self, status: GeofenceStatus) {
        self.state.status = status;
    }

    pub fn set_trigger(&mut self, kind: TriggerKind, enabled: bool) {
        let policy = self.settings.alert_policy;
        self.state.alert_config.set_trigger(kind, enabled, &policy);
    }

    pub fn set_dwell_minutes(&mut self, minutes: u32) {
        self.state.alert_config.set_dwell_minutes(minutes);
    }

    pub fn set_speed_limit(&mut self, kph: f64) {
        let policy = self.settings.alert_policy;
        self.state.alert_config.set_speed_limit(kph, &policy);
    }

    pub fn clear_speed_limit(&mut self) {
        self.state.alert_config.clear_speed_limit();
    }

    pub fn set_schedule(&mut self, schedule: Schedule) {
        self.state.schedule = schedule;
    }

    pub fn set_notifications(&mut self, notifications: NotificationConfig) {
        self.state.notifications = notifications;
    }

    pub fn assign_vehicle(&mut self, vehicle: VehicleId) {
        self.state.vehicle_ids.insert(vehicle);
    }

    pub fn unassign_vehicle(&mut self, vehicle: &VehicleId) {
        self.state.vehicle_ids.remove(vehicle);
    }

    pub fn apply(&mut self, action: EditorAction) -> Result<(), ValidationError> {
        match action {
            EditorAction::SelectShape { shape } => return self.select_shape_type(shape),
            EditorAction::StartDrawing => self.start_drawing(),
            EditorAction::Click(coord) => self.click(coord),
            EditorAction::CompletePolygon => return self.complete_polygon(),
            EditorAction::ResetDrawing => self.reset_drawing(),
            EditorAction::SetRadius { meters } => {
                self.set_radius(meters);
            }
            EditorAction::SetName { name } => self.set_name(name),
            EditorAction::SetDescription { description } => self.set_description(description),
            EditorAction::SetStatus { status } => self.set_status(status),
            EditorAction::SetTrigger { trigger, enabled } => self.set_trigger(trigger, enabled),
            EditorAction::SetDwellMinutes { minutes } => self.set_dwell_minutes(minutes),
            EditorAction::SetSpeedLimit { kph } => self.set_speed_limit(kph),
            EditorAction::ClearSpeedLimit => self.clear_speed_limit(),
            EditorAction::SetSchedule(schedule) => self.set_schedule(schedule),
            EditorAction::SetNotifications(notifications) => {
                self.set_notifications(notifications)
            }
            EditorAction::AssignVehicle { vehicle } => self.assign_vehicle(vehicle),
            EditorAction::UnassignVehicle { vehicle } => self.unassign_vehicle(&vehicle),
        }
        Ok(())
    }

    /// See [`to_persistable_geofence`].
    pub fn to_persistable(&self) -> Result<Geofence, ValidationErrors> {
        to_persistable_geofence(&self.state)
    }

    fn accept(&mut self, next: DrawingSession) {
        match next.completed_shape() {
            Some(shape) => {
                self.state.shape = Some(shape.clone());
                self.session = None;
            }
            None => self.session = Some(next),
        }
    }
}
