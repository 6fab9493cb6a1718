//! Executes console commands against a geofence store.

use std::fmt::Write as _;

use tracing::{debug, info};

use domain::models::{Geofence, GeofenceId, ShapeType};
use domain::services::{EditorSettings, GeofenceAdapter, GeofenceEditor, GeofenceStore, SaveMode};
use persistence::entities::GeofenceRecord;

use crate::cli::{Command, USAGE};
use crate::error::ConsoleError;
use crate::script::EditorScript;

pub struct Runner<S> {
    adapter: GeofenceAdapter<S>,
    editor_settings: EditorSettings,
}

impl<S: GeofenceStore> Runner<S> {
    pub fn new(store: S, editor_settings: EditorSettings) -> Self {
        Self {
            adapter: GeofenceAdapter::new(store),
            editor_settings,
        }
    }

    pub fn adapter(&self) -> &GeofenceAdapter<S> {
        &self.adapter
    }

    /// Runs one command and returns the text to print.
    pub async fn run(&self, command: Command) -> Result<String, ConsoleError> {
        match command {
            Command::Validate(path) => self.validate(&EditorScript::from_file(&path)?).await,
            Command::Save(path) => self.save(&EditorScript::from_file(&path)?).await,
            Command::Show(id) => self.show(&id).await,
            Command::List => self.list().await,
            Command::Delete(id) => self.delete(&id).await,
            Command::Help => Ok(USAGE.to_string()),
        }
    }

    /// Builds an editor from the script's starting point and applies every
    /// action in order.
    pub async fn replay(&self, script: &EditorScript) -> Result<GeofenceEditor, ConsoleError> {
        let mut editor = match &script.load {
            Some(id) => {
                let state = self.adapter.load(id).await?;
                let mut editor = GeofenceEditor::from_state(state, self.editor_settings);
                if let Some(shape) = script.shape {
                    editor
                        .select_shape_type(shape)
                        .map_err(|source| ConsoleError::Action { step: 0, source })?;
                }
                editor
            }
            None => GeofenceEditor::new(
                script.shape.unwrap_or(ShapeType::Circle),
                self.editor_settings,
            ),
        };

        for (index, action) in script.actions.iter().cloned().enumerate() {
            debug!(step = index + 1, action = ?action, "Applying editor action");
            editor
                .apply(action)
                .map_err(|source| ConsoleError::Action {
                    step: index + 1,
                    source,
                })?;
        }
        Ok(editor)
    }

    pub async fn validate(&self, script: &EditorScript) -> Result<String, ConsoleError> {
        let editor = self.replay(script).await?;
        let geofence = editor.to_persistable()?;
        Ok(format!(
            "Geofence '{}' is valid ({})",
            geofence.name,
            geofence.shape_type()
        ))
    }

    pub async fn save(&self, script: &EditorScript) -> Result<String, ConsoleError> {
        let editor = self.replay(script).await?;
        let geofence = editor.to_persistable()?;
        let mode = SaveMode::from(editor.state().mode);

        let saved = self.adapter.save(&geofence, mode).await?;
        info!(geofence_id = ?saved.id, mode = ?mode, "Script saved");
        render(&saved)
    }

    pub async fn show(&self, id: &GeofenceId) -> Result<String, ConsoleError> {
        let geofence = self.adapter.store().get(id).await?;
        render(&geofence)
    }

    pub async fn list(&self) -> Result<String, ConsoleError> {
        let geofences = self.adapter.list().await?;
        if geofences.is_empty() {
            return Ok("No geofences".to_string());
        }

        let mut out = String::new();
        for geofence in &geofences {
            let id = geofence.id.as_ref().map(GeofenceId::as_str).unwrap_or("-");
            // Writing to a String cannot fail.
            let _ = writeln!(
                out,
                "{}\t{}\t{}\t{}\t{} vehicle(s)",
                id,
                geofence.name,
                geofence.shape_type(),
                geofence.status.as_str(),
                geofence.assigned_vehicle_ids.len()
            );
        }
        Ok(out.trim_end().to_string())
    }

    pub async fn delete(&self, id: &GeofenceId) -> Result<String, ConsoleError> {
        self.adapter.delete(id).await?;
        Ok(format!("Deleted geofence {}", id))
    }
}

/// Pretty JSON in the backend's wire format.
fn render(geofence: &Geofence) -> Result<String, ConsoleError> {
    Ok(serde_json::to_string_pretty(&GeofenceRecord::from(geofence))?)
}
