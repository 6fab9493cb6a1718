//! Editor scripts: recorded editor sessions replayed by the console.
//!
//! ```json
//! {
//!   "load": "65a1f0c2e4b0a1b2c3d4e5f6",
//!   "actions": [
//!     { "action": "startDrawing" },
//!     { "action": "click", "lat": 52.37, "lng": 4.89 },
//!     { "action": "setRadius", "meters": 750 }
//!   ]
//! }
//! ```
//!
//! A bare JSON array of actions is accepted as a create-mode script.

use std::path::Path;

use serde::Deserialize;

use domain::models::{GeofenceId, ShapeType};
use domain::services::EditorAction;

use crate::error::ConsoleError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EditorScript {
    /// Existing geofence to edit; a new one is created when absent.
    #[serde(default)]
    pub load: Option<GeofenceId>,
    /// Initial shape type of a new geofence.
    #[serde(default)]
    pub shape: Option<ShapeType>,
    pub actions: Vec<EditorAction>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptFile {
    Full(EditorScript),
    Actions(Vec<EditorAction>),
}

impl EditorScript {
    pub fn from_json(json: &str) -> Result<Self, ConsoleError> {
        let script = match serde_json::from_str::<ScriptFile>(json) {
            Ok(ScriptFile::Full(script)) => script,
            Ok(ScriptFile::Actions(actions)) => EditorScript {
                load: None,
                shape: None,
                actions,
            },
            // Re-parse strictly so the error points at the offending field.
            Err(_) => serde_json::from_str::<EditorScript>(json)?,
        };
        Ok(script)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConsoleError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConsoleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn is_edit(&self) -> bool {
        self.load.is_some()
    }
}
