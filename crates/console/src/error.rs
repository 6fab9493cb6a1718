use std::path::PathBuf;

use thiserror::Error;

use domain::errors::{RequestError, ValidationError, ValidationErrors};
use persistence::client::ClientError;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("{0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),

    #[error("Action {step} rejected: {source}")]
    Action {
        step: usize,
        #[source]
        source: ValidationError,
    },

    #[error("Geofence is invalid: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ConsoleError {
    pub fn usage(message: impl Into<String>) -> Self {
        ConsoleError::Usage(message.into())
    }

    /// Field-level detail for validation failures, one `field: message` line each.
    pub fn details(&self) -> Vec<String> {
        match self {
            ConsoleError::Validation(errors) => errors
                .iter()
                .map(|e| format!("{}: {}", e.field(), e))
                .collect(),
            ConsoleError::Action { source, .. } => {
                vec![format!("{}: {}", source.field(), source)]
            }
            _ => Vec::new(),
        }
    }
}
