//! HTTP client management for the geofence backend.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;

/// Backend connection settings.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// API root, e.g. `https://fleet.example.com/api`.
    pub base_url: String,
    pub timeout: Duration,
    /// Sent as a bearer token when present.
    pub api_token: Option<String>,
}

impl BackendSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
            api_token: None,
        }
    }

    /// Joins `path` onto the base URL with exactly one slash between them.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("API token contains characters not allowed in a header")]
    InvalidToken,

    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Creates an HTTP client with the given settings.
pub fn create_client(settings: &BackendSettings) -> Result<Client, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(token) = &settings.api_token {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ClientError::InvalidToken)?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(Client::builder()
        .timeout(settings.timeout)
        .default_headers(headers)
        .build()?)
}
