//! HTTP-backed geofence store.

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use domain::errors::RequestError;
use domain::models::{Geofence, GeofenceId};
use domain::services::GeofenceStore;

use crate::client::{create_client, BackendSettings, ClientError};
use crate::entities::{decode_envelope, ErrorBody, GeofenceRecord};
use crate::metrics::{record_request_error, RequestTimer};

/// Store for geofences kept by the fleet backend's REST API.
#[derive(Clone)]
pub struct HttpGeofenceStore {
    client: Client,
    settings: BackendSettings,
}

impl HttpGeofenceStore {
    /// Creates a store with its own HTTP client.
    pub fn new(settings: BackendSettings) -> Result<Self, ClientError> {
        let client = create_client(&settings)?;
        Ok(Self::with_client(client, settings))
    }

    /// Creates a store that shares an existing HTTP client.
    pub fn with_client(client: Client, settings: BackendSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    fn collection_url(&self) -> String {
        self.settings.url("geofences")
    }

    /// Collection URL with the id appended as one percent-encoded segment.
    fn item_url(&self, id: &GeofenceId) -> Result<Url, RequestError> {
        let invalid = || {
            RequestError::Transport(format!("Invalid backend URL: {}", self.settings.base_url))
        };
        let mut url = Url::parse(&self.collection_url()).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .push(id.as_str());
        Ok(url)
    }

    /// Sends one request and checks its status. A 404 on an item route maps to
    /// [`RequestError::NotFound`]; other failures carry the backend's message.
    async fn execute(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        id: Option<&GeofenceId>,
    ) -> Result<Response, RequestError> {
        let timer = RequestTimer::new(operation);
        let result = request.send().await;
        timer.record();

        let response = result.map_err(|e| {
            record_request_error(operation, "transport");
            warn!(operation, error = %e, "Backend request failed");
            RequestError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(operation, status = status.as_u16(), "Backend request succeeded");
            return Ok(response);
        }

        record_request_error(operation, "status");
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(RequestError::NotFound(id.clone()));
            }
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!(operation, status = status.as_u16(), message = %message, "Backend rejected request");
        Err(RequestError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(
        operation: &'static str,
        response: Response,
    ) -> Result<T, RequestError> {
        let body = response.bytes().await.map_err(|e| {
            record_request_error(operation, "transport");
            RequestError::Transport(e.to_string())
        })?;

        decode_envelope::<T>(&body).map_err(|e| {
            record_request_error(operation, "decode");
            warn!(operation, error = %e, "Undecodable backend response");
            RequestError::Decode(e.to_string())
        })
    }

    async fn fetch_one(
        operation: &'static str,
        response: Response,
    ) -> Result<Geofence, RequestError> {
        let record: GeofenceRecord = Self::decode(operation, response).await?;
        Geofence::try_from(record).map_err(|e| {
            record_request_error(operation, "decode");
            RequestError::Decode(e.to_string())
        })
    }
}

/// Decodes one entry of a list response; entries that fail as JSON or as a
/// geofence are logged and skipped.
fn list_entry(entry: Value) -> Option<Geofence> {
    let id = entry.get("_id").and_then(Value::as_str).map(str::to_string);
    let decoded = serde_json::from_value::<GeofenceRecord>(entry)
        .map_err(|e| e.to_string())
        .and_then(|record| Geofence::try_from(record).map_err(|e| e.to_string()));

    match decoded {
        Ok(geofence) => Some(geofence),
        Err(error) => {
            record_request_error("list_geofences", "decode");
            warn!(geofence_id = ?id, error = %error, "Skipping malformed geofence");
            None
        }
    }
}

/// Message shown for a failed request: the backend's `message` or `error`
/// field, else the raw body, else the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .or_else(|| {
            let text = body.trim();
            (!text.is_empty() && !text.starts_with('{')).then(|| text.to_string())
        })
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}

#[async_trait::async_trait]
impl GeofenceStore for HttpGeofenceStore {
    async fn create(&self, geofence: &Geofence) -> Result<Geofence, RequestError> {
        let record = GeofenceRecord {
            id: None,
            ..GeofenceRecord::from(geofence)
        };
        let request = self.client.post(self.collection_url()).json(&record);
        let response = self.execute("create_geofence", request, None).await?;
        Self::fetch_one("create_geofence", response).await
    }

    async fn update(
        &self,
        id: &GeofenceId,
        geofence: &Geofence,
    ) -> Result<Geofence, RequestError> {
        let record = GeofenceRecord::from(geofence);
        let request = self.client.put(self.item_url(id)?).json(&record);
        let response = self.execute("update_geofence", request, Some(id)).await?;
        Self::fetch_one("update_geofence", response).await
    }

    async fn get(&self, id: &GeofenceId) -> Result<Geofence, RequestError> {
        let request = self.client.get(self.item_url(id)?);
        let response = self.execute("get_geofence", request, Some(id)).await?;
        Self::fetch_one("get_geofence", response).await
    }

    async fn list(&self) -> Result<Vec<Geofence>, RequestError> {
        let request = self.client.get(self.collection_url());
        let response = self.execute("list_geofences", request, None).await?;
        let entries: Vec<Value> = Self::decode("list_geofences", response).await?;

        Ok(entries.into_iter().filter_map(list_entry).collect())
    }

    async fn delete(&self, id: &GeofenceId) -> Result<(), RequestError> {
        let request = self.client.delete(self.item_url(id)?);
        self.execute("delete_geofence", request, Some(id)).await?;
        Ok(())
    }
}
