//! Geofence data-access abstraction.
//!
//! The console talks to the backend through [`GeofenceStore`]; the HTTP
//! implementation lives in the persistence crate. [`InMemoryGeofenceStore`]
//! backs tests and offline development.

use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::RequestError;
use crate::models::geofence::{Geofence, GeofenceId};

/// Typed CRUD over stored geofences.
#[async_trait::async_trait]
pub trait GeofenceStore: Send + Sync {
    /// Creates a geofence and returns the stored record with its assigned id.
    async fn create(&self, geofence: &Geofence) -> Result<Geofence, RequestError>;

    /// Replaces the geofence with the given id and returns the stored record.
    async fn update(&self, id: &GeofenceId, geofence: &Geofence)
        -> Result<Geofence, RequestError>;

    async fn get(&self, id: &GeofenceId) -> Result<Geofence, RequestError>;

    async fn list(&self) -> Result<Vec<Geofence>, RequestError>;

    async fn delete(&self, id: &GeofenceId) -> Result<(), RequestError>;
}

/// Store that keeps geofences in memory.
///
/// Assigns UUID ids and timestamps the way the backend does.
#[derive(Debug, Default)]
pub struct InMemoryGeofenceStore {
    records: RwLock<BTreeMap<GeofenceId, Geofence>>,
    /// When set, every call fails with this message.
    failure: Option<String>,
}

impl InMemoryGeofenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose every request fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            failure: Some(message.into()),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_failure(&self) -> Result<(), RequestError> {
        match &self.failure {
            Some(message) => {
                tracing::warn!(message = %message, "In-memory store simulating failure");
                Err(RequestError::Status {
                    status: 500,
                    message: message.clone(),
                })
            }
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl GeofenceStore for InMemoryGeofenceStore {
    async fn create(&self, geofence: &Geofence) -> Result<Geofence, RequestError> {
        self.check_failure()?;

        let now = Utc::now();
        let id = GeofenceId::new(Uuid::new_v4().to_string());
        let stored = Geofence {
            id: Some(id.clone()),
            created_at: Some(now),
            updated_at: Some(now),
            ..geofence.clone()
        };

        self.records.write().await.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: &GeofenceId,
        geofence: &Geofence,
    ) -> Result<Geofence, RequestError> {
        self.check_failure()?;

        let mut records = self.records.write().await;
        let existing = records
            .get(id)
            .ok_or_else(|| RequestError::NotFound(id.clone()))?;

        let stored = Geofence {
            id: Some(id.clone()),
            created_at: existing.created_at,
            updated_at: Some(Utc::now()),
            ..geofence.clone()
        };
        records.insert(id.clone(), stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: &GeofenceId) -> Result<Geofence, RequestError> {
        self.check_failure()?;
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RequestError::NotFound(id.clone()))
    }

    async fn list(&self) -> Result<Vec<Geofence>, RequestError> {
        self.check_failure()?;
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn delete(&self, id: &GeofenceId) -> Result<(), RequestError> {
        self.check_failure()?;
        self.records
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RequestError::NotFound(id.clone()))
    }
}
