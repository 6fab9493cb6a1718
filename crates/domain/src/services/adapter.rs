//! Boundary between editor state and the geofence store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::errors::{RequestError, ValidationErrors};
use crate::models::geofence::{EditorMode, EditorState, Geofence, GeofenceId};
use crate::services::store::GeofenceStore;
use crate::services::validation::to_persistable_geofence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Create,
    Update,
}

impl From<EditorMode> for SaveMode {
    fn from(mode: EditorMode) -> Self {
        match mode {
            EditorMode::Create => SaveMode::Create,
            EditorMode::Edit => SaveMode::Update,
        }
    }
}

/// Validates, saves and loads geofences through a [`GeofenceStore`].
///
/// Saves are single attempts. Each save takes a monotonically increasing
/// token, tracked per geofence id (all creates share one slot). When a newer
/// save of the same geofence has been issued by the time a response arrives,
/// the older response is reported as [`RequestError::Superseded`] instead of
/// being handed back. Saves of different geofences never supersede each other.
pub struct GeofenceAdapter<S> {
    store: S,
    next_token: AtomicU64,
    latest_save: Mutex<HashMap<Option<GeofenceId>, u64>>,
}

impl<S: GeofenceStore> GeofenceAdapter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            next_token: AtomicU64::new(1),
            latest_save: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// See [`to_persistable_geofence`].
    pub fn to_persistable(&self, state: &EditorState) -> Result<Geofence, ValidationErrors> {
        to_persistable_geofence(state)
    }

    pub async fn save(&self, geofence: &Geofence, mode: SaveMode) -> Result<Geofence, RequestError> {
        let key = match mode {
            SaveMode::Create => None,
            SaveMode::Update => geofence.id.clone(),
        };
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        self.latest_save.lock().await.insert(key.clone(), token);

        let result = match mode {
            SaveMode::Create => self.store.create(geofence).await,
            SaveMode::Update => match &geofence.id {
                Some(id) => self.store.update(id, geofence).await,
                None => Err(RequestError::MissingId),
            },
        };

        {
            // A missing entry means a newer save of this key already finished.
            let mut latest_save = self.latest_save.lock().await;
            let latest = latest_save.get(&key).copied();
            if latest != Some(token) {
                warn!(
                    geofence_id = ?key,
                    token,
                    ?latest,
                    "Discarding response of superseded save"
                );
                return Err(RequestError::Superseded);
            }
            latest_save.remove(&key);
        }

        match &result {
            Ok(saved) => info!(
                geofence_id = ?saved.id,
                shape_type = %saved.shape_type(),
                mode = ?mode,
                "Geofence saved"
            ),
            Err(e) => warn!(error = %e, mode = ?mode, "Geofence save failed"),
        }
        result
    }

    /// Fetches a stored geofence as edit-mode editor state.
    pub async fn load(&self, id: &GeofenceId) -> Result<EditorState, RequestError> {
        let geofence = self.store.get(id).await?;
        info!(geofence_id = %id, shape_type = %geofence.shape_type(), "Geofence loaded");
        Ok(EditorState::from_geofence(&geofence))
    }

    pub async fn list(&self) -> Result<Vec<Geofence>, RequestError> {
        self.store.list().await
    }

    pub async fn delete(&self, id: &GeofenceId) -> Result<(), RequestError> {
        self.store.delete(id).await?;
        info!(geofence_id = %id, "Geofence deleted");
        Ok(())
    }
}
