//! Common test utilities for integration tests.
//!
//! Serves an in-process fake of the fleet backend's geofence routes with
//! `axum` on an ephemeral port.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use domain::models::{
    AlertConfig, Geofence, GeofenceStatus, MapCoordinate, MapShape, NotificationConfig, Schedule,
    VehicleId,
};
use persistence::{BackendSettings, HttpGeofenceStore};

type Reply = (StatusCode, Json<Value>);

/// Fake backend state shared by all handlers.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub records: Arc<Mutex<BTreeMap<String, Value>>>,
    /// Wrap successful payloads as `{ "data": ... }`.
    pub wrap_responses: bool,
    /// When set, every request is answered with this status and body.
    pub reject_with: Option<(StatusCode, Value)>,
    /// `Authorization` header of every request received.
    pub seen_authorization: Arc<Mutex<Vec<Option<String>>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wrapped() -> Self {
        Self {
            wrap_responses: true,
            ..Self::default()
        }
    }

    pub fn rejecting(status: StatusCode, body: Value) -> Self {
        Self {
            reject_with: Some((status, body)),
            ..Self::default()
        }
    }

    /// Inserts a raw document, bypassing the routes.
    pub async fn insert_raw(&self, id: &str, document: Value) {
        self.records.lock().await.insert(id.to_string(), document);
    }

    async fn before(&self, headers: &HeaderMap) -> Option<Reply> {
        let auth = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen_authorization.lock().await.push(auth);

        self.reject_with
            .as_ref()
            .map(|(status, body)| (*status, Json(body.clone())))
    }

    fn ok(&self, status: StatusCode, payload: Value) -> Reply {
        if self.wrap_responses {
            (status, Json(json!({ "data": payload })))
        } else {
            (status, Json(payload))
        }
    }
}

fn not_found() -> Reply {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Geofence not found" })),
    )
}

async fn list_geofences(State(backend): State<FakeBackend>, headers: HeaderMap) -> Reply {
    if let Some(reply) = backend.before(&headers).await {
        return reply;
    }
    let records: Vec<Value> = backend.records.lock().await.values().cloned().collect();
    backend.ok(StatusCode::OK, Value::Array(records))
}

async fn create_geofence(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Reply {
    if let Some(reply) = backend.before(&headers).await {
        return reply;
    }
    let id = uuid::Uuid::new_v4().simple().to_string();
    let now = Utc::now().to_rfc3339();
    body["_id"] = json!(id);
    body["createdAt"] = json!(now);
    body["updatedAt"] = json!(now);
    body["__v"] = json!(0);

    backend.records.lock().await.insert(id, body.clone());
    backend.ok(StatusCode::CREATED, body)
}

async fn get_geofence(
    State(backend): State<FakeBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Reply {
    if let Some(reply) = backend.before(&headers).await {
        return reply;
    }
    match backend.records.lock().await.get(&id) {
        Some(record) => backend.ok(StatusCode::OK, record.clone()),
        None => not_found(),
    }
}

async fn update_geofence(
    State(backend): State<FakeBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Reply {
    if let Some(reply) = backend.before(&headers).await {
        return reply;
    }
    let mut records = backend.records.lock().await;
    let Some(existing) = records.get(&id) else {
        return not_found();
    };

    body["_id"] = json!(id);
    body["createdAt"] = existing["createdAt"].clone();
    body["updatedAt"] = json!(Utc::now().to_rfc3339());
    records.insert(id, body.clone());
    drop(records);

    backend.ok(StatusCode::OK, body)
}

async fn delete_geofence(
    State(backend): State<FakeBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Reply {
    if let Some(reply) = backend.before(&headers).await {
        return reply;
    }
    match backend.records.lock().await.remove(&id) {
        Some(_) => (
            StatusCode::OK,
            Json(json!({ "message": "Geofence deleted" })),
        ),
        None => not_found(),
    }
}

/// Starts the fake backend and returns its API base URL.
pub async fn spawn_backend(backend: FakeBackend) -> String {
    let app = Router::new()
        .route("/api/geofences", get(list_geofences).post(create_geofence))
        .route(
            "/api/geofences/:id",
            get(get_geofence)
                .put(update_geofence)
                .delete(delete_geofence),
        )
        .with_state(backend);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake backend");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Fake backend failed");
    });

    format!("http://{}/api", addr)
}

/// Settings pointing at `base_url` with a short timeout.
pub fn test_settings(base_url: &str) -> BackendSettings {
    BackendSettings {
        timeout: Duration::from_secs(5),
        ..BackendSettings::new(base_url)
    }
}

pub async fn spawn_store(backend: FakeBackend) -> HttpGeofenceStore {
    let base_url = spawn_backend(backend).await;
    HttpGeofenceStore::new(test_settings(&base_url)).expect("Failed to build store")
}

/// A valid circle geofence with no id.
pub fn circle_geofence(name: &str) -> Geofence {
    Geofence {
        id: None,
        name: name.to_string(),
        description: Some("Main depot".to_string()),
        geometry: MapShape::Circle {
            center: MapCoordinate::new(52.37, 4.89),
            radius_meters: 350.0,
        }
        .to_geometry(),
        alert_config: AlertConfig::default(),
        schedule: Schedule::always_on(),
        notifications: NotificationConfig::default(),
        assigned_vehicle_ids: [VehicleId::new("van-1")].into_iter().collect(),
        status: GeofenceStatus::Active,
        created_at: None,
        updated_at: None,
    }
}
