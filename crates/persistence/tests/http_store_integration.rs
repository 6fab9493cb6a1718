//! Integration tests for the HTTP geofence store.
//!
//! Each test runs against its own fake backend served in-process.

mod common;

use axum::http::StatusCode;
use common::{circle_geofence, spawn_backend, spawn_store, test_settings, FakeBackend};
use domain::errors::RequestError;
use domain::models::{
    AlertPolicy, DayOfWeek, EditorMode, EditorState, Geofence, GeofenceId, MapCoordinate,
    MapShape, Schedule, ShapeType, TriggerKind,
};
use domain::services::{GeofenceAdapter, GeofenceStore, SaveMode};
use fake::faker::company::en::CompanyName;
use fake::Fake;
use persistence::{BackendSettings, HttpGeofenceStore};
use serde_json::json;

// ============================================================================
// CRUD
// ============================================================================

#[tokio::test]
async fn test_create_assigns_id_and_get_returns_it() {
    let store = spawn_store(FakeBackend::new()).await;
    let name: String = CompanyName().fake();

    let created = store.create(&circle_geofence(&name)).await.unwrap();
    let id = created.id.clone().expect("backend assigns an id");
    assert_eq!(created.name, name);
    assert!(created.created_at.is_some());

    let fetched = store.get(&id).await.unwrap();
    assert_eq!(fetched.geometry, circle_geofence(&name).geometry);
    assert_eq!(fetched.assigned_vehicle_ids, created.assigned_vehicle_ids);
}

#[tokio::test]
async fn test_wrapped_responses_are_unwrapped() {
    let store = spawn_store(FakeBackend::wrapped()).await;

    let created = store.create(&circle_geofence("Depot")).await.unwrap();
    let listed = store.list().await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
}

#[tokio::test]
async fn test_update_replaces_record() {
    let store = spawn_store(FakeBackend::new()).await;
    let created = store.create(&circle_geofence("Depot")).await.unwrap();
    let id = created.id.clone().unwrap();

    let mut changed = created.clone();
    changed.name = "Depot North".to_string();
    changed.geometry = MapShape::rectangle_from_corners(
        MapCoordinate::new(52.0, 4.0),
        MapCoordinate::new(52.1, 4.2),
    )
    .to_geometry();

    let updated = store.update(&id, &changed).await.unwrap();
    assert_eq!(updated.name, "Depot North");
    assert_eq!(updated.shape_type(), ShapeType::Rectangle);
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let store = spawn_store(FakeBackend::new()).await;
    let created = store.create(&circle_geofence("Depot")).await.unwrap();
    let id = created.id.unwrap();

    store.delete(&id).await.unwrap();
    assert_eq!(
        store.get(&id).await.unwrap_err(),
        RequestError::NotFound(id.clone())
    );
    assert!(matches!(
        store.delete(&id).await,
        Err(RequestError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_skips_malformed_records() {
    let backend = FakeBackend::new();
    backend
        .insert_raw(
            "broken",
            json!({
                "_id": "broken",
                "name": "No radius",
                "type": "circle",
                "geometry": { "center": { "type": "Point", "coordinates": [4.0, 52.0] } },
                "alertType": { "entry": true, "exit": true, "dwell": false }
            }),
        )
        .await;
    let store = spawn_store(backend).await;
    store.create(&circle_geofence("Valid")).await.unwrap();

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Valid");
}

#[tokio::test]
async fn test_list_skips_records_that_do_not_parse() {
    let backend = FakeBackend::wrapped();
    backend
        .insert_raw(
            "bad-day",
            json!({
                "_id": "bad-day",
                "name": "Sunday is seven",
                "type": "circle",
                "geometry": {
                    "center": { "type": "Point", "coordinates": [4.0, 52.0] },
                    "radius": 200.0
                },
                "alertType": { "entry": true, "exit": true, "dwell": false },
                "schedule": { "active": true, "daysOfWeek": [7] }
            }),
        )
        .await;
    backend
        .insert_raw(
            "bad-type",
            json!({
                "_id": "bad-type",
                "name": "Hexagon",
                "type": "hexagon",
                "geometry": {},
                "alertType": { "entry": true, "exit": false, "dwell": false }
            }),
        )
        .await;
    let store = spawn_store(backend).await;
    store.create(&circle_geofence("Valid")).await.unwrap();

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Valid");
}

#[tokio::test]
async fn test_get_reports_field_level_decode_error() {
    let backend = FakeBackend::new();
    backend
        .insert_raw(
            "bad-type",
            json!({
                "_id": "bad-type",
                "name": "Hexagon",
                "type": "hexagon",
                "geometry": {},
                "alertType": { "entry": true, "exit": false, "dwell": false }
            }),
        )
        .await;
    let store = spawn_store(backend).await;

    let err = store.get(&GeofenceId::new("bad-type")).await.unwrap_err();
    let RequestError::Decode(message) = err else {
        panic!("expected decode error, got {:?}", err);
    };
    assert!(message.contains("hexagon"), "{}", message);
}

#[tokio::test]
async fn test_ids_with_reserved_characters_stay_one_segment() {
    let backend = FakeBackend::new();
    let store = spawn_store(backend.clone()).await;
    let created = store.create(&circle_geofence("Depot")).await.unwrap();

    let mut record = backend.records.lock().await.values().next().cloned().unwrap();
    record["_id"] = json!("depot/north?v=2");
    backend.insert_raw("depot/north?v=2", record).await;

    let id = GeofenceId::new("depot/north?v=2");
    let fetched = store.get(&id).await.unwrap();
    assert_eq!(fetched.id, Some(id.clone()));
    assert_eq!(fetched.geometry, created.geometry);

    store.delete(&id).await.unwrap();
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_malformed_record_is_decode_error() {
    let backend = FakeBackend::new();
    backend
        .insert_raw(
            "broken",
            json!({
                "_id": "broken",
                "name": "No ring",
                "type": "polygon",
                "geometry": {},
                "alertType": { "entry": true, "exit": false, "dwell": false }
            }),
        )
        .await;
    let store = spawn_store(backend).await;

    let err = store.get(&GeofenceId::new("broken")).await.unwrap_err();
    assert!(matches!(err, RequestError::Decode(_)));
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_backend_message_is_surfaced_verbatim() {
    let store = spawn_store(FakeBackend::rejecting(
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "message": "A geofence with this name already exists" }),
    ))
    .await;

    let err = store.create(&circle_geofence("Depot")).await.unwrap_err();
    assert_eq!(err.to_string(), "A geofence with this name already exists");
    assert!(matches!(err, RequestError::Status { status: 422, .. }));
}

#[tokio::test]
async fn test_backend_error_field_is_used() {
    let store = spawn_store(FakeBackend::rejecting(
        StatusCode::FORBIDDEN,
        json!({ "error": "Not authorized to manage geofences" }),
    ))
    .await;

    let err = store.list().await.unwrap_err();
    assert_eq!(err.to_string(), "Not authorized to manage geofences");
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store =
        HttpGeofenceStore::new(test_settings(&format!("http://{}/api", addr))).unwrap();
    let err = store.list().await.unwrap_err();
    assert!(matches!(err, RequestError::Transport(_)));
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let backend = FakeBackend::new();
    let seen = backend.seen_authorization.clone();
    let base_url = spawn_backend(backend).await;

    let store = HttpGeofenceStore::new(BackendSettings {
        api_token: Some("fleet-token".to_string()),
        ..test_settings(&base_url)
    })
    .unwrap();
    store.list().await.unwrap();

    assert_eq!(
        seen.lock().await.as_slice(),
        &[Some("Bearer fleet-token".to_string())]
    );
}

// ============================================================================
// Adapter round trip
// ============================================================================

fn polygon_editor_state() -> EditorState {
    let mut state = EditorState::new(ShapeType::Polygon);
    state.name = "Harbor".to_string();
    state.shape = Some(MapShape::Polygon {
        points: vec![
            MapCoordinate::new(51.90, 4.40),
            MapCoordinate::new(51.92, 4.45),
            MapCoordinate::new(51.88, 4.50),
        ],
    });
    state
        .alert_config
        .set_trigger(TriggerKind::Dwell, true, &AlertPolicy::default());
    state.schedule = Schedule::window(
        [DayOfWeek::SATURDAY, DayOfWeek::SUNDAY].into_iter().collect(),
        chrono::NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        chrono::NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
    );
    state
}

#[tokio::test]
async fn test_save_load_resave_over_http() {
    let adapter = GeofenceAdapter::new(spawn_store(FakeBackend::new()).await);

    let original: Geofence = adapter.to_persistable(&polygon_editor_state()).unwrap();
    let saved = adapter.save(&original, SaveMode::Create).await.unwrap();
    let id = saved.id.clone().unwrap();

    let loaded = adapter.load(&id).await.unwrap();
    assert_eq!(loaded.mode, EditorMode::Edit);
    assert_eq!(
        loaded.polygon_points(),
        polygon_editor_state().polygon_points()
    );

    let resaved = adapter
        .save(
            &adapter.to_persistable(&loaded).unwrap(),
            SaveMode::from(loaded.mode),
        )
        .await
        .unwrap();

    assert_eq!(resaved.id, Some(id));
    assert_eq!(resaved.geometry, original.geometry);
    assert_eq!(resaved.alert_config, original.alert_config);
    assert_eq!(resaved.schedule, original.schedule);
    assert_eq!(adapter.list().await.unwrap().len(), 1);
}
