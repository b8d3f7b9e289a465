use std::sync::Arc;

use super::*;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{StudioRecord, WorkshopPayload},
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct BackendState {
    requests: Arc<Mutex<Vec<String>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
    uploads: Arc<Mutex<Vec<(String, Option<String>, Vec<u8>)>>>,
}

#[derive(Deserialize)]
struct LocationQuery {
    #[serde(rename = "creatorEmail")]
    creator_email: String,
}

async fn create_workshop(State(state): State<BackendState>, Json(body): Json<Value>) -> Json<Value> {
    state.requests.lock().await.push("create_workshop".into());
    state.bodies.lock().await.push(body);
    Json(json!({ "workshop_id": "W123" }))
}

async fn create_studio_garbled(State(state): State<BackendState>) -> &'static str {
    state.requests.lock().await.push("create_studio".into());
    "<html>gateway timeout</html>"
}

async fn update_studio(
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.requests.lock().await.push(format!("update_studio {id}"));
    state.bodies.lock().await.push(body);
    Json(json!({ "ok": true }))
}

async fn upload_icon(State(state): State<BackendState>, mut multipart: Multipart) -> Json<Value> {
    let mut results = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        if name == "images" {
            results.push(json!({
                "filename": filename.clone(),
                "url": format!("https://cdn.example.com/{}", filename.clone().unwrap_or_default()),
            }));
        }
        state.uploads.lock().await.push((name, filename, bytes));
    }
    Json(json!({ "results": results }))
}

async fn delete_photo(
    State(state): State<BackendState>,
    Path((owner, filename)): Path<(String, String)>,
) -> (StatusCode, Json<Value>) {
    state
        .requests
        .lock()
        .await
        .push(format!("delete {owner} {filename}"));
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "storage unavailable" })),
    )
}

async fn list_photos(Path(owner): Path<String>) -> Json<Value> {
    Json(json!({
        "image_urls": [format!("https://cdn.example.com/studioImage%2F{owner}%2Fp0.jpg")]
    }))
}

async fn missing_logo() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn list_locations(Query(query): Query<LocationQuery>) -> Json<Value> {
    Json(json!({
        "data": [{
            "id": "S42",
            "studioName": "Rhythm House",
            "buildingName": "Sunrise Towers",
            "street": "MG Road",
            "city": "Pune",
            "mapAddress": query.creator_email,
            "geolocation": { "lat": 18.52, "lng": 73.85 }
        }]
    }))
}

async fn user_by_email(
    State(state): State<BackendState>,
    Path(email): Path<String>,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().await.push(format!("user {email}"));
    match email.as_str() {
        "guru+dance@example.com" => (
            StatusCode::OK,
            Json(json!({ "data": { "Name": "Asha", "isCreator": true } })),
        ),
        "ghost@example.com" => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "user not found" })),
        ),
        _ => (StatusCode::OK, Json(json!({ "data": {} }))),
    }
}

async fn spawn_backend() -> std::io::Result<(String, BackendState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = BackendState::default();
    let app = Router::new()
        .route("/api/crud/create_workshop/", post(create_workshop))
        .route("/api/crud/create_studio/", post(create_studio_garbled))
        .route("/api/crud/update_studio/:id", put(update_studio))
        .route("/api/imagesCrud/workshopIcon/", post(upload_icon))
        .route(
            "/api/imagesCrud/studioImage/:owner/:filename/",
            delete(delete_photo),
        )
        .route("/api/imagesCrud/studioImage/:owner/", get(list_photos))
        .route("/api/imagesCrud/studioIcon/:owner/", get(missing_logo))
        .route("/api/crud/listStudiosWithFilters/", get(list_locations))
        .route("/api/crud/getUserDataByEmail/:email", get(user_by_email))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/api"), state))
}

fn gateway(base_url: &str) -> HttpBackendGateway {
    HttpBackendGateway::new(base_url, Duration::from_secs(5)).expect("gateway")
}

#[test]
fn base_url_is_normalized_with_trailing_slash() {
    let gateway = gateway("https://admin.example.com/api");
    assert_eq!(gateway.base_url().as_str(), "https://admin.example.com/api/");
    assert!(HttpBackendGateway::new("not a url", Duration::from_secs(1)).is_err());
}

#[tokio::test]
async fn create_posts_payload_and_returns_backend_id() {
    let (base_url, state) = spawn_backend().await.expect("spawn backend");
    let payload = EntityPayload::Workshop(WorkshopPayload::default());

    let id = gateway(&base_url)
        .create_entity(&payload)
        .await
        .expect("create");

    assert_eq!(id, EntityId::new("W123"));
    let bodies = state.bodies.lock().await;
    assert!(bodies[0].get("workshop").is_some());
    assert!(bodies[0].get("variants").is_some());
}

#[tokio::test]
async fn update_puts_to_record_path() {
    let (base_url, state) = spawn_backend().await.expect("spawn backend");
    let payload = EntityPayload::Studio(StudioRecord {
        studio_name: "Rhythm House".into(),
        ..StudioRecord::default()
    });

    gateway(&base_url)
        .update_entity(&EntityId::new("S1"), &payload)
        .await
        .expect("update");

    assert_eq!(
        state.requests.lock().await.as_slice(),
        ["update_studio S1".to_string()]
    );
    assert_eq!(state.bodies.lock().await[0]["studioName"], "Rhythm House");
}

#[tokio::test]
async fn upload_sends_images_parts_and_owner_id() {
    let (base_url, state) = spawn_backend().await.expect("spawn backend");
    let files = vec![LocalFile::new("icon.jpg", "image/jpeg", vec![1, 2, 3])];

    let results = gateway(&base_url)
        .upload_media(MediaCategory::WorkshopIcon, &EntityId::new("W123"), &files)
        .await
        .expect("upload");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].filename.as_deref(), Some("icon.jpg"));
    let uploads = state.uploads.lock().await;
    assert!(uploads.contains(&("entity_id".to_string(), None, b"W123".to_vec())));
    assert!(uploads.contains(&(
        "images".to_string(),
        Some("icon.jpg".to_string()),
        vec![1, 2, 3]
    )));
}

#[tokio::test]
async fn delete_failure_carries_backend_error_text() {
    let (base_url, state) = spawn_backend().await.expect("spawn backend");

    let err = gateway(&base_url)
        .delete_media(MediaCategory::StudioPhotos, &EntityId::new("S1"), "hall one.jpg")
        .await
        .expect_err("delete fails");

    assert_eq!(
        err,
        GatewayError::Api(ApiError {
            code: ErrorCode::Internal,
            status: 500,
            message: "storage unavailable".into(),
        })
    );
    assert_eq!(
        state.requests.lock().await.as_slice(),
        ["delete S1 hall one.jpg".to_string()]
    );
}

#[tokio::test]
async fn fetch_existing_lists_remote_refs() {
    let (base_url, _state) = spawn_backend().await.expect("spawn backend");
    let gateway = gateway(&base_url);

    let refs = gateway
        .fetch_existing(MediaCategory::StudioPhotos, &EntityId::new("S1"))
        .await
        .expect("photos");
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].filename(), "p0.jpg");

    let err = gateway
        .fetch_existing(MediaCategory::StudioLogo, &EntityId::new("S1"))
        .await
        .expect_err("missing");
    assert!(matches!(
        err,
        GatewayError::Api(ApiError {
            code: ErrorCode::NotFound,
            status: 404,
            ..
        })
    ));
}

#[tokio::test]
async fn list_locations_sends_creator_email_query() {
    let (base_url, _state) = spawn_backend().await.expect("spawn backend");

    let locations = gateway(&base_url)
        .list_locations("guru+dance@example.com")
        .await
        .expect("locations");

    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].studio_name, "Rhythm House");
    assert_eq!(locations[0].map_address, "guru+dance@example.com");
}

#[tokio::test]
async fn creator_lookup_reads_user_data() {
    let (base_url, state) = spawn_backend().await.expect("spawn backend");
    let gateway = gateway(&base_url);

    assert!(gateway
        .creator_exists("guru+dance@example.com")
        .await
        .expect("known"));
    assert!(!gateway
        .creator_exists("new@example.com")
        .await
        .expect("empty data"));
    assert!(!gateway
        .creator_exists("ghost@example.com")
        .await
        .expect("not found"));
    assert_eq!(
        state.requests.lock().await.first().map(String::as_str),
        Some("user guru+dance@example.com")
    );
}

#[tokio::test]
async fn unreadable_body_is_a_decode_error() {
    let (base_url, _state) = spawn_backend().await.expect("spawn backend");
    let payload = EntityPayload::Studio(StudioRecord::default());

    let err = gateway(&base_url)
        .create_entity(&payload)
        .await
        .expect_err("garbled body");
    assert!(matches!(err, GatewayError::Decode(_)));
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = gateway(&format!("http://{addr}"))
        .delete_media(MediaCategory::StudioPhotos, &EntityId::new("S1"), "p0.jpg")
        .await
        .expect_err("refused");
    assert!(matches!(err, GatewayError::Transport(_)));
}
