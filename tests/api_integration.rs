//! HTTP routes exercised through the router without a listener

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use station_telemetry_service::server::create_app;

fn app() -> Router {
    create_app(common::test_state())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, location, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_plain_get_on_ws_is_rejected() {
    let response = app().oneshot(get("/ws")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_reports_backend_and_connections() {
    let app = app();
    let (status, _, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["connections"], 0);
    assert_eq!(body["stations_backend"], "memory");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_stats_on_empty_registry() {
    let app = app();
    let (status, _, body) = send(&app, get("/stats")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_connections"], 0);
    assert_eq!(body["open"], 0);
    assert_eq!(body["closing"], 0);
}

#[tokio::test]
async fn test_metrics_endpoint_serves_text() {
    let response = app().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("station_ws_connections_active"));
}

#[tokio::test]
async fn test_station_crud_flow() {
    let app = app();

    let (status, _, body) = send(&app, get("/api/station")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    // Create: status defaults, body id ignored
    let (status, location, created) = send(
        &app,
        with_json(
            "POST",
            "/api/station",
            json!({"id": 77, "name": "North", "location": "Hill 3"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    assert_ne!(id, 77);
    assert_eq!(location.as_deref(), Some(format!("/api/station/{}", id).as_str()));
    assert_eq!(created["status"], "Active");

    let (status, _, fetched) = send(&app, get(&format!("/api/station/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    // Update
    let (status, _, _) = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/station/{}", id),
            json!({"id": id, "name": "North", "location": "Hill 4", "status": "Offline"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, _, fetched) = send(&app, get(&format!("/api/station/{}", id))).await;
    assert_eq!(fetched["location"], "Hill 4");
    assert_eq!(fetched["status"], "Offline");

    let (_, _, list) = send(&app, get("/api/station")).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    // Delete
    let (status, _, _) = send(&app, delete(&format!("/api/station/{}", id))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, body) = send(&app, get(&format!("/api/station/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_create_requires_name_and_location() {
    let app = app();

    let (status, _, body) = send(
        &app,
        with_json("POST", "/api/station", json!({"name": "North", "location": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, _, list) = send(&app, get("/api/station")).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_update_with_mismatched_id() {
    let app = app();
    let (_, _, created) = send(
        &app,
        with_json("POST", "/api/station", json!({"name": "North", "location": "Hill 3"})),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, _, body) = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/station/{}", id),
            json!({"id": id + 1, "name": "North", "location": "Hill 3"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Unchanged
    let (_, _, fetched) = send(&app, get(&format!("/api/station/{}", id))).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_missing_station_operations() {
    let app = app();

    let (status, _, _) = send(&app, get("/api/station/404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(
        &app,
        with_json(
            "PUT",
            "/api/station/404",
            json!({"name": "Ghost", "location": "Nowhere"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, delete("/api/station/404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
