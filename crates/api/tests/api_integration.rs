//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use fulfillment::Settings;
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::InMemoryRecordStore;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let state = api::create_state(InMemoryRecordStore::new(), Settings::default());
    api::create_app(state, get_metrics_handle())
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create_order(app: &axum::Router, items: usize) -> Value {
    let items: Vec<Value> = (0..items).map(|_| json!({})).collect();
    let (status, order) = send(app, "POST", "/api/orders", Some(json!({ "items": items }))).await;
    assert_eq!(status, StatusCode::CREATED);
    order
}

fn item_ids(order: &Value) -> Vec<String> {
    order["order_items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_create_order_with_items() {
    let app = setup();

    let order = create_order(&app, 2).await;

    assert_eq!(order["status"], "Aufgegeben");
    let items = order["order_items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item["status"] == "Aufgegeben"));
    assert!(items.iter().all(|item| item["order"] == order["id"]));
}

#[tokio::test]
async fn test_create_order_rejects_unknown_stage() {
    let app = setup();

    let (status, json) = send(
        &app,
        "POST",
        "/api/orders",
        Some(json!({ "items": [{ "status": "Kochen" }] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Kochen"));
}

#[tokio::test]
async fn test_create_order_rejects_missing_product() {
    let app = setup();
    let missing = common::RecordId::new();

    let (status, _) = send(
        &app,
        "POST",
        "/api/orders",
        Some(json!({ "items": [{ "product": missing.to_string() }] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_nonexistent_order() {
    let app = setup();
    let fake_id = common::RecordId::new();

    let (status, _) = send(&app, "GET", &format!("/api/orders/{fake_id}"), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_id_is_bad_request() {
    let app = setup();

    let (status, _) = send(&app, "GET", "/api/orders/not-a-uuid", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_item_updates_converge_order() {
    let app = setup();
    let order = create_order(&app, 2).await;
    let order_uri = format!("/api/orders/{}", order["id"].as_str().unwrap());
    let items = item_ids(&order);

    let (status, item) = send(
        &app,
        "PATCH",
        &format!("/api/order-items/{}", items[0]),
        Some(json!({ "status": "InArbeit" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["status"], "InArbeit");

    let (_, current) = send(&app, "GET", &order_uri, None).await;
    assert_eq!(current["status"], "Aufgegeben");

    send(
        &app,
        "PATCH",
        &format!("/api/order-items/{}", items[1]),
        Some(json!({ "status": "InArbeit" })),
    )
    .await;

    let (_, current) = send(&app, "GET", &order_uri, None).await;
    assert_eq!(current["status"], "InArbeit");
}

#[tokio::test]
async fn test_order_update_fans_out() {
    let app = setup();
    let order = create_order(&app, 3).await;
    let order_uri = format!("/api/orders/{}", order["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        "PATCH",
        &order_uri,
        Some(json!({ "status": "Abholbereit" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "Abholbereit");
    let items = updated["order_items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| item["status"] == "Abholbereit"));
}

#[tokio::test]
async fn test_patch_unknown_stage_is_bad_request() {
    let app = setup();
    let order = create_order(&app, 1).await;
    let items = item_ids(&order);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/order-items/{}", items[0]),
        Some(json!({ "status": "Fertig" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_missing_item_is_not_found() {
    let app = setup();

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/order-items/{}", common::RecordId::new()),
        Some(json!({ "status": "InArbeit" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_events_endpoint_filters_by_type() {
    let app = setup();
    let (status, product) = send(
        &app,
        "POST",
        "/api/products",
        Some(json!({ "name": "Pommes" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product["is_available"], true);
    let product_uri = format!("/api/products/{}", product["id"].as_str().unwrap());

    send(&app, "PATCH", &product_uri, Some(json!({ "name": "Pommes frites" }))).await;
    send(&app, "PATCH", &product_uri, Some(json!({ "is_available": false }))).await;
    create_order(&app, 1).await;

    let (status, events) = send(&app, "GET", "/api/events?type=product", None).await;
    assert_eq!(status, StatusCode::OK);

    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e["type"] == "product"));
    assert_eq!(events[0]["content"]["is_available"], true);
    assert_eq!(events[1]["content"]["is_available"], false);
    assert_eq!(events[1]["content"]["product_id"], product["id"]);

    let (_, all) = send(&app, "GET", "/api/events", None).await;
    assert_eq!(all.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_export_json_download() {
    let app = setup();
    let order = create_order(&app, 2).await;

    let request = Request::builder()
        .uri("/api/export-json?start=2000-01-01T00:00:00Z&end=2999-01-01T00:00:00Z")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        r#"attachment; filename="export.json""#
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["orders"][0]["id"], order["id"]);
    assert_eq!(json["orders"][0]["order_items"].as_array().unwrap().len(), 2);
    assert_eq!(json["orders"][0]["events"][0]["type"], "order");
}

#[tokio::test]
async fn test_payment_appears_in_export() {
    let app = setup();
    let order = create_order(&app, 1).await;
    let (status, option) = send(
        &app,
        "POST",
        "/api/payment-options",
        Some(json!({ "name": "Bar" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, payment) = send(
        &app,
        "POST",
        "/api/payments",
        Some(json!({ "payment_option": option["id"], "order": order["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, export) = send(
        &app,
        "GET",
        "/api/export-json?start=2000-01-01T00:00:00Z&end=2999-01-01T00:00:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let exported = &export["payments"][0];
    assert_eq!(exported["id"], payment["id"]);
    assert_eq!(exported["order"], order["id"]);
    assert_eq!(exported["payment_option"]["name"], "Bar");
    assert_eq!(exported["events"][0]["type"], "payment");
}

#[tokio::test]
async fn test_payment_with_unknown_option_is_bad_request() {
    let app = setup();
    let (status, _) = send(
        &app,
        "POST",
        "/api/payments",
        Some(json!({ "payment_option": "6f9619ff-8b86-d011-b42d-00c04fc964ff" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, options) = send(&app, "GET", "/api/payment-options", None).await;
    assert!(options.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_events_accepts_largest_limit() {
    let app = setup();
    create_order(&app, 1).await;

    let (status, events) = send(
        &app,
        "GET",
        "/api/events?limit=18446744073709551615",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_export_json_validates_range() {
    let app = setup();

    let (status, _) = send(&app, "GET", "/api/export-json?start=2024-01-01T00:00:00Z", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "GET",
        "/api/export-json?start=2024-02-01T00:00:00Z&end=2024-01-01T00:00:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "GET",
        "/api/export-json?start=yesterday&end=2024-01-01T00:00:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    create_order(&app, 1).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("events_recorded_total"));
}
