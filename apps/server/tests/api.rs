//! End-to-end tests against the full router on an in-memory database.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use mesa_db::{Database, DbConfig};
use mesa_server::{router, AppState, ServerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

const WAITER: &str = "waiter-7";

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    router(AppState::new(db, ServerConfig::default()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_as(app, method, uri, body, Some(WAITER)).await
}

async fn send_as(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    user: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_table(app: &Router, number: i64, capacity: i64) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/tables",
        Some(json!({ "number": number, "capacity": capacity })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

async fn create_item(app: &Router, name: &str, price: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/menu-items",
        Some(json!({ "name": name, "price": price, "category": "Main" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}

/// Table on which an order with a total of 34.50 has been opened.
async fn open_order(app: &Router) -> (String, Value) {
    let table_id = create_table(app, 1, 4).await;
    let paella = create_item(app, "Paella", "12.50").await;
    let flan = create_item(app, "Flan", "9.50").await;

    let (status, _) = send(app, Method::POST, &format!("/tables/{table_id}/assign"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        Method::POST,
        "/orders",
        Some(json!({
            "table_id": table_id,
            "items": [
                { "item_id": paella, "quantity": 2 },
                { "item_id": flan, "quantity": 1, "notes": "no cream" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    (table_id, body)
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
    assert_eq!(body["migrations"]["embedded"], body["migrations"]["applied"]);
}

// =============================================================================
// Tables
// =============================================================================

#[tokio::test]
async fn test_second_assign_conflicts_with_current_status() {
    let app = app().await;
    let table_id = create_table(&app, 1, 4).await;
    let uri = format!("/tables/{table_id}/assign");

    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OCCUPIED");

    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "TABLE_CONFLICT");
    assert_eq!(body["details"]["currentStatus"], "OCCUPIED");
    assert_eq!(body["details"]["expectedStatus"], "AVAILABLE");
}

#[tokio::test]
async fn test_table_id_errors() {
    let app = app().await;

    let (status, body) = send(&app, Method::POST, "/tables/not-a-uuid/assign", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(&app, Method::POST, &format!("/tables/{missing}/release"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "TABLE_NOT_FOUND");
}

#[tokio::test]
async fn test_duplicate_table_number() {
    let app = app().await;
    create_table(&app, 5, 4).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/tables",
        Some(json!({ "number": 5, "capacity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DUPLICATE_TABLE_NUMBER");
}

#[tokio::test]
async fn test_list_tables_by_status() {
    let app = app().await;
    let first = create_table(&app, 1, 2).await;
    create_table(&app, 2, 6).await;
    send(&app, Method::POST, &format!("/tables/{first}/maintenance"), None).await;

    let (_, body) = send(&app, Method::GET, "/tables?status=MAINTENANCE", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], first.as_str());

    let (_, body) = send(&app, Method::GET, "/tables/available?min_capacity=4", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["number"], 2);
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_create_order_prices_lines() {
    let app = app().await;
    let (_, body) = open_order(&app).await;

    assert_eq!(body["order"]["total_cents"], 3450);
    assert_eq!(body["order"]["status"], "PENDING");
    assert_eq!(body["order"]["waiter_id"], WAITER);
    assert_eq!(body["lines"].as_array().unwrap().len(), 2);
    assert!(body["order"]["order_number"]
        .as_str()
        .unwrap()
        .starts_with("PED-"));
}

#[tokio::test]
async fn test_create_order_requires_identity() {
    let app = app().await;
    let (status, body) = send_as(
        &app,
        Method::POST,
        "/orders",
        Some(json!({ "table_id": uuid::Uuid::new_v4().to_string(), "items": [] })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_create_order_on_free_table_conflicts() {
    let app = app().await;
    let table_id = create_table(&app, 1, 4).await;
    let item = create_item(&app, "Paella", "12.50").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/orders",
        Some(json!({ "table_id": table_id, "items": [{ "item_id": item, "quantity": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "TABLE_NOT_OCCUPIED");
    assert_eq!(body["details"]["currentStatus"], "AVAILABLE");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/orders")
        .header("x-user-id", WAITER)
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_pipeline_rejects_skips() {
    let app = app().await;
    let (_, order) = open_order(&app).await;
    let uri = format!("/orders/{}/status", order["order"]["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "status": "PREPARING" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PREPARING");

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "status": "DELIVERED" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "INVALID_TRANSITION");
    assert_eq!(body["details"]["currentStatus"], "PREPARING");
    assert_eq!(body["details"]["requestedStatus"], "DELIVERED");
    assert_eq!(body["details"]["allowedStatuses"], json!(["READY"]));
}

#[tokio::test]
async fn test_cancel_requires_reason() {
    let app = app().await;
    let (_, order) = open_order(&app).await;
    let uri = format!("/orders/{}/status", order["order"]["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "status": "CANCELLED" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "reason");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "status": "CANCELLED", "reason": "customer left" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cancel_reason"], "customer left");
}

#[tokio::test]
async fn test_line_edits_keep_total() {
    let app = app().await;
    let (_, order) = open_order(&app).await;
    let order_id = order["order"]["id"].as_str().unwrap();
    let first_line = order["lines"][0]["id"].as_str().unwrap();
    let item_id = order["lines"][0]["item_id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/orders/{order_id}/items"),
        Some(json!({ "item_id": item_id, "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/orders/{order_id}/items/{first_line}"),
        Some(json!({ "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subtotal_cents"], 3750);

    let (_, detail) = send(&app, Method::GET, &format!("/orders/{order_id}"), None).await;
    // 3 x 12.50 + 9.50 + 12.50
    assert_eq!(detail["order"]["total_cents"], 5950);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/orders/{order_id}/items/{first_line}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["total_cents"], 2200);
    assert_eq!(body["lines"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_orders_with_lenient_pagination() {
    let app = app().await;
    open_order(&app).await;

    let (status, body) = send(&app, Method::GET, "/orders?page=abc&page_size=-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["page_size"], 20);
    assert_eq!(body["pagination"]["total"], 1);

    let (_, body) = send(&app, Method::GET, "/orders?status=DELIVERED", None).await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_kitchen_view() {
    let app = app().await;
    open_order(&app).await;

    let (status, body) = send(&app, Method::GET, "/orders/kitchen", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["pending"], 1);
    assert_eq!(body["summary"]["total"], 1);
    assert_eq!(body["PENDING"][0]["lines"].as_array().unwrap().len(), 2);
}

// =============================================================================
// Reservations
// =============================================================================

fn booking(name: &str, table_id: Option<&str>) -> Value {
    json!({
        "customer_name": name,
        "party_size": 2,
        "date": "2030-06-01",
        "time": "20:00:00",
        "preferred_table_id": table_id,
    })
}

#[tokio::test]
async fn test_reservation_slot_conflict() {
    let app = app().await;
    let table_id = create_table(&app, 1, 4).await;

    let (status, body) = send(&app, Method::POST, "/reservations", Some(booking("Ana", Some(table_id.as_str())))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["status"], "ACTIVE");

    let (status, body) = send(&app, Method::POST, "/reservations", Some(booking("Luis", Some(table_id.as_str())))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "SLOT_CONFLICT");
    assert_eq!(body["details"]["tableId"], table_id.as_str());
}

#[tokio::test]
async fn test_reservation_without_table_is_not_found() {
    let app = app().await;
    create_table(&app, 1, 2).await;

    let mut request = booking("Big party", None);
    request["party_size"] = json!(10);
    let (status, body) = send(&app, Method::POST, "/reservations", Some(request)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NO_TABLE_AVAILABLE");
}

#[tokio::test]
async fn test_reservation_lifecycle() {
    let app = app().await;
    let table_id = create_table(&app, 1, 4).await;
    let (_, reservation) = send(&app, Method::POST, "/reservations", Some(booking("Ana", None))).await;
    let id = reservation["id"].as_str().unwrap();

    let (status, body) = send(&app, Method::PUT, &format!("/reservations/{id}/confirm"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CONFIRMED");
    let (_, table) = send(&app, Method::GET, &format!("/tables/{table_id}"), None).await;
    assert_eq!(table["status"], "RESERVED");

    let (status, body) = send(&app, Method::PUT, &format!("/reservations/{id}/complete"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "COMPLETED");
    let (_, table) = send(&app, Method::GET, &format!("/tables/{table_id}"), None).await;
    assert_eq!(table["status"], "AVAILABLE");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/reservations/{id}/cancel"),
        Some(json!({ "reason": "too late" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_reservation_cancel_and_unknown_action() {
    let app = app().await;
    create_table(&app, 1, 4).await;
    let (_, reservation) = send(&app, Method::POST, "/reservations", Some(booking("Ana", None))).await;
    let id = reservation["id"].as_str().unwrap();

    let (status, _) = send(&app, Method::PUT, &format!("/reservations/{id}/cancel"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::PUT, &format!("/reservations/{id}/archive"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/reservations/{id}/cancel"),
        Some(json!({ "reason": "rain" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");
    assert_eq!(body["notes"], "Cancelled: rain");
}

#[tokio::test]
async fn test_check_availability() {
    let app = app().await;
    let booked = create_table(&app, 1, 4).await;
    let free = create_table(&app, 2, 4).await;
    send(&app, Method::POST, "/reservations", Some(booking("Ana", Some(booked.as_str())))).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/reservations/check-availability",
        Some(json!({ "date": "2030-06-01", "time": "20:00:00", "party_size": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let tables = body.as_array().unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0]["id"], free.as_str());
}

// =============================================================================
// Menu
// =============================================================================

#[tokio::test]
async fn test_unavailable_item_blocks_order() {
    let app = app().await;
    let table_id = create_table(&app, 1, 4).await;
    let item = create_item(&app, "Paella", "12.50").await;
    send(&app, Method::POST, &format!("/tables/{table_id}/assign"), None).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/menu-items/{item}/availability"),
        Some(json!({ "available": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);

    let (status, body) = send(
        &app,
        Method::POST,
        "/orders",
        Some(json!({ "table_id": table_id, "items": [{ "item_id": item, "quantity": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ITEMS_UNAVAILABLE");

    let (_, body) = send(&app, Method::GET, "/orders", None).await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_menu_price_above_limit_is_rejected() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/menu-items",
        Some(json!({ "name": "Gold leaf", "price": "90000000000000000" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["field"], "price");

    let (_, body) = send(&app, Method::GET, "/menu-items", None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}
