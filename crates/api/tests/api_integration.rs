//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::AppState;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use catalog::{Category, Money, NewProduct, Product};
use metrics_exporter_prometheus::PrometheusHandle;
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

fn setup() -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::in_memory());
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn signup(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/users/signup",
        None,
        Some(json!({
            "username": username,
            "password": "password123",
            "password_confirmation": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

async fn staff_token(app: &Router, state: &AppState) -> String {
    state
        .accounts
        .ensure_staff("staff", "staffpass1")
        .await
        .unwrap();
    let (status, body) = send(
        app,
        "POST",
        "/users/login",
        None,
        Some(json!({ "username": "staff", "password": "staffpass1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn product(state: &AppState, name: &str, cents: i64, inventory: u32) -> Product {
    state
        .catalog
        .create(NewProduct::new(
            name,
            Money::from_cents(cents),
            Category::Laptop,
            inventory,
        ))
        .await
        .unwrap()
}

async fn add(app: &Router, token: &str, product: &Product, quantity: Value) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/cart/items",
        Some(token),
        Some(json!({ "product_id": product.id, "quantity": quantity })),
    )
    .await
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let (status, body) = send(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_signup_login_logout() {
    let (app, _) = setup();
    let token = signup(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/users/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password.");

    let (status, _) = send(&app, "POST", "/users/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", "/cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_validation_errors() {
    let (app, _) = setup();
    signup(&app, "bob").await;

    let (status, _) = send(
        &app,
        "POST",
        "/users/signup",
        None,
        Some(json!({
            "username": "bob",
            "password": "password123",
            "password_confirmation": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/users/signup",
        None,
        Some(json!({
            "username": "carol",
            "password": "password123",
            "password_confirmation": "password124",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_requires_session() {
    let (app, _) = setup();

    let (status, body) = send(&app, "GET", "/cart", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required.");
}

#[tokio::test]
async fn test_product_listing_and_filter() {
    let (app, state) = setup();
    product(&state, "Zenbook", 99_900, 3).await;
    state
        .catalog
        .create(NewProduct::new(
            "RTX 4080",
            Money::from_cents(119_900),
            Category::GraphicsCard,
            2,
        ))
        .await
        .unwrap();

    let (status, body) = send(&app, "GET", "/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["RTX 4080", "Zenbook"]);

    let (status, body) = send(&app, "GET", "/products?category=Graphics%20Card", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["price"], 119_900);
}

#[tokio::test]
async fn test_product_detail() {
    let (app, state) = setup();
    let p = product(&state, "Zenbook", 99_900, 3).await;

    let (status, body) = send(&app, "GET", &format!("/products/{}", p.id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inventory"], 3);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/products/{}", catalog::ProductId::new()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/products/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_requires_staff() {
    let (app, state) = setup();
    let customer = signup(&app, "dave").await;
    let staff = staff_token(&app, &state).await;

    let (status, _) = send(&app, "GET", "/admin/products", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        "/admin/products",
        Some(&staff),
        Some(json!({
            "name": "Steam Deck",
            "description": "Handheld",
            "price": 54_900,
            "category": "Game Console",
            "inventory": 4,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["category"], "Game Console");
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/admin/products/{id}/stock"),
        Some(&staff),
        Some(json!({ "delta": -5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/admin/products/{id}/stock"),
        Some(&staff),
        Some(json!({ "delta": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inventory"], 10);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/admin/products/{id}/stock"),
        Some(&staff),
        Some(json!({ "delta": i64::MAX })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "inventory out of range");

    let (status, _) = send(
        &app,
        "POST",
        "/admin/products",
        Some(&staff),
        Some(json!({ "name": "Gold Deck", "price": 10_000_000_000_i64, "category": "Game Console" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/admin/products",
        Some(&staff),
        Some(json!({ "name": "  ", "price": 100, "category": "Monitor" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_item_reports_totals_and_clamps() {
    let (app, state) = setup();
    let token = signup(&app, "erin").await;
    let p = product(&state, "Zenbook", 1_000, 3).await;

    let (status, body) = add(&app, &token, &p, json!(10)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["outcome"]["kind"], "adjusted_and_created");
    assert_eq!(body["outcome"]["quantity"], 3);
    assert_eq!(body["message"], "Only 3 units of Zenbook available. Adjusted quantity.");
    assert_eq!(body["total_items"], 3);
    assert_eq!(body["total_price"], 3_000);
}

#[tokio::test]
async fn test_add_non_numeric_quantity_counts_as_one() {
    let (app, state) = setup();
    let token = signup(&app, "frank").await;
    let p = product(&state, "Zenbook", 1_000, 3).await;

    let (status, body) = add(&app, &token, &p, json!("lots")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["quantity"], 1);
}

#[tokio::test]
async fn test_add_out_of_stock_is_not_success() {
    let (app, state) = setup();
    let token = signup(&app, "gina").await;
    let p = product(&state, "Zenbook", 1_000, 0).await;

    let (status, body) = add(&app, &token, &p, json!(1)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["outcome"]["kind"], "unavailable");
    assert_eq!(body["message"], "Zenbook is out of stock.");
    assert_eq!(body["total_items"], 0);
}

#[tokio::test]
async fn test_set_quantity_and_remove() {
    let (app, state) = setup();
    let token = signup(&app, "hank").await;
    let p = product(&state, "Zenbook", 1_000, 5).await;
    let (_, body) = add(&app, &token, &p, json!(1)).await;
    let item = format!("/cart/items/{}", body["outcome"]["item_id"].as_str().unwrap());

    let (status, body) = send(&app, "PATCH", &item, Some(&token), Some(json!({ "quantity": "abc" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid quantity.");

    let (status, body) = send(&app, "PATCH", &item, Some(&token), Some(json!({ "quantity": 4 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["kind"], "updated");
    assert_eq!(body["outcome"]["line_cost"], 4_000);
    assert_eq!(body["total_price"], 4_000);

    let (status, body) = send(&app, "DELETE", &item, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Removed Zenbook from your cart.");
    assert_eq!(body["total_items"], 0);

    let (status, _) = send(&app, "DELETE", &item, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_foreign_cart_item_is_forbidden() {
    let (app, state) = setup();
    let owner = signup(&app, "ivy").await;
    let intruder = signup(&app, "jack").await;
    let p = product(&state, "Zenbook", 1_000, 5).await;
    let (_, body) = add(&app, &owner, &p, json!(1)).await;
    let item = format!("/cart/items/{}", body["outcome"]["item_id"].as_str().unwrap());

    let (status, _) = send(&app, "DELETE", &item, Some(&intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = send(&app, "GET", "/cart/status", Some(&owner), None).await;
    assert_eq!(body["total_items"], 1);
}

#[tokio::test]
async fn test_view_status_and_clear() {
    let (app, state) = setup();
    let token = signup(&app, "kate").await;
    let p = product(&state, "Zenbook", 1_250, 5).await;
    add(&app, &token, &p, json!(2)).await;

    let (status, body) = send(&app, "GET", "/cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lines"][0]["product_name"], "Zenbook");
    assert_eq!(body["lines"][0]["line_cost"], 2_500);
    assert_eq!(body["totals"]["total_items"], 2);

    let (_, body) = send(&app, "GET", "/cart/status", Some(&token), None).await;
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(body["total_price"], 2_500);

    let (status, body) = send(&app, "DELETE", "/cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Your cart has been cleared.");
    assert_eq!(body["total_items"], 0);
}

#[tokio::test]
async fn test_checkout_flow() {
    let (app, state) = setup();
    let token = signup(&app, "liam").await;
    let p1 = product(&state, "P1", 1_000, 5).await;
    let p2 = product(&state, "P2", 2_500, 1).await;

    let (status, body) = send(&app, "POST", "/cart/checkout", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Your cart is empty. Add some products before checkout."
    );

    add(&app, &token, &p1, json!(2)).await;
    add(&app, &token, &p2, json!(1)).await;

    let (status, body) = send(&app, "POST", "/cart/checkout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Your order has been placed successfully!");
    assert_eq!(body["receipt"]["total_price"], 4_500);
    assert_eq!(body["total_items"], 0);

    assert_eq!(state.catalog.find(p1.id).await.unwrap().unwrap().inventory, 3);
    assert_eq!(state.catalog.find(p2.id).await.unwrap().unwrap().inventory, 0);
}

#[tokio::test]
async fn test_checkout_conflict_lists_every_failure() {
    let (app, state) = setup();
    let token = signup(&app, "mia").await;
    let a = product(&state, "Alpha", 1_000, 3).await;
    let b = product(&state, "Beta", 1_000, 3).await;
    add(&app, &token, &a, json!(3)).await;
    add(&app, &token, &b, json!(3)).await;
    state.catalog.update_stock(a.id, -3).await.unwrap();
    state.catalog.update_stock(b.id, -1).await.unwrap();

    let (status, body) = send(&app, "POST", "/cart/checkout", Some(&token), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    let failures = body["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0]["message"], "Alpha is no longer available.");
    assert_eq!(failures[1]["message"], "Sorry, only 2 units of Beta available.");

    let (_, body) = send(&app, "GET", "/cart/status", Some(&token), None).await;
    assert_eq!(body["total_items"], 6);
    assert_eq!(state.catalog.find(b.id).await.unwrap().unwrap().inventory, 2);
}

#[tokio::test]
async fn test_deleting_product_removes_cart_lines() {
    let (app, state) = setup();
    let staff = staff_token(&app, &state).await;
    let token = signup(&app, "noah").await;
    let p = product(&state, "Zenbook", 1_000, 5).await;
    add(&app, &token, &p, json!(2)).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/admin/products/{}", p.id),
        Some(&staff),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "GET", "/cart/status", Some(&token), None).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}
