//! End-to-end tests over the full router and the in-memory store

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use storefront_server::api::build_app;
use storefront_server::auth::{JwtConfig, PasswordPolicy};
use storefront_server::{AppState, JwtService, PasswordService};
use tower::ServiceExt;

const SECRET: &str = "integration-tests-secret-0123456789abcdef";

fn app() -> Router {
    let passwords = PasswordService::new(PasswordPolicy {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();
    build_app(AppState::in_memory(
        JwtService::with_config(JwtConfig::new(SECRET)),
        passwords,
    ))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    authorization: Option<&str>,
    body: Option<Body>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder.body(body.unwrap_or_else(Body::empty)).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let authorization = token.map(|t| format!("Bearer {t}"));
    let body = body.map(|b| Body::from(b.to_string()));
    send(app, method, uri, authorization.as_deref(), body).await
}

/// Register a user and return its access token
async fn signed_up(app: &Router, email: &str) -> String {
    let (status, body) = call(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "buyer", "email": email, "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn add_product(app: &Router, token: &str, name: &str, price: f64, stock: i32) -> i64 {
    let (status, body) = call(
        app,
        "POST",
        "/api/products",
        Some(token),
        Some(json!([{"name": name, "price": price, "stock": stock}])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body[0]["id"].as_i64().unwrap()
}

async fn stock_of(app: &Router, token: &str, id: i64) -> i64 {
    let (status, body) = call(app, "GET", &format!("/api/products/{id}"), Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body["stock"].as_i64().unwrap()
}

#[tokio::test]
async fn health_is_public_and_tagged_with_request_id() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn register_login_and_profile() {
    let app = app();
    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "ana", "email": " Ana@Example.com", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "ana@example.com");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["token"].is_string());
    assert!(body["refresh_token"].is_string());

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "ana@example.com", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    let refresh = body["refresh_token"].as_str().unwrap().to_string();

    let (status, body) = call(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ana@example.com");
    assert_eq!(body["username"], "ana");

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/refresh",
        None,
        Some(json!({"refresh_token": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = app();
    signed_up(&app, "ana@example.com").await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "ana@example.com", "password": "not-it-at-all"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = app();
    signed_up(&app, "ana@example.com").await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"email": "ANA@example.com", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 1010);
}

#[tokio::test]
async fn session_gate_rejections() {
    let app = app();
    let token = signed_up(&app, "ana@example.com").await;

    let (status, body) = send(&app, "GET", "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);

    for malformed in [
        token.clone(),
        format!("Token {token}"),
        format!("Bearer {token} extra"),
        "Bearer".to_string(),
    ] {
        let (status, body) = send(&app, "GET", "/api/orders", Some(&malformed), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{malformed}");
        assert_eq!(body["code"], 1008, "{malformed}");
    }

    let (status, body) = send(&app, "GET", "/api/orders", Some("Bearer garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1004);
    assert_eq!(body["message"], "Invalid or expired token");

    let (status, _) = send(
        &app,
        "GET",
        "/api/orders",
        Some(&format!("bEaReR {token}")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn refresh_token_cannot_open_the_gate() {
    let app = app();
    let (_, body) = call(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"email": "ana@example.com", "password": "password123"})),
    )
    .await;
    let refresh = body["refresh_token"].as_str().unwrap();

    let (status, body) = call(&app, "GET", "/api/orders", Some(refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn place_order_end_to_end() {
    let app = app();
    let token = signed_up(&app, "ana@example.com").await;
    let product = add_product(&app, &token, "widget", 5.0, 10).await;

    let (status, order) = call(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({"order_items": [{"product_id": product, "quantity": 2, "unit_price": 0.01}]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["total"], 10.0);
    assert_eq!(order["order_items"][0]["product_id"], product);
    assert_eq!(order["order_items"][0]["quantity"], 2);
    assert_eq!(order["order_items"][0]["unit_price"], 5.0);
    assert_eq!(stock_of(&app, &token, product).await, 8);

    let (status, orders) = call(&app, "GET", "/api/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["id"], order["id"]);
}

#[tokio::test]
async fn orders_are_scoped_to_the_caller() {
    let app = app();
    let ana = signed_up(&app, "ana@example.com").await;
    let bob = signed_up(&app, "bob@example.com").await;
    let product = add_product(&app, &ana, "widget", 1.5, 10).await;

    let (status, _) = call(
        &app,
        "POST",
        "/api/orders",
        Some(&ana),
        Some(json!({"order_items": [{"product_id": product, "quantity": 1}]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, orders) = call(&app, "GET", "/api/orders", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders, json!([]));
}

#[tokio::test]
async fn single_order_lookup_is_owner_only() {
    let app = app();
    let ana = signed_up(&app, "ana@example.com").await;
    let bob = signed_up(&app, "bob@example.com").await;
    let product = add_product(&app, &ana, "widget", 1.5, 10).await;

    let (_, order) = call(
        &app,
        "POST",
        "/api/orders",
        Some(&ana),
        Some(json!({"order_items": [{"product_id": product, "quantity": 2}]})),
    )
    .await;
    let uri = format!("/api/orders/{}", order["id"]);

    let (status, body) = call(&app, "GET", &uri, Some(&ana), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, order);

    let (status, body) = call(&app, "GET", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);

    let (status, body) = call(&app, "GET", "/api/orders/9999", Some(&ana), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);

    let (status, body) = call(&app, "GET", "/api/orders/abc", Some(&ana), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5);
}

#[tokio::test]
async fn insufficient_stock_is_a_client_error() {
    let app = app();
    let token = signed_up(&app, "ana@example.com").await;
    let product = add_product(&app, &token, "widget", 5.0, 1).await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({"order_items": [{"product_id": product, "quantity": 2}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6003);
    assert_eq!(body["details"]["product_id"], product);
    assert_eq!(body["details"]["available"], 1);
    assert_eq!(stock_of(&app, &token, product).await, 1);

    let (_, orders) = call(&app, "GET", "/api/orders", Some(&token), None).await;
    assert_eq!(orders, json!([]));
}

#[tokio::test]
async fn unknown_product_fails_without_side_effects() {
    let app = app();
    let token = signed_up(&app, "ana@example.com").await;
    let product = add_product(&app, &token, "widget", 5.0, 4).await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({"order_items": [
            {"product_id": product, "quantity": 2},
            {"product_id": 424242, "quantity": 1}
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6001);
    assert_eq!(body["details"]["product_id"], 424242);
    assert_eq!(stock_of(&app, &token, product).await, 4);
}

#[tokio::test]
async fn malformed_order_body_is_bad_request() {
    let app = app();
    let token = signed_up(&app, "ana@example.com").await;

    for body in [
        Body::from("{not json"),
        Body::from(r#"{"order_items": [{"product_id": "one", "quantity": 1}]}"#),
        Body::from(r#"{"items": []}"#),
    ] {
        let (status, response) = send(
            &app,
            "POST",
            "/api/orders",
            Some(&format!("Bearer {token}")),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["code"], 5);
    }
}

#[tokio::test]
async fn zero_quantity_is_rejected() {
    let app = app();
    let token = signed_up(&app, "ana@example.com").await;
    let product = add_product(&app, &token, "widget", 5.0, 4).await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({"order_items": [{"product_id": product, "quantity": 0}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4008);
}

#[tokio::test]
async fn empty_order_is_accepted_with_zero_total() {
    let app = app();
    let token = signed_up(&app, "ana@example.com").await;

    let (status, order) = call(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({"order_items": []})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["total"], 0.0);
    assert_eq!(order["order_items"], json!([]));
}

#[tokio::test]
async fn product_catalog() {
    let app = app();
    let token = signed_up(&app, "ana@example.com").await;
    add_product(&app, &token, "widget", 2.5, 3).await;

    let (status, products) = call(&app, "GET", "/api/products", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(products[0]["name"], "widget");
    assert_eq!(products[0]["price"], 2.5);
    assert_eq!(products[0]["created_by"], "ana@example.com");

    let (status, body) = call(
        &app,
        "POST",
        "/api/products",
        Some(&token),
        Some(json!([{"name": "widget", "price": 1.0, "stock": 1}])),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 6004);

    let (status, body) = call(
        &app,
        "POST",
        "/api/products",
        Some(&token),
        Some(json!([{"name": "gadget", "price": -1.0, "stock": 1}])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6002);

    let (status, _) = call(&app, "GET", "/api/products/9999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "GET", "/api/products", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn out_of_range_prices_are_rejected() {
    let app = app();
    let token = signed_up(&app, "ana@example.com").await;

    for price in [1e28, 1.005] {
        let (status, body) = call(
            &app,
            "POST",
            "/api/products",
            Some(&token),
            Some(json!([{"name": "gadget", "price": price, "stock": 1}])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{price}");
        assert_eq!(body["code"], 6002, "{price}");
    }

    let (_, products) = call(&app, "GET", "/api/products", Some(&token), None).await;
    assert_eq!(products, json!([]));
}
