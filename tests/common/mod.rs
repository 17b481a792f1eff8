//! Shared helpers for the HTTP integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ecommerce_backend::config::{AdminAccount, AppConfig};
use ecommerce_backend::db;
use ecommerce_backend::router::create_app_router;
use ecommerce_backend::state::{AppState, SharedState};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "adminpass";

/// Cheapest bcrypt cost, keeps sign-ups fast under test
pub const TEST_PASSWORD_COST: u32 = 4;

pub struct TestApp {
    pub app: Router,
    pub state: SharedState,
    _scratch: TempDir,
}

/// Builds an app over a fresh in-memory database with an admin account
pub async fn create_test_app() -> TestApp {
    create_test_app_with(|_, _| {}).await
}

/// Like `create_test_app`, letting `configure` adjust the config first.
/// It receives a scratch directory that lives as long as the app, e.g. for
/// a file-backed database.
pub async fn create_test_app_with<F>(configure: F) -> TestApp
where
    F: FnOnce(&mut AppConfig, &Path),
{
    let scratch = tempfile::tempdir().unwrap();
    let admin = AdminAccount {
        username: ADMIN_USERNAME.into(),
        email: "admin@shop.io".into(),
        password: ADMIN_PASSWORD.into(),
    };
    let mut config = AppConfig {
        database_url: "sqlite::memory:".into(),
        upload_dir: scratch.path().join("images"),
        image_base_url: "http://test/images".into(),
        password_hash_cost: TEST_PASSWORD_COST,
        admin: Some(admin.clone()),
        ..AppConfig::default()
    };
    configure(&mut config, scratch.path());

    let pool = db::connect(&config.database_url).await.unwrap();
    db::bootstrap_admin(&pool, &admin, config.password_hash_cost)
        .await
        .unwrap();

    let state = AppState::new(pool, config).shared();
    TestApp {
        app: create_app_router(state.clone()),
        state,
        _scratch: scratch,
    }
}

/// Sends a request and returns the status with the body as JSON.
/// Plain-text bodies come back as `Value::String`.
pub async fn send_rest_request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&body_bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body_bytes).into_owned()));

    (status, body)
}

pub async fn signup(app: &Router, username: &str, role: Option<&str>) -> (StatusCode, Value) {
    let mut body = json!({
        "username": username,
        "email": format!("{}@shop.io", username),
        "password": "secret123",
    });
    if let Some(role) = role {
        body["role"] = json!(role);
    }
    send_rest_request(app, "POST", "/api/auth/signup", None, Some(body)).await
}

/// Signs in and returns the session token
pub async fn signin(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send_rest_request(
        app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signin failed: {}", body);
    body["jwtToken"].as_str().unwrap().to_string()
}

/// Registers a user (optionally as seller) and returns `(token, user_id)`
pub async fn register(app: &Router, username: &str, role: Option<&str>) -> (String, i64) {
    let (status, body) = signup(app, username, role).await;
    assert_eq!(status, StatusCode::OK, "signup failed: {}", body);

    let token = signin(app, username, "secret123").await;
    let (_, me) = send_rest_request(app, "GET", "/api/auth/user", Some(&token), None).await;
    (token, me["id"].as_i64().unwrap())
}

pub async fn admin_token(app: &Router) -> String {
    signin(app, ADMIN_USERNAME, ADMIN_PASSWORD).await
}

/// Creates a category as admin and returns its id
pub async fn create_category(app: &Router, admin: &str, name: &str) -> i64 {
    let (status, body) = send_rest_request(
        app,
        "POST",
        "/api/admin/categories",
        Some(admin),
        Some(json!({ "categoryName": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "category failed: {}", body);
    body["categoryId"].as_i64().unwrap()
}

/// Creates a product owned by the token's user and returns its id
pub async fn create_product(
    app: &Router,
    token: &str,
    category_id: i64,
    name: &str,
    quantity: i64,
    price: f64,
    discount: f64,
) -> i64 {
    let (status, body) = send_rest_request(
        app,
        "POST",
        &format!("/api/user/categories/{}/product", category_id),
        Some(token),
        Some(json!({
            "productName": name,
            "description": format!("{} description", name),
            "quantity": quantity,
            "price": price,
            "discount": discount,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "product failed: {}", body);
    body["productId"].as_i64().unwrap()
}

/// Creates an address for the token's user and returns its id
pub async fn create_address(app: &Router, token: &str) -> i64 {
    let (status, body) = send_rest_request(
        app,
        "POST",
        "/api/addresses",
        Some(token),
        Some(json!({
            "street": "Main Street 1",
            "buildingName": "Tower Block",
            "city": "Springfield",
            "state": "IL",
            "country": "USA",
            "pincode": "62701",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "address failed: {}", body);
    body["addressId"].as_i64().unwrap()
}

/// Sends a multipart form; `file` is `(field, filename, bytes)`
pub async fn send_multipart(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> (StatusCode, Value) {
    const BOUNDARY: &str = "XTESTBOUNDARYX";
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&body_bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body_bytes).into_owned()));
    (status, body)
}
