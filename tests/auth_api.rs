//! Integration tests for sign-up, sign-in and role gating

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn test_signup_and_signin_flow() {
    let t = create_test_app().await;

    let (status, body) = signup(&t.app, "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User registered successfully!");
    assert_eq!(body["status"], true);

    let token = signin(&t.app, "alice", "secret123").await;

    let (status, me) = send_rest_request(&t.app, "GET", "/api/auth/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert_eq!(me["email"], "alice@shop.io");
    assert_eq!(me["roles"], json!(["ROLE_USER"]));
    assert!(me.get("jwtToken").is_none());

    let (status, body) = send_rest_request(&t.app, "GET", "/api/user/test", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Authenticated as: alice");
}

#[tokio::test]
async fn test_duplicate_and_invalid_signups_rejected() {
    let t = create_test_app().await;
    signup(&t.app, "bob", None).await;

    let (status, body) = signup(&t.app, "bob", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Error: Username is already taken!");

    let (status, body) = send_rest_request(
        &t.app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "username": "bobby", "email": "bob@shop.io", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Error: Email is already in use!");

    let (status, body) = send_rest_request(
        &t.app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "username": "x", "email": "nope", "password": "123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("username").is_some());
    assert!(body.get("email").is_some());
    assert!(body.get("password").is_some());
}

#[tokio::test]
async fn test_bad_credentials_and_anonymous_access() {
    let t = create_test_app().await;
    signup(&t.app, "carol", None).await;

    let (status, _) = send_rest_request(
        &t.app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "username": "carol", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_rest_request(&t.app, "GET", "/api/auth/user", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_rest_request(&t.app, "GET", "/api/auth/user", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signout_ends_session() {
    let t = create_test_app().await;
    let (token, _) = register(&t.app, "dave", None).await;

    let (status, body) = send_rest_request(&t.app, "POST", "/api/auth/signout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "You've been signed out!");
    assert!(t.state.sessions.is_empty());

    let (status, _) = send_rest_request(&t.app, "GET", "/api/auth/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_roles_gate_admin_endpoints() {
    let t = create_test_app().await;
    let (seller, _) = register(&t.app, "erin", Some("seller")).await;

    let (_, me) = send_rest_request(&t.app, "GET", "/api/auth/user", Some(&seller), None).await;
    let roles = me["roles"].as_array().unwrap();
    assert_eq!(roles.len(), 2);
    assert!(roles.contains(&json!("ROLE_USER")));
    assert!(roles.contains(&json!("ROLE_SELLER")));

    let (status, body) = send_rest_request(
        &t.app,
        "POST",
        "/api/admin/categories",
        Some(&seller),
        Some(json!({ "categoryName": "Books" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin role required");

    let admin = admin_token(&t.app).await;
    let (_, me) = send_rest_request(&t.app, "GET", "/api/auth/user", Some(&admin), None).await;
    assert!(me["roles"].as_array().unwrap().contains(&json!("ROLE_ADMIN")));

    let (status, _) = signup(&t.app, "mallory", Some("admin")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sessions_expire_after_ttl() {
    let t = create_test_app_with(|config, _| config.session_ttl_secs = 1).await;
    let (early, _) = register(&t.app, "frank", None).await;
    let (status, _) = send_rest_request(&t.app, "GET", "/api/auth/user", Some(&early), None).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    // a fresh sign-in sweeps the stale entry out of the table
    let (_, _) = register(&t.app, "grace", None).await;
    assert_eq!(t.state.sessions.len(), 1);

    let (status, body) = send_rest_request(&t.app, "GET", "/api/auth/user", Some(&early), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], false);

    let again = signin(&t.app, "frank", "secret123").await;
    let (status, me) = send_rest_request(&t.app, "GET", "/api/auth/user", Some(&again), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "frank");
}

#[tokio::test]
async fn test_passwords_stored_as_bcrypt() {
    let t = create_test_app().await;
    signup(&t.app, "heidi", None).await;

    let stored: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE username = ?")
        .bind("heidi")
        .fetch_one(&t.state.db)
        .await
        .unwrap();
    assert!(stored.starts_with("$2b$04$"), "{}", stored);
    assert!(!stored.contains("secret123"));

    let admin: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE username = ?")
        .bind(ADMIN_USERNAME)
        .fetch_one(&t.state.db)
        .await
        .unwrap();
    assert!(admin.starts_with("$2b$"));
    admin_token(&t.app).await;
}

#[tokio::test]
async fn test_malformed_json_uses_api_error_body() {
    let t = create_test_app().await;

    let (status, body) = send_rest_request(
        &t.app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "username": 42, "password": ["x"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], false);
    assert!(body["message"].as_str().unwrap().contains("username"), "{}", body);

    // no content-type at all
    let (status, body) = send_rest_request(&t.app, "POST", "/api/auth/signup", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], false);
    assert!(body["message"].as_str().unwrap().contains("Content-Type"), "{}", body);
}
