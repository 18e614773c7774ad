//! Account registration, login, token refresh, and the identity layer.

#![allow(clippy::unwrap_used)]

use axum::http::{Request, StatusCode};
use serde_json::json;
use storekeep_integration_tests::{ADMIN_SECRET, PASSWORD, TestApp};

#[tokio::test]
async fn test_register_customer_returns_tokens_and_customer_role() {
    let app = TestApp::new();

    let resp = app
        .post(
            "/v1/register",
            None,
            json!({
                "email": "a@b.com",
                "first_name": "A",
                "last_name": "B",
                "password": "secret1",
                "password_confirm": "secret1",
            }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["msg"], "Account registered successfully");
    assert_eq!(resp.body["user"]["email"], "a@b.com");
    assert_eq!(resp.body["user"]["role"], "customer");
    assert!(!resp.body["access_token"].as_str().unwrap().is_empty());
    assert!(!resp.body["refresh_token"].as_str().unwrap().is_empty());
    assert!(resp.body["user"].get("password").is_none());
    assert!(resp.body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_is_rejected() {
    let app = TestApp::new();
    app.register_customer("dup@example.com").await;

    let resp = app
        .post(
            "/v1/register",
            None,
            json!({
                "email": "DUP@example.com",
                "first_name": "Again",
                "last_name": "Again",
                "password": PASSWORD,
                "password_confirm": PASSWORD,
            }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "User with this email already exists.");
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let app = TestApp::new();

    let resp = app
        .post(
            "/v1/register",
            None,
            json!({
                "email": "m@example.com",
                "first_name": "M",
                "last_name": "M",
                "password": "secret1",
                "password_confirm": "secret2",
            }),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "Passwords do not match");
}

#[tokio::test]
async fn test_register_reports_field_errors() {
    let app = TestApp::new();

    let resp = app
        .post(
            "/v1/register",
            None,
            json!({"email": "not-an-email", "first_name": "", "password": "123"}),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    let errors = resp.error();
    assert_eq!(errors["email"], "Must be a valid email address.");
    assert_eq!(errors["first_name"], "This field is required.");
    assert_eq!(errors["last_name"], "This field is required.");
    assert_eq!(
        errors["password"],
        "Value length must be greater than or equal to 6"
    );
    assert_eq!(errors["password_confirm"], "This field is required.");
}

#[tokio::test]
async fn test_malformed_json_is_a_generic_bad_request() {
    let app = TestApp::new();

    let request = Request::post("/v1/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let resp = app.send(request).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error(), "Invalid input data");
}

#[tokio::test]
async fn test_register_admin_requires_secret() {
    let app = TestApp::new();
    let body = |secret: &str| {
        json!({
            "email": "boss@example.com",
            "first_name": "Boss",
            "last_name": "Person",
            "password": PASSWORD,
            "password_confirm": PASSWORD,
            "secret_key": secret,
        })
    };

    let denied = app.post("/v1/register/admin", None, body("guess")).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.error(), "Invalid secret key for admin registration");

    let ok = app.post("/v1/register/admin", None, body(ADMIN_SECRET)).await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["msg"], "Registration successful");
    assert_eq!(ok.body["user"]["role"], "admin");
}

#[tokio::test]
async fn test_login_success_updates_last_login() {
    let app = TestApp::new();
    app.register_customer("login@example.com").await;

    let resp = app
        .post(
            "/v1/login",
            None,
            json!({"email": "Login@Example.com", "password": PASSWORD}),
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["msg"], "Login successful");
    assert!(resp.body["user"]["last_login"].is_string());
    assert!(resp.body["access_token"].is_string());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.register_customer("known@example.com").await;

    let wrong_password = app
        .post(
            "/v1/login",
            None,
            json!({"email": "known@example.com", "password": "not-it"}),
        )
        .await;
    let unknown_email = app
        .post(
            "/v1/login",
            None,
            json!({"email": "ghost@example.com", "password": PASSWORD}),
        )
        .await;

    for resp in [wrong_password, unknown_email] {
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
        assert_eq!(resp.error(), "Invalid credentials");
    }
}

#[tokio::test]
async fn test_refresh_issues_a_working_access_token() {
    let app = TestApp::new();
    let session = app.register_customer("refresh@example.com").await;

    let resp = app
        .post(
            "/v1/token/refresh",
            None,
            json!({"refresh_token": session.refresh_token}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["msg"], "Token refreshed successfully");

    let access = resp.body["access_token"].as_str().unwrap();
    let addresses = app.get("/v1/users/addresses", Some(access)).await;
    assert_eq!(addresses.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rejects_access_tokens() {
    let app = TestApp::new();
    let session = app.register_customer("wrongtype@example.com").await;

    let resp = app
        .post(
            "/v1/token/refresh",
            None,
            json!({"refresh_token": session.access_token}),
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error(), "Invalid or expired token");
}

#[tokio::test]
async fn test_refresh_token_does_not_authenticate_requests() {
    let app = TestApp::new();
    let session = app.register_customer("bearer@example.com").await;

    let resp = app
        .get("/v1/users/addresses", Some(&session.refresh_token))
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.error(), "Unauthenticated, login is required");
}

#[tokio::test]
async fn test_garbage_token_on_public_route_is_ignored() {
    let app = TestApp::new();

    let resp = app.get("/v1/products", Some("not-a-jwt")).await;

    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_addresses_are_scoped_to_caller() {
    let app = TestApp::new();
    let alice = app.register_customer("alice@example.com").await;
    let bob = app.register_customer("bob@example.com").await;

    let address_id = app.create_address(&alice).await;

    let mine = app.get("/v1/users/addresses", alice.token()).await;
    assert_eq!(mine.status, StatusCode::OK);
    let list = mine.body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], address_id);
    assert_eq!(list[0]["user_id"], alice.user_id);

    let theirs = app.get("/v1/users/addresses", bob.token()).await;
    assert_eq!(theirs.body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_address_requires_every_field() {
    let app = TestApp::new();
    let session = app.register_customer("partial@example.com").await;

    let resp = app
        .post(
            "/v1/addresses",
            session.token(),
            json!({"first_name": "P", "city": "Porto"}),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    let errors = resp.error().as_object().unwrap();
    for field in ["last_name", "country", "zip_code", "street_address"] {
        assert_eq!(errors[field], "This field is required.", "{field}");
    }
    assert!(!errors.contains_key("first_name"));
}
