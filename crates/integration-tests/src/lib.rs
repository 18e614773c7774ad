//! Integration tests for Storekeep.
//!
//! Every test builds the full router (middleware stack included) over a
//! fresh [`MemoryStore`] and drives it with `tower::ServiceExt::oneshot`, so
//! no database or listening socket is needed.
//!
//! ```bash
//! cargo test -p storekeep-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{Value, json};
use storekeep_api::{
    app,
    config::{ApiConfig, AuthConfig},
    db::MemoryStore,
    state::AppState,
};
use tower::ServiceExt;

/// Admin registration key used by every test app.
pub const ADMIN_SECRET: &str = "integration-admin-key";

/// Password used by the registration helpers.
pub const PASSWORD: &str = "secret1";

/// A router wired to an in-memory store the test can inspect.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
}

/// Status, headers, and decoded body of one response.
///
/// JSON bodies are parsed; anything else is kept as a string and an empty
/// body becomes `Value::Null`.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `error` field of an error body.
    #[must_use]
    pub fn error(&self) -> &Value {
        &self.body["error"]
    }
}

/// Tokens and id of a freshly registered account.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: String,
}

impl Session {
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        Some(&self.access_token)
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let auth = AuthConfig::new(
            SecretString::from("integration-test-signing-key"),
            SecretString::from(ADMIN_SECRET),
        );
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(ApiConfig::without_database(auth), store.clone());
        Self {
            router: app(state),
            store,
        }
    }

    /// Send a request, optionally authenticated and with a JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    /// Send a prebuilt request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Register a customer with [`PASSWORD`].
    pub async fn register_customer(&self, email: &str) -> Session {
        let resp = self
            .post(
                "/v1/register",
                None,
                json!({
                    "email": email,
                    "first_name": "Test",
                    "last_name": "Customer",
                    "password": PASSWORD,
                    "password_confirm": PASSWORD,
                }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "register failed: {:?}", resp.body);
        session_from(&resp.body)
    }

    /// Register an admin with [`PASSWORD`] and the configured admin key.
    pub async fn register_admin(&self, email: &str) -> Session {
        let resp = self
            .post(
                "/v1/register/admin",
                None,
                json!({
                    "email": email,
                    "first_name": "Test",
                    "last_name": "Admin",
                    "password": PASSWORD,
                    "password_confirm": PASSWORD,
                    "secret_key": ADMIN_SECRET,
                }),
            )
            .await;
        assert_eq!(
            resp.status,
            StatusCode::OK,
            "admin register failed: {:?}",
            resp.body
        );
        session_from(&resp.body)
    }

    /// Create a product as `admin` and return its id.
    pub async fn create_product(&self, admin: &Session, name: &str, price: f64, stock: i32) -> i64 {
        let resp = self
            .post(
                "/v1/products",
                admin.token(),
                json!({
                    "name": name,
                    "category": "test",
                    "description": format!("{name} description"),
                    "price": price,
                    "stock": stock,
                }),
            )
            .await;
        assert_eq!(
            resp.status,
            StatusCode::CREATED,
            "create product failed: {:?}",
            resp.body
        );
        resp.body["id"].as_i64().unwrap()
    }

    /// Create an address for the session's user and return its id.
    pub async fn create_address(&self, session: &Session) -> i64 {
        let resp = self
            .post(
                "/v1/addresses",
                session.token(),
                json!({
                    "first_name": "Test",
                    "last_name": "Customer",
                    "city": "Lisbon",
                    "country": "PT",
                    "zip_code": "1100-001",
                    "street_address": "Rua Augusta 1",
                }),
            )
            .await;
        assert_eq!(
            resp.status,
            StatusCode::CREATED,
            "create address failed: {:?}",
            resp.body
        );
        resp.body["id"].as_i64().unwrap()
    }

    /// Place an order of `(product_id, quantity)` lines.
    pub async fn place_order(
        &self,
        session: &Session,
        address_id: i64,
        lines: &[(i64, i64)],
    ) -> TestResponse {
        let items: Vec<Value> = lines
            .iter()
            .map(|(product_id, quantity)| json!({"product_id": product_id, "quantity": quantity}))
            .collect();
        self.post(
            "/v1/orders",
            session.token(),
            json!({"address_id": address_id, "order_items": items}),
        )
        .await
    }
}

fn session_from(body: &Value) -> Session {
    Session {
        user_id: body["user"]["id"].as_i64().unwrap(),
        access_token: body["access_token"].as_str().unwrap().to_owned(),
        refresh_token: body["refresh_token"].as_str().unwrap().to_owned(),
    }
}
