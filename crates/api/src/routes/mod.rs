//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness probe
//! GET    /health/ready            - Readiness probe (store ping)
//!
//! # Accounts
//! POST   /v1/register             - Register a customer
//! POST   /v1/register/admin       - Register an admin (shared secret)
//! POST   /v1/login                - Exchange credentials for tokens
//! POST   /v1/token/refresh        - Exchange a refresh token for a new pair
//!
//! # Addresses (authenticated)
//! GET    /v1/users/addresses      - Caller's addresses
//! POST   /v1/addresses            - Add an address for the caller
//!
//! # Catalog (reads public, writes admin)
//! GET    /v1/products             - Paginated listing
//! GET    /v1/products/{id}        - Product detail
//! POST   /v1/products             - Create
//! PUT    /v1/products/{id}        - Replace
//! PATCH  /v1/products/{id}        - Merge supplied fields
//! DELETE /v1/products/{id}        - Delete
//!
//! # Orders (authenticated)
//! POST   /v1/orders               - Place an order
//! GET    /v1/orders/{id}          - Paginated orders of user {id}
//! PATCH  /v1/orders/{id}/cancel   - Cancel own pending order
//! PATCH  /v1/orders/{id}/status   - Set status (admin)
//! ```
//!
//! Access levels for every route live in
//! [`middleware::policy`](crate::middleware::policy).

pub mod addresses;
pub mod auth;
pub mod health;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Account routes.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/register", post(auth::register))
        .route("/v1/register/admin", post(auth::register_admin))
        .route("/v1/login", post(auth::login))
        .route("/v1/token/refresh", post(auth::refresh))
}

/// Address routes.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/users/addresses", get(addresses::list))
        .route("/v1/addresses", post(addresses::create))
}

/// Catalog routes.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/products", get(products::list).post(products::create))
        .route(
            "/v1/products/{id}",
            get(products::show)
                .put(products::replace)
                .patch(products::update)
                .delete(products::delete),
        )
}

/// Order routes.
///
/// `GET /v1/orders/{id}` takes a user id while the `PATCH` routes take an
/// order id; both share the `{id}` segment so the patterns do not collide.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", post(orders::place))
        .route("/v1/orders/{id}", get(orders::list_for_user))
        .route("/v1/orders/{id}/cancel", patch(orders::cancel))
        .route("/v1/orders/{id}/status", patch(orders::update_status))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(auth_routes())
        .merge(address_routes())
        .merge(product_routes())
        .merge(order_routes())
}
