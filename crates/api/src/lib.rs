//! Storekeep API - JSON e-commerce backend.
//!
//! Accounts with bearer tokens, per-user shipping addresses, an admin-managed
//! product catalog, and order placement with a small status lifecycle.
//!
//! # Architecture
//!
//! - Axum router with a declarative route access table
//! - [`Store`](db::Store) trait object for persistence (`PostgreSQL` or in-memory)
//! - Argon2 password hashes, HS256 JWT access/refresh tokens
//! - `validator` rules on every request body
//!
//! The binary in `main.rs` wires [`app`] to a `PostgreSQL` pool; the
//! integration tests wire it to a [`MemoryStore`](db::MemoryStore).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, http::Request};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the full application router with its middleware stack.
///
/// Sentry layers are added by the binary, which owns the Sentry client.
pub fn app(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = tracing::field::Empty,
            user_id = tracing::field::Empty,
        )
    });

    routes::routes()
        .route_layer(axum::middleware::from_fn(middleware::enforce_policy))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::identity_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(trace)
        .with_state(state)
}
