//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. Request ID (propagate or generate `x-request-id`)
//! 3. `TraceLayer` (request span)
//! 4. Identity (resolve the bearer token to a [`CurrentUser`])
//! 5. Policy (enforce the route access table)
//!
//! Identity and policy are route layers, so they only run for requests
//! that matched a route.

pub mod auth;
pub mod policy;
pub mod request_id;

pub use auth::{CurrentUser, OptionalAuth, RequireAuth, identity_middleware};
pub use policy::{Access, enforce_policy};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
