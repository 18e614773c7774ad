//! Route access policy.
//!
//! Access levels are declared once, in [`ROUTE_POLICIES`], keyed on the HTTP
//! method and the matched route pattern. [`enforce_policy`] evaluates the
//! table for every routed request before the handler runs:
//!
//! | Access | No identity | Customer | Admin |
//! |---|---|---|---|
//! | `Public` | pass | pass | pass |
//! | `Authenticated` | 401 | pass | pass |
//! | `Admin` | 401 | 403 | pass |
//!
//! Routes missing from the table require authentication.
//!
//! Ownership depends on the stored resource, so it is checked later by the
//! predicates at the bottom of this module.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use storekeep_core::UserId;

use super::auth::OptionalAuth;
use crate::error::{AppError, UNAUTHENTICATED};
use crate::models::{Order, User};

/// Who may call a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    /// Admins only; non-admins get 403 with `denied` as the message.
    Admin { denied: &'static str },
}

/// One row of the access table.
#[derive(Debug, Clone, Copy)]
pub struct RoutePolicy {
    pub method: &'static str,
    pub path: &'static str,
    pub access: Access,
}

const fn rule(method: &'static str, path: &'static str, access: Access) -> RoutePolicy {
    RoutePolicy {
        method,
        path,
        access,
    }
}

/// The access table for every route the API serves.
pub const ROUTE_POLICIES: &[RoutePolicy] = &[
    rule("GET", "/health", Access::Public),
    rule("GET", "/health/ready", Access::Public),
    rule("POST", "/v1/register", Access::Public),
    rule("POST", "/v1/register/admin", Access::Public),
    rule("POST", "/v1/login", Access::Public),
    rule("POST", "/v1/token/refresh", Access::Public),
    rule("GET", "/v1/products", Access::Public),
    rule("GET", "/v1/products/{id}", Access::Public),
    rule("GET", "/v1/users/addresses", Access::Authenticated),
    rule("POST", "/v1/addresses", Access::Authenticated),
    rule("POST", "/v1/orders", Access::Authenticated),
    rule("GET", "/v1/orders/{id}", Access::Authenticated),
    rule("PATCH", "/v1/orders/{id}/cancel", Access::Authenticated),
    rule(
        "POST",
        "/v1/products",
        Access::Admin {
            denied: "Unauthorized access, only admins can create products",
        },
    ),
    rule(
        "PUT",
        "/v1/products/{id}",
        Access::Admin {
            denied: "Unauthorized access, only admins can update products",
        },
    ),
    rule(
        "PATCH",
        "/v1/products/{id}",
        Access::Admin {
            denied: "Unauthorized access, only admins can patch products",
        },
    ),
    rule(
        "DELETE",
        "/v1/products/{id}",
        Access::Admin {
            denied: "Unauthorized access, only admins can delete products",
        },
    ),
    rule(
        "PATCH",
        "/v1/orders/{id}/status",
        Access::Admin {
            denied: "Unauthorized, only admins can update order status",
        },
    ),
];

/// Look up the access level for a method and matched route pattern.
#[must_use]
pub fn required_access(method: &str, path: &str) -> Access {
    ROUTE_POLICIES
        .iter()
        .find(|p| p.method == method && p.path == path)
        .map_or(Access::Authenticated, |p| p.access)
}

/// Decide whether `caller` may proceed under `access`.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` without an identity on a protected route
/// and `AppError::Forbidden` for a non-admin on an admin route.
pub fn check_access(access: Access, caller: Option<&User>) -> Result<(), AppError> {
    match (access, caller) {
        (Access::Public, _) => Ok(()),
        (_, None) => Err(AppError::Unauthorized(UNAUTHENTICATED.to_owned())),
        (Access::Authenticated, Some(_)) => Ok(()),
        (Access::Admin { denied }, Some(user)) => {
            if user.is_admin() {
                Ok(())
            } else {
                Err(AppError::Forbidden(denied.to_owned()))
            }
        }
    }
}

/// Middleware that enforces [`ROUTE_POLICIES`].
///
/// Must be installed as a route layer so the matched path is known.
///
/// # Errors
///
/// Returns the rejection from [`check_access`].
pub async fn enforce_policy(
    matched: Option<MatchedPath>,
    OptionalAuth(caller): OptionalAuth,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(matched) = matched {
        let access = required_access(request.method().as_str(), matched.as_str());
        if let Err(rejection) = check_access(access, caller.as_ref()) {
            tracing::debug!(
                method = %request.method(),
                route = matched.as_str(),
                "Request rejected by route policy"
            );
            return Err(rejection);
        }
    }
    Ok(next.run(request).await)
}

// =============================================================================
// Ownership predicates
// =============================================================================

/// A user's order history is visible to that user and to admins.
#[must_use]
pub fn can_view_orders(caller: &User, owner: UserId) -> bool {
    caller.id == owner || caller.is_admin()
}

/// Only the owner may cancel an order. Admins have no override here.
#[must_use]
pub fn can_cancel(caller: &User, order: &Order) -> bool {
    caller.id == order.user_id
}
