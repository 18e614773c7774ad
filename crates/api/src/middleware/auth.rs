//! Bearer identity middleware and extractors.
//!
//! [`identity_middleware`] never rejects a request. A missing, malformed,
//! or expired token, or one naming a deleted user, is logged at `debug`
//! and the request continues anonymously. Rejection is the job of
//! [`enforce_policy`](super::policy::enforce_policy) and of the
//! [`RequireAuth`] extractor.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, UNAUTHENTICATED, set_sentry_user};
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

/// The authenticated caller, stored in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Resolve the `Authorization` header to a [`CurrentUser`] when possible.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    if let Some(bearer) = bearer {
        let auth = AuthService::new(state.store(), &state.config().auth);
        match auth.authenticate(&bearer).await {
            Ok(user) => {
                tracing::Span::current().record("user_id", user.id.as_i32());
                set_sentry_user(&user.id, Some(user.email.as_str()));
                request.extensions_mut().insert(CurrentUser(user));
            }
            Err(e) => tracing::debug!(error = %e, "Proceeding without identity"),
        }
    }

    next.run(request).await
}

/// Extractor that requires an authenticated caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> String {
///     format!("Hello, {}!", user.first_name)
/// }
/// ```
pub struct RequireAuth(pub User);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .map(|current| Self(current.0.clone()))
            .ok_or_else(|| AppError::Unauthorized(UNAUTHENTICATED.to_owned()))
    }
}

/// Extractor that optionally gets the caller.
pub struct OptionalAuth(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .extensions
                .get::<CurrentUser>()
                .map(|current| current.0.clone()),
        ))
    }
}
