//! Registration, login, and token refresh.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::Result;
use crate::extractors::ValidatedJson;
use crate::models::{
    LoginRequest, RefreshTokenRequest, RegisterAdminRequest, RegisterRequest, User,
};
use crate::services::{AuthService, Authenticated};
use crate::state::AppState;

/// Body returned by every route that issues tokens.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub msg: &'static str,
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

impl AuthResponse {
    fn new(msg: &'static str, auth: Authenticated) -> Json<Self> {
        Json(Self {
            msg,
            user: auth.user,
            access_token: auth.tokens.access_token,
            refresh_token: auth.tokens.refresh_token,
        })
    }
}

/// `POST /v1/register`
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.store(), &state.config().auth)
        .register(req.into_registration())
        .await?;
    Ok(AuthResponse::new("Account registered successfully", auth))
}

/// `POST /v1/register/admin`
pub async fn register_admin(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterAdminRequest>,
) -> Result<Json<AuthResponse>> {
    let (registration, secret_key) = req.into_parts();
    let auth = AuthService::new(state.store(), &state.config().auth)
        .register_admin(registration, &secret_key)
        .await?;
    Ok(AuthResponse::new("Registration successful", auth))
}

/// `POST /v1/login`
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.store(), &state.config().auth)
        .login(
            req.email.as_deref().unwrap_or_default(),
            req.password.as_deref().unwrap_or_default(),
        )
        .await?;
    tracing::info!(user_id = %auth.user.id, "User logged in");
    Ok(AuthResponse::new("Login successful", auth))
}

/// `POST /v1/token/refresh`
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.store(), &state.config().auth)
        .refresh(req.refresh_token.as_deref().unwrap_or_default())
        .await?;
    Ok(AuthResponse::new("Token refreshed successfully", auth))
}
