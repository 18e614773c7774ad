//! Caller-scoped addresses.

use axum::{Json, extract::State, http::StatusCode};

use crate::error::Result;
use crate::extractors::ValidatedJson;
use crate::middleware::RequireAuth;
use crate::models::{Address, CreateAddressRequest};
use crate::state::AppState;

/// `GET /v1/users/addresses`
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Address>>> {
    Ok(Json(state.store().addresses_for_user(user.id).await?))
}

/// `POST /v1/addresses`
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidatedJson(req): ValidatedJson<CreateAddressRequest>,
) -> Result<(StatusCode, Json<Address>)> {
    let address = state.store().create_address(req.for_owner(user.id)).await?;
    tracing::info!(address_id = %address.id, user_id = %user.id, "Address created");
    Ok((StatusCode::CREATED, Json(address)))
}
