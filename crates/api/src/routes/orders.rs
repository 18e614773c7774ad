//! Order handlers. The workflows live in [`OrderService`].

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use storekeep_core::{AddressId, OrderId, UserId};

use crate::error::Result;
use crate::extractors::{PageMeta, PageQuery, PathId, ValidatedJson};
use crate::middleware::RequireAuth;
use crate::models::{OrderDetails, PlaceOrderRequest, UpdateOrderStatusRequest};
use crate::services::OrderService;
use crate::state::AppState;

/// Body of `GET /v1/orders/{id}`.
#[derive(Debug, Serialize)]
pub struct OrderPage {
    #[serde(flatten)]
    pub meta: PageMeta,
    pub orders: Vec<OrderDetails>,
}

/// `POST /v1/orders`
pub async fn place(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidatedJson(req): ValidatedJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderDetails>)> {
    let address_id = req.address_id.unwrap_or(AddressId::new(0));
    let lines = req.order_items.unwrap_or_default();
    let order = OrderService::new(state.store())
        .place_order(&user, address_id, &lines)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /v1/orders/{id}` where `{id}` is the owning user.
pub async fn list_for_user(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathId(owner): PathId<UserId>,
    PageQuery(page): PageQuery,
) -> Result<Json<OrderPage>> {
    let (orders, total) = OrderService::new(state.store())
        .list_for_user(&user, owner, page)
        .await?;
    Ok(Json(OrderPage {
        meta: PageMeta::new(page, total),
        orders,
    }))
}

/// `PATCH /v1/orders/{id}/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathId(id): PathId<OrderId>,
) -> Result<Json<OrderDetails>> {
    let order = OrderService::new(state.store()).cancel(&user, id).await?;
    Ok(Json(order))
}

/// `PATCH /v1/orders/{id}/status`
pub async fn update_status(
    State(state): State<AppState>,
    PathId(id): PathId<OrderId>,
    ValidatedJson(req): ValidatedJson<UpdateOrderStatusRequest>,
) -> Result<Json<OrderDetails>> {
    let order = OrderService::new(state.store())
        .update_status(id, req.status.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(order))
}
