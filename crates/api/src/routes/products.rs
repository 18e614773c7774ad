//! Catalog handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use storekeep_core::ProductId;

use crate::error::{AppError, Result};
use crate::extractors::{PageMeta, PageQuery, PathId, ValidatedJson};
use crate::models::{Product, ProductPatch, ProductRequest, ProductUpdateRequest};
use crate::state::AppState;

const NOT_FOUND: &str = "Product not found";

/// Body of `GET /v1/products`.
#[derive(Debug, Serialize)]
pub struct ProductPage {
    #[serde(flatten)]
    pub meta: PageMeta,
    pub products: Vec<Product>,
}

/// `GET /v1/products`
pub async fn list(
    State(state): State<AppState>,
    PageQuery(page): PageQuery,
) -> Result<Json<ProductPage>> {
    let (products, total) = state.store().list_products(page).await?;
    Ok(Json(ProductPage {
        meta: PageMeta::new(page, total),
        products,
    }))
}

/// `GET /v1/products/{id}`
pub async fn show(
    State(state): State<AppState>,
    PathId(id): PathId<ProductId>,
) -> Result<Json<Product>> {
    state
        .store()
        .product_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_owned()))
}

/// `POST /v1/products`
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.store().create_product(req.into_new_product()).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /v1/products/{id}`: every field is required and overwritten.
pub async fn replace(
    State(state): State<AppState>,
    PathId(id): PathId<ProductId>,
    ValidatedJson(req): ValidatedJson<ProductRequest>,
) -> Result<Json<Product>> {
    apply(&state, id, ProductPatch::from(req.into_new_product())).await
}

/// `PATCH /v1/products/{id}`: only supplied fields change.
pub async fn update(
    State(state): State<AppState>,
    PathId(id): PathId<ProductId>,
    ValidatedJson(req): ValidatedJson<ProductUpdateRequest>,
) -> Result<Json<Product>> {
    apply(&state, id, ProductPatch::from(req)).await
}

/// `DELETE /v1/products/{id}`
pub async fn delete(
    State(state): State<AppState>,
    PathId(id): PathId<ProductId>,
) -> Result<StatusCode> {
    match state.store().delete_product(id).await {
        Ok(true) => {
            tracing::info!(product_id = %id, "Product deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(false) => Err(AppError::NotFound(NOT_FOUND.to_owned())),
        Err(crate::db::RepositoryError::InUse(_)) => Err(AppError::Conflict(
            "Product cannot be deleted, it is part of an existing order".to_owned(),
        )),
        Err(e) => Err(e.into()),
    }
}

async fn apply(state: &AppState, id: ProductId, patch: ProductPatch) -> Result<Json<Product>> {
    let product = state
        .store()
        .update_product(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_owned()))?;
    tracing::info!(product_id = %id, "Product updated");
    Ok(Json(product))
}
