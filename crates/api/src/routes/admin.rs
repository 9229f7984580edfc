//! Staff-only product management.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog::{NewProduct, Product, ProductFilter, ProductId};
use serde::{Deserialize, Serialize};

use super::parse_product_id;
use crate::AppState;
use crate::auth::StaffUser;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct StockRequest {
    /// Units to add; negative to remove.
    pub delta: i64,
}

#[derive(Serialize)]
pub struct StockResponse {
    pub product_id: ProductId,
    pub inventory: u32,
}

/// GET /admin/products
pub async fn list(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.catalog.list(ProductFilter::all()).await?))
}

/// POST /admin/products
#[tracing::instrument(skip_all, fields(name = %req.name))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Json(req): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.catalog.create(req).await?;
    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /admin/products/{id}: replace every editable field.
#[tracing::instrument(skip(state, _staff, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<String>,
    Json(req): Json<NewProduct>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_product_id(&id)?;
    Ok(Json(state.catalog.update(id, req).await?))
}

/// DELETE /admin/products/{id}: also drops the product from every cart.
#[tracing::instrument(skip(state, _staff))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_product_id(&id)?;
    state.catalog.delete(id).await?;
    state.carts.forget_product(id).await?;
    tracing::info!(product_id = %id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/products/{id}/stock
#[tracing::instrument(skip(state, _staff, req), fields(delta = req.delta))]
pub async fn adjust_stock(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<String>,
    Json(req): Json<StockRequest>,
) -> Result<Json<StockResponse>, ApiError> {
    let product_id = parse_product_id(&id)?;
    let inventory = state.catalog.update_stock(product_id, req.delta).await?;
    Ok(Json(StockResponse {
        product_id,
        inventory,
    }))
}
