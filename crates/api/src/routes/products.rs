//! Public product listing.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use catalog::{CatalogError, Product, ProductFilter};

use super::parse_product_id;
use crate::AppState;
use crate::error::ApiError;

/// GET /products?category=: products in name order.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.catalog.list(filter).await?))
}

/// GET /products/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_product_id(&id)?;
    let product = state
        .catalog
        .find(id)
        .await?
        .ok_or(CatalogError::ProductNotFound(id))?;
    Ok(Json(product))
}
