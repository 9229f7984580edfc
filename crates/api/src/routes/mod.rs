//! HTTP route handlers.

pub mod admin;
pub mod cart;
pub mod health;
pub mod metrics;
pub mod products;
pub mod users;

use catalog::ProductId;

use crate::error::ApiError;

/// Parses a product ID from a path segment.
pub(crate) fn parse_product_id(raw: &str) -> Result<ProductId, ApiError> {
    ProductId::parse_str(raw)
        .map_err(|e| ApiError::BadRequest(format!("Invalid product id: {e}")))
}
