use thiserror::Error;

use crate::{ProductId, StockShortfall};

/// Errors that can occur when reading or mutating the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product exists with the given ID.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// A stock adjustment would have made inventory negative.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// A batch stock commit was rejected because at least one line could
    /// not be satisfied. No line of the batch was applied.
    #[error("Stock commit rejected for {} product(s)", .0.len())]
    StockConflict(Vec<StockShortfall>),

    /// Product fields failed validation.
    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    /// A stored row could not be decoded into a product.
    #[error("Corrupt product record: {0}")]
    Decode(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CatalogError {
    /// A stock adjustment would push inventory past `u32::MAX`.
    pub fn inventory_out_of_range() -> Self {
        CatalogError::InvalidProduct("inventory out of range".to_string())
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
