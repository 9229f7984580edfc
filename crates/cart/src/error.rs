//! Cart error types.

use catalog::CatalogError;
use thiserror::Error;

use crate::{CartItemId, ProductId};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The requested product does not exist in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The cart item does not exist.
    #[error("Cart item not found: {0}")]
    ItemNotFound(CartItemId),

    /// The cart item belongs to another user's cart.
    #[error("Cart item {item_id} does not belong to this cart")]
    Forbidden { item_id: CartItemId },

    /// Quantity input could not be interpreted as a number.
    #[error("Invalid quantity: {0:?}")]
    InvalidQuantity(String),

    /// Catalog lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A database error occurred in the cart store.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for cart results.
pub type Result<T> = std::result::Result<T, CartError>;
