//! Checkout error types.

use cart::CartError;
use catalog::CatalogError;
use thiserror::Error;

use crate::LineFailure;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("Your cart is empty. Add some products before checkout.")]
    EmptyCart,

    /// One or more lines cannot be fulfilled. Nothing was committed.
    #[error("{} cart line(s) cannot be fulfilled", .0.len())]
    InventoryConflict(Vec<LineFailure>),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl CheckoutError {
    /// Short label used as the `reason` on rejection metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            CheckoutError::EmptyCart => "empty_cart",
            CheckoutError::InventoryConflict(_) => "inventory_conflict",
            CheckoutError::Cart(_) | CheckoutError::Catalog(_) => "error",
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
