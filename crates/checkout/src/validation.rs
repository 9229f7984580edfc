//! Checkout validation phase.

use std::collections::HashMap;

use cart::Cart;
use catalog::{Product, StockShortfall};
use common::ProductId;
use serde::Serialize;

/// Why a cart line cannot be fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The product was deleted from the catalog.
    Missing,
    /// The product has no stock left.
    Unavailable,
    /// The line asks for more than is in stock.
    Insufficient { requested: u32, available: u32 },
}

/// A cart line that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineFailure {
    pub product_id: ProductId,
    pub reason: FailureReason,
    /// Message suitable for showing to the user.
    pub message: String,
}

impl LineFailure {
    fn new(product_id: ProductId, name: Option<&str>, reason: FailureReason) -> Self {
        let name = name.unwrap_or("A product in your cart");
        let message = match reason {
            FailureReason::Missing | FailureReason::Unavailable => {
                format!("{name} is no longer available.")
            }
            FailureReason::Insufficient { available, .. } => {
                format!("Sorry, only {available} units of {name} available.")
            }
        };
        Self {
            product_id,
            reason,
            message,
        }
    }

    /// Converts a shortfall reported by the catalog at commit time.
    pub fn from_shortfall(shortfall: &StockShortfall, name: Option<&str>) -> Self {
        let reason = match shortfall.available {
            None => FailureReason::Missing,
            Some(0) => FailureReason::Unavailable,
            Some(available) => FailureReason::Insufficient {
                requested: shortfall.requested,
                available,
            },
        };
        Self::new(shortfall.product_id, name, reason)
    }
}

/// Checks every line of `cart` against `products` and returns all failures.
///
/// Does not stop at the first failure.
pub fn validate(cart: &Cart, products: &HashMap<ProductId, Product>) -> Vec<LineFailure> {
    cart.items()
        .iter()
        .filter_map(|item| match products.get(&item.product_id) {
            None => Some(LineFailure::new(
                item.product_id,
                None,
                FailureReason::Missing,
            )),
            Some(product) if !product.is_available() => Some(LineFailure::new(
                item.product_id,
                Some(&product.name),
                FailureReason::Unavailable,
            )),
            Some(product) if item.quantity > product.inventory => Some(LineFailure::new(
                item.product_id,
                Some(&product.name),
                FailureReason::Insufficient {
                    requested: item.quantity,
                    available: product.inventory,
                },
            )),
            Some(_) => None,
        })
        .collect()
}
