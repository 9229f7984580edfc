//! Results reported by cart operations.

use catalog::Money;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{CartItemId, ProductId, UserId};

/// Totals derived from current lines and current catalog prices.
///
/// Lines whose product no longer exists count toward neither field, so
/// `total_items` can be lower than [`Cart::total_items`](crate::Cart::total_items)
/// until the product is dropped from the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartTotals {
    pub total_items: u64,
    pub total_price: Money,
}

/// Outcome of adding a product to a cart.
///
/// The distinction between plain and adjusted outcomes drives what the
/// user is told, so callers must not collapse them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AddOutcome {
    /// A new line was created with the requested quantity.
    Created { item_id: CartItemId, quantity: u32 },
    /// An existing line was increased by the requested quantity.
    Updated { item_id: CartItemId, quantity: u32 },
    /// A new line was created, clamped to available inventory.
    AdjustedAndCreated {
        item_id: CartItemId,
        quantity: u32,
        available: u32,
    },
    /// An existing line was increased, clamped to available inventory.
    AdjustedAndUpdated {
        item_id: CartItemId,
        quantity: u32,
        available: u32,
    },
    /// The product is out of stock; the cart was not touched.
    Unavailable,
}

impl AddOutcome {
    /// Returns true unless the product was unavailable.
    pub fn is_success(&self) -> bool {
        !matches!(self, AddOutcome::Unavailable)
    }

    /// Returns true if the quantity was clamped to inventory.
    pub fn is_adjusted(&self) -> bool {
        matches!(
            self,
            AddOutcome::AdjustedAndCreated { .. } | AddOutcome::AdjustedAndUpdated { .. }
        )
    }

    /// Final quantity of the line, if one was written.
    pub fn quantity(&self) -> Option<u32> {
        match self {
            AddOutcome::Created { quantity, .. }
            | AddOutcome::Updated { quantity, .. }
            | AddOutcome::AdjustedAndCreated { quantity, .. }
            | AddOutcome::AdjustedAndUpdated { quantity, .. } => Some(*quantity),
            AddOutcome::Unavailable => None,
        }
    }

    /// ID of the line that was written, if any.
    pub fn item_id(&self) -> Option<CartItemId> {
        match self {
            AddOutcome::Created { item_id, .. }
            | AddOutcome::Updated { item_id, .. }
            | AddOutcome::AdjustedAndCreated { item_id, .. }
            | AddOutcome::AdjustedAndUpdated { item_id, .. } => Some(*item_id),
            AddOutcome::Unavailable => None,
        }
    }
}

/// Outcome of setting a line's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuantityOutcome {
    /// The quantity was set exactly as requested.
    Updated {
        item_id: CartItemId,
        quantity: u32,
        line_cost: Money,
    },
    /// The quantity was clamped to available inventory.
    Adjusted {
        item_id: CartItemId,
        quantity: u32,
        available: u32,
        line_cost: Money,
    },
    /// The line was deleted.
    Removed { item_id: CartItemId },
}

/// A cart mutation's outcome together with the notice to show the user and
/// the cart's recomputed totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mutation<O> {
    pub outcome: O,
    pub notice: String,
    pub totals: CartTotals,
}

/// A cart line joined with live product data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub item_id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_cost: Money,
    /// Units currently in stock.
    pub inventory: u32,
    pub added_at: DateTime<Utc>,
}

/// Full cart contents for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub user_id: UserId,
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lightweight cart summary: totals plus `(product, quantity)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartStatus {
    pub totals: CartTotals,
    pub items: Vec<(ProductId, u32)>,
}
