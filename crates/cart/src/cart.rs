//! Cart aggregate.

use catalog::Money;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{CartError, CartItemId, ProductId, Result, UserId};

/// One line of a cart: a product and how many units of it the user wants.
///
/// `quantity` is always at least 1; a line that would drop to zero is
/// removed from the cart instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

/// Cart aggregate root.
///
/// Owned by exactly one user and exclusively owns its lines. Prices are
/// never stored here; totals are computed against live catalog prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    user_id: UserId,
    items: Vec<CartItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

// Query methods
impl Cart {
    /// Creates an empty cart for a user.
    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a cart from persisted state.
    pub fn from_parts(
        user_id: UserId,
        items: Vec<CartItem>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            items,
            created_at,
            updated_at,
        }
    }

    /// Returns the owning user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns all lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns a line by its ID.
    pub fn item(&self, item_id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    /// Returns the line for a product, if any.
    pub fn item_for_product(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the sum of all line quantities.
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sums `quantity x price` over all lines using the given price lookup.
    ///
    /// Lines whose product has no price (e.g. deleted products) contribute
    /// nothing.
    pub fn total_price(&self, price_of: impl Fn(ProductId) -> Option<Money>) -> Money {
        self.items
            .iter()
            .filter_map(|i| price_of(i.product_id).map(|p| p.multiply(i.quantity)))
            .sum()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

// Mutation methods
impl Cart {
    /// Sets the line for `product_id` to exactly `quantity`, creating it if
    /// needed. A quantity of zero removes the line.
    ///
    /// Returns the ID of the line, or `None` if it was removed.
    pub fn put(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Option<CartItemId> {
        self.updated_at = now;
        let position = self.items.iter().position(|i| i.product_id == product_id);

        match (position, quantity) {
            (Some(pos), 0) => {
                self.items.remove(pos);
                None
            }
            (Some(pos), q) => {
                let item = &mut self.items[pos];
                item.quantity = q;
                Some(item.id)
            }
            (None, 0) => None,
            (None, q) => {
                let id = CartItemId::new();
                self.items.push(CartItem {
                    id,
                    product_id,
                    quantity: q,
                    added_at: now,
                });
                Some(id)
            }
        }
    }

    /// Sets the quantity of an existing line. Zero removes the line.
    pub fn set_quantity(
        &mut self,
        item_id: CartItemId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let product_id = self
            .item(item_id)
            .map(|i| i.product_id)
            .ok_or(CartError::ItemNotFound(item_id))?;
        self.put(product_id, quantity, now);
        Ok(())
    }

    /// Removes a line and returns it.
    pub fn remove(&mut self, item_id: CartItemId, now: DateTime<Utc>) -> Result<CartItem> {
        let pos = self
            .items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or(CartError::ItemNotFound(item_id))?;
        self.updated_at = now;
        Ok(self.items.remove(pos))
    }

    /// Removes the line for a product, if present. Returns true if a line
    /// was removed.
    pub fn remove_product(&mut self, product_id: ProductId, now: DateTime<Utc>) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        let removed = self.items.len() != before;
        if removed {
            self.updated_at = now;
        }
        removed
    }

    /// Removes every line and returns how many there were.
    pub fn clear(&mut self, now: DateTime<Utc>) -> usize {
        let removed = self.items.len();
        self.items.clear();
        self.updated_at = now;
        removed
    }
}
