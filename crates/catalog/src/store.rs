use async_trait::async_trait;
use serde::Serialize;

use crate::{NewProduct, Product, ProductFilter, ProductId, Result};

/// One line of a batch stock commit: take `quantity` units of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl StockLine {
    /// Creates a stock line.
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Why a line of a batch commit could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockShortfall {
    pub product_id: ProductId,
    pub requested: u32,
    /// Units on hand at commit time; `None` if the product no longer exists.
    pub available: Option<u32>,
}

/// Core trait for catalog implementations.
///
/// All implementations must be thread-safe (Send + Sync). Stock mutations
/// must be atomic with respect to each other: a read-check-decrement for a
/// product never interleaves with another one for the same product.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Looks up a product by ID.
    async fn find(&self, id: ProductId) -> Result<Option<Product>>;

    /// Lists products matching the filter, ordered by name.
    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>>;

    /// Adds a product to the catalog.
    async fn create(&self, new: NewProduct) -> Result<Product>;

    /// Replaces the editable fields of an existing product.
    async fn update(&self, id: ProductId, changes: NewProduct) -> Result<Product>;

    /// Removes a product from the catalog.
    async fn delete(&self, id: ProductId) -> Result<()>;

    /// Adjusts inventory by `delta` and returns the new inventory.
    ///
    /// Fails with `InsufficientStock` instead of going below zero; in that
    /// case inventory is left untouched.
    async fn update_stock(&self, id: ProductId, delta: i64) -> Result<u32>;

    /// Decrements inventory for every line, all or nothing.
    ///
    /// Every line is re-validated against current inventory inside the same
    /// atomic section that applies the decrements. If any line cannot be
    /// satisfied, nothing is applied and `StockConflict` lists every
    /// shortfall.
    async fn commit_stock(&self, lines: &[StockLine]) -> Result<()>;
}

/// Merges lines for the same product and orders them by product ID.
///
/// Implementations lock rows in this order so concurrent commits over
/// overlapping products cannot deadlock.
pub(crate) fn normalize_lines(lines: &[StockLine]) -> Vec<StockLine> {
    let mut merged: Vec<StockLine> = Vec::with_capacity(lines.len());
    let mut sorted = lines.to_vec();
    sorted.sort_by_key(|line| line.product_id);
    for line in sorted {
        match merged.last_mut() {
            Some(last) if last.product_id == line.product_id => {
                last.quantity = last.quantity.saturating_add(line.quantity);
            }
            _ => merged.push(line),
        }
    }
    merged
}
