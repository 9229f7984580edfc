use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    CatalogError, NewProduct, Product, ProductFilter, ProductId, Result, StockShortfall,
    store::{Catalog, StockLine, normalize_lines},
};

/// In-memory catalog.
///
/// Stock mutations run under the write lock, which serializes every
/// read-check-decrement sequence.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of products.
    pub async fn product_count(&self) -> usize {
        self.products.read().await.len()
    }
}

fn new_inventory(product: &Product, delta: i64) -> Result<u32> {
    match i64::from(product.inventory).checked_add(delta) {
        Some(next) if next < 0 => Err(CatalogError::InsufficientStock {
            product_id: product.id,
            requested: u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX),
            available: product.inventory,
        }),
        Some(next) => u32::try_from(next).map_err(|_| CatalogError::inventory_out_of_range()),
        None => Err(CatalogError::inventory_out_of_range()),
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn find(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        let mut matching: Vec<_> = products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(matching)
    }

    async fn create(&self, new: NewProduct) -> Result<Product> {
        let new = new.validate()?;
        let product = Product::from_new(ProductId::new(), new, Utc::now());
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        tracing::debug!(product_id = %product.id, name = %product.name, "product created");
        Ok(product)
    }

    async fn update(&self, id: ProductId, changes: NewProduct) -> Result<Product> {
        let changes = changes.validate()?;
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or(CatalogError::ProductNotFound(id))?;
        product.apply(changes, Utc::now());
        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<()> {
        self.products
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(CatalogError::ProductNotFound(id))
    }

    async fn update_stock(&self, id: ProductId, delta: i64) -> Result<u32> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or(CatalogError::ProductNotFound(id))?;
        let inventory = new_inventory(product, delta)?;
        product.inventory = inventory;
        product.updated_at = Utc::now();
        Ok(inventory)
    }

    async fn commit_stock(&self, lines: &[StockLine]) -> Result<()> {
        let lines = normalize_lines(lines);
        let mut products = self.products.write().await;

        let shortfalls: Vec<StockShortfall> = lines
            .iter()
            .filter_map(|line| match products.get(&line.product_id) {
                Some(p) if p.inventory >= line.quantity => None,
                found => Some(StockShortfall {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: found.map(|p| p.inventory),
                }),
            })
            .collect();

        if !shortfalls.is_empty() {
            metrics::counter!("stock_commit_conflicts_total").increment(1);
            return Err(CatalogError::StockConflict(shortfalls));
        }

        let now = Utc::now();
        for line in &lines {
            if let Some(product) = products.get_mut(&line.product_id) {
                product.inventory -= line.quantity;
                product.updated_at = now;
            }
        }
        Ok(())
    }
}
