use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::CartStore;
use crate::{Cart, CartItemId, ProductId, Result, UserId};

/// In-memory cart store.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<UserId, Cart>>>,
}

impl InMemoryCartStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of carts created so far.
    pub async fn cart_count(&self) -> usize {
        self.carts.read().await.len()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn get_or_create(&self, user_id: UserId) -> Result<Cart> {
        if let Some(cart) = self.carts.read().await.get(&user_id) {
            return Ok(cart.clone());
        }

        let mut carts = self.carts.write().await;
        let cart = carts
            .entry(user_id)
            .or_insert_with(|| Cart::new(user_id, Utc::now()));
        Ok(cart.clone())
    }

    async fn save(&self, cart: &Cart) -> Result<()> {
        self.carts.write().await.insert(cart.user_id(), cart.clone());
        Ok(())
    }

    async fn clear(&self, user_id: UserId) -> Result<usize> {
        let mut carts = self.carts.write().await;
        Ok(carts
            .get_mut(&user_id)
            .map(|cart| cart.clear(Utc::now()))
            .unwrap_or(0))
    }

    async fn owner_of(&self, item_id: CartItemId) -> Result<Option<UserId>> {
        let carts = self.carts.read().await;
        Ok(carts
            .values()
            .find(|cart| cart.item(item_id).is_some())
            .map(Cart::user_id))
    }

    async fn remove_product(&self, product_id: ProductId) -> Result<u64> {
        let now = Utc::now();
        let mut carts = self.carts.write().await;
        let removed = carts
            .values_mut()
            .map(|cart| cart.remove_product(product_id, now))
            .filter(|removed| *removed)
            .count();
        Ok(removed as u64)
    }
}
