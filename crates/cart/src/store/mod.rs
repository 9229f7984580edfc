//! Cart persistence.

mod memory;
mod postgres;

pub use memory::InMemoryCartStore;
pub use postgres::PostgresCartStore;

use async_trait::async_trait;

use crate::{Cart, CartItemId, ProductId, Result, UserId};

/// Keyed store mapping each user to their single cart.
///
/// Carts are created lazily: `get_or_create` is an atomic get-or-insert and
/// may be called on every access. A user only ever has one cart, so
/// `save` does not need optimistic concurrency: concurrent saves for the same
/// user are last-writer-wins, and a line is keyed by its product, so two
/// writers adding the same product end up sharing one line.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Returns the user's cart, creating an empty one if none exists.
    async fn get_or_create(&self, user_id: UserId) -> Result<Cart>;

    /// Persists the cart's lines and timestamps.
    async fn save(&self, cart: &Cart) -> Result<()>;

    /// Deletes every line of the user's cart, keeping the cart itself.
    ///
    /// Returns the number of lines deleted.
    async fn clear(&self, user_id: UserId) -> Result<usize>;

    /// Returns the user whose cart holds the given line.
    async fn owner_of(&self, item_id: CartItemId) -> Result<Option<UserId>>;

    /// Deletes every line referencing a product, across all carts.
    ///
    /// Returns the number of lines deleted.
    async fn remove_product(&self, product_id: ProductId) -> Result<u64>;
}
