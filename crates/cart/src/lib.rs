//! Shopping cart for the storefront.
//!
//! This crate provides:
//! - the `Cart` aggregate (one per user, lines unique per product)
//! - the quantity clamp policy shared by the add and update paths
//! - the `CartStore` trait with in-memory and PostgreSQL implementations
//! - `CartService`, which applies mutations against live catalog data and
//!   reports recomputed totals after each one

pub mod cart;
pub mod error;
pub mod outcome;
pub mod quantity;
pub mod service;
pub mod store;

pub use cart::{Cart, CartItem};
pub use error::{CartError, Result};
pub use outcome::{AddOutcome, CartLine, CartStatus, CartTotals, CartView, Mutation, QuantityOutcome};
pub use service::CartService;
pub use store::{CartStore, InMemoryCartStore, PostgresCartStore};

pub use common::{CartItemId, ProductId, UserId};
