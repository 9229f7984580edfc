//! Shared identifier types for the storefront crates.

mod types;

pub use types::{CartItemId, ProductId, UserId};
