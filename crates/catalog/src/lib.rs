//! Product catalog for the storefront.
//!
//! The catalog is the single owner of product prices and inventory. Carts
//! read from it on every computation and checkout mutates stock only through
//! [`Catalog::update_stock`] and [`Catalog::commit_stock`], both of which are
//! atomic and refuse to drive inventory below zero.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod product;
pub mod store;
pub mod value_objects;

pub use common::ProductId;
pub use error::{CatalogError, Result};
pub use memory::InMemoryCatalog;
pub use postgres::PostgresCatalog;
pub use product::{MAX_PRICE_CENTS, NewProduct, Product, ProductFilter};
pub use store::{Catalog, StockLine, StockShortfall};
pub use value_objects::{Category, Money};
