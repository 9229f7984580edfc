//! Checkout for the storefront.
//!
//! Checkout runs in two phases. Validation checks every cart line against
//! current catalog data and collects all failures. Only if there are none
//! does the commit phase decrement stock for every line through
//! [`catalog::Catalog::commit_stock`], which applies all lines or none, and
//! then clear the cart.

pub mod error;
pub mod receipt;
pub mod service;
pub mod validation;

pub use error::{CheckoutError, Result};
pub use receipt::{CONFIRMATION, Receipt, ReceiptLine};
pub use service::CheckoutService;
pub use validation::{FailureReason, LineFailure, validate};
