//! Storefront accounts.
//!
//! Accounts are identified by a [`UserId`], which is also the key of the
//! user's cart. Sessions are opaque bearer tokens mapped to an account.

pub mod account;
pub mod error;
pub mod memory;
pub mod password;
pub mod postgres;
pub mod service;
pub mod store;

pub use account::{Account, Session, validate_username};
pub use common::UserId;
pub use error::{AccountError, Result};
pub use memory::InMemoryAccountStore;
pub use postgres::PostgresAccountStore;
pub use service::AccountService;
pub use store::{AccountStore, StoredAccount};
