use async_trait::async_trait;

use crate::{Account, Result, UserId};

/// An account together with its password hash, as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAccount {
    pub account: Account,
    pub password_hash: String,
}

/// Storage for accounts and sessions.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts a new account. Fails with `UsernameTaken` if the username is
    /// already in use.
    async fn insert(&self, account: StoredAccount) -> Result<()>;

    /// Looks up an account by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredAccount>>;

    /// Grants staff rights to an existing account.
    async fn grant_staff(&self, id: UserId) -> Result<()>;

    /// Records a session token for an account.
    async fn create_session(&self, token: &str, account_id: UserId) -> Result<()>;

    /// Resolves a session token to its account.
    async fn session_account(&self, token: &str) -> Result<Option<Account>>;

    /// Ends a session. Returns false if the token was unknown.
    async fn delete_session(&self, token: &str) -> Result<bool>;
}
