use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Account, AccountError, AccountStore, Result, StoredAccount, UserId};

#[derive(Default)]
struct State {
    /// Keyed by username.
    accounts: HashMap<String, StoredAccount>,
    sessions: HashMap<String, UserId>,
}

/// In-memory account store.
#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryAccountStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.state.read().await.sessions.len()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert(&self, account: StoredAccount) -> Result<()> {
        let mut state = self.state.write().await;
        let username = account.account.username.clone();
        if state.accounts.contains_key(&username) {
            return Err(AccountError::UsernameTaken(username));
        }
        state.accounts.insert(username, account);
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<StoredAccount>> {
        Ok(self.state.read().await.accounts.get(username).cloned())
    }

    async fn grant_staff(&self, id: UserId) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(stored) = state.accounts.values_mut().find(|s| s.account.id == id) {
            stored.account.is_staff = true;
        }
        Ok(())
    }

    async fn create_session(&self, token: &str, account_id: UserId) -> Result<()> {
        self.state
            .write()
            .await
            .sessions
            .insert(token.to_string(), account_id);
        Ok(())
    }

    async fn session_account(&self, token: &str) -> Result<Option<Account>> {
        let state = self.state.read().await;
        let Some(id) = state.sessions.get(token) else {
            return Ok(None);
        };
        Ok(state
            .accounts
            .values()
            .find(|s| s.account.id == *id)
            .map(|s| s.account.clone()))
    }

    async fn delete_session(&self, token: &str) -> Result<bool> {
        Ok(self.state.write().await.sessions.remove(token).is_some())
    }
}
