use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    Account, AccountError, AccountStore, Result, Session, StoredAccount, UserId,
    password::{MIN_PASSWORD_LEN, hash_password, verify_password},
    validate_username,
};

/// Signup, login and session handling.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Registers a new customer account and logs it in.
    #[tracing::instrument(skip(self, password, confirmation))]
    pub async fn signup(&self, username: &str, password: &str, confirmation: &str) -> Result<Session> {
        let account = self.register(username, password, confirmation, false).await?;
        metrics::counter!("accounts_created_total").increment(1);
        tracing::info!(user_id = %account.id, "account created");
        self.start_session(account).await
    }

    /// Logs in with a username and password.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let stored = self
            .store
            .find_by_username(username)
            .await?
            .filter(|s| verify_password(password, &s.password_hash))
            .ok_or(AccountError::InvalidCredentials)?;
        self.start_session(stored.account).await
    }

    /// Ends a session. Unknown tokens are ignored.
    #[tracing::instrument(skip_all)]
    pub async fn logout(&self, token: &str) -> Result<()> {
        self.store.delete_session(token).await?;
        Ok(())
    }

    /// Resolves a session token to its account.
    pub async fn authenticate(&self, token: &str) -> Result<Account> {
        self.store
            .session_account(token)
            .await?
            .ok_or(AccountError::InvalidSession)
    }

    /// Makes sure a staff account with this username exists.
    ///
    /// Creates it if missing; grants staff rights to an existing account of
    /// that name. An existing account's password is left unchanged.
    #[tracing::instrument(skip(self, password))]
    pub async fn ensure_staff(&self, username: &str, password: &str) -> Result<Account> {
        match self.store.find_by_username(username).await? {
            Some(stored) if stored.account.is_staff => Ok(stored.account),
            Some(mut stored) => {
                self.store.grant_staff(stored.account.id).await?;
                stored.account.is_staff = true;
                tracing::info!(user_id = %stored.account.id, "granted staff rights");
                Ok(stored.account)
            }
            None => {
                let account = self.register(username, password, password, true).await?;
                tracing::info!(user_id = %account.id, "staff account created");
                Ok(account)
            }
        }
    }

    async fn register(
        &self,
        username: &str,
        password: &str,
        confirmation: &str,
        is_staff: bool,
    ) -> Result<Account> {
        validate_username(username)?;
        if password != confirmation {
            return Err(AccountError::PasswordMismatch);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AccountError::PasswordTooShort(MIN_PASSWORD_LEN));
        }

        let account = Account {
            id: UserId::new(),
            username: username.to_string(),
            is_staff,
            created_at: Utc::now(),
        };
        self.store
            .insert(StoredAccount {
                account: account.clone(),
                password_hash: hash_password(password),
            })
            .await?;
        Ok(account)
    }

    async fn start_session(&self, account: Account) -> Result<Session> {
        let token = Uuid::new_v4().to_string();
        self.store.create_session(&token, account.id).await?;
        Ok(Session { token, account })
    }
}
