use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{Account, AccountError, AccountStore, Result, StoredAccount, UserId};

/// PostgreSQL-backed account store over the `accounts` and `sessions`
/// tables.
#[derive(Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    /// Creates a new PostgreSQL account store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_account(row: &PgRow) -> Result<Account> {
        Ok(Account {
            id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
            username: row.try_get("username")?,
            is_staff: row.try_get("is_staff")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn insert(&self, stored: StoredAccount) -> Result<()> {
        let account = &stored.account;
        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, password_hash, is_staff, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.username)
        .bind(&stored.password_hash)
        .bind(account.is_staff)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_account_username")
            {
                return AccountError::UsernameTaken(account.username.clone());
            }
            AccountError::Database(e)
        })?;
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<StoredAccount>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, is_staff, created_at
            FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(StoredAccount {
                account: Self::row_to_account(&row)?,
                password_hash: row.try_get("password_hash")?,
            })
        })
        .transpose()
    }

    async fn grant_staff(&self, id: UserId) -> Result<()> {
        sqlx::query("UPDATE accounts SET is_staff = TRUE WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_session(&self, token: &str, account_id: UserId) -> Result<()> {
        sqlx::query("INSERT INTO sessions (token, account_id) VALUES ($1, $2)")
            .bind(token)
            .bind(account_id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn session_account(&self, token: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT a.id, a.username, a.is_staff, a.created_at
            FROM sessions s
            JOIN accounts a ON a.id = s.account_id
            WHERE s.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn delete_session(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
