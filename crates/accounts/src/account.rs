use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountError, Result, UserId};

/// Maximum length of a username, in characters.
pub const MAX_USERNAME_LEN: usize = 150;

/// A registered user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    pub username: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub account: Account,
}

/// Checks a username: 1 to 150 characters, each a letter, digit or one of
/// `@.+-_`.
pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if len == 0 || len > MAX_USERNAME_LEN || !username.chars().all(allowed) {
        return Err(AccountError::InvalidUsername);
    }
    Ok(())
}
