//! Account error types.

use thiserror::Error;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error(
        "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
    )]
    InvalidUsername,

    #[error("A user with that username already exists.")]
    UsernameTaken(String),

    #[error("The two password fields didn't match.")]
    PasswordMismatch,

    #[error("This password is too short. It must contain at least {0} characters.")]
    PasswordTooShort(usize),

    /// Unknown username or wrong password. The two are not distinguished.
    #[error("Invalid username or password.")]
    InvalidCredentials,

    /// The session token is unknown or has ended.
    #[error("Authentication required.")]
    InvalidSession,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for account results.
pub type Result<T> = std::result::Result<T, AccountError>;
