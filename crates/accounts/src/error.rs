//! Error types for account operations.

use blockbridge_store::StoreError;
use thiserror::Error;

/// Errors that can occur in the accounts layer.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Registration conflict: the email is already taken.
    #[error("an account with email {0} already exists")]
    DuplicateEmail(String),

    /// Referenced user does not exist.
    #[error("user not found: {0}")]
    NotFound(String),

    /// Bad credentials. Deliberately generic so callers cannot tell which
    /// field was wrong.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Tier outside the assignable range.
    #[error("invalid tier: {0} (expected 1..=12)")]
    InvalidTier(u8),

    /// Password hashing failed.
    #[error("password hashing error: {0}")]
    PasswordHash(String),

    /// Referenced notification does not exist.
    #[error("notification not found: {0}")]
    NotificationNotFound(String),

    /// Referenced message does not exist.
    #[error("message not found: {0}")]
    MessageNotFound(String),

    /// Document store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for account operations.
pub type Result<T> = std::result::Result<T, AccountError>;
