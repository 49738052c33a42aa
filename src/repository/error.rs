//! Store Errors
//!
//! Error types for data access operations.

use rust_decimal::Decimal;

/// Postgres SQLSTATE for `lock_not_available` (raised when `lock_timeout` expires)
const LOCK_NOT_AVAILABLE: &str = "55P03";

/// Errors that can occur in the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Locked balance is below the requested amount; the transaction was rolled back
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    /// No account row for the user
    #[error("Account not found for user {0}")]
    AccountNotFound(i64),

    /// Row lock could not be acquired within the configured lock timeout
    #[error("Timed out waiting for account lock")]
    LockTimeout,

    /// A persisted value violates a domain invariant
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let is_lock_timeout = err
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| code == LOCK_NOT_AVAILABLE);

        if is_lock_timeout {
            StoreError::LockTimeout
        } else {
            StoreError::Database(err)
        }
    }
}

/// Store-level Result type
pub type StoreResult<T> = Result<T, StoreError>;
