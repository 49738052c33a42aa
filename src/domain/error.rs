//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use rust_decimal::Decimal;
use thiserror::Error;

use super::AmountError;

/// Domain-specific errors
///
/// Expected, user-correctable failures. Infrastructure failures never end up
/// here; they stay `StoreError` all the way to the response layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Unknown email or wrong password; the two are deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Source balance at lock time is below the requested amount
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    /// Invalid amount (zero, negative, too precise, or over the limit)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    /// Machine-readable code used in error responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::InvalidAmount(_) => "invalid_amount",
        }
    }
}

impl From<AmountError> for DomainError {
    fn from(err: AmountError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_funds_error() {
        let err = DomainError::insufficient_funds(dec!(70.00), dec!(60.00));

        assert_eq!(err.error_code(), "insufficient_funds");
        assert!(err.to_string().contains("70.00"));
        assert!(err.to_string().contains("60.00"));
    }

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        let err = DomainError::InvalidCredentials;
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.error_code(), "invalid_credentials");
    }

    #[test]
    fn test_amount_error_conversion() {
        let err: DomainError = AmountError::NotPositive(Decimal::ZERO).into();
        assert!(matches!(err, DomainError::InvalidAmount(ref msg) if msg.contains("positive")));
    }
}
