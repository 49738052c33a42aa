//! Command definitions
//!
//! Commands are validated requests handed from the HTTP layer to the service.

use crate::domain::Amount;

/// Command to debit a user's account toward an external account number
#[derive(Debug, Clone)]
pub struct TransferCommand {
    /// User ID of the sender (resolved to its account by the store)
    pub from_user_id: i64,
    /// Destination account number; opaque, not checked against accounts
    pub to_account_number: String,
    /// Amount to transfer, positive by construction
    pub amount: Amount,
}

impl TransferCommand {
    pub fn new(from_user_id: i64, to_account_number: impl Into<String>, amount: Amount) -> Self {
        Self {
            from_user_id,
            to_account_number: to_account_number.into(),
            amount,
        }
    }
}
