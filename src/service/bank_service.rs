//! Bank Service
//!
//! Business rules over the store: credential checks, amount rules and the
//! translation of storage failures into domain failures.

use std::sync::Arc;

use crate::credentials::{verify_against_dummy, verify_password};
use crate::domain::{Balance, DomainError, OperationContext};
use crate::error::{AppError, AppResult};
use crate::repository::{BankStore, StoreError, TransferRecord};

use super::TransferCommand;

/// Business layer entry point; cheap to clone, the store is shared.
#[derive(Clone)]
pub struct BankService {
    store: Arc<dyn BankStore>,
}

impl BankService {
    pub fn new(store: Arc<dyn BankStore>) -> Self {
        Self { store }
    }

    /// Map an email and password to a user ID.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        context: &OperationContext,
    ) -> AppResult<i64> {
        let credentials = self.store.find_credentials(email).await?;
        let password = password.to_string();

        // Argon2 is CPU-bound; keep it off the async workers
        let verified = tokio::task::spawn_blocking(move || match credentials {
            Some(credentials) => verify_password(&password, &credentials.password_hash)
                .map(|ok| ok.then_some(credentials.user_id)),
            None => {
                verify_against_dummy(&password);
                Ok(None)
            }
        })
        .await
        .map_err(|e| AppError::Internal(format!("credential check aborted: {e}")))?
        .map_err(|e| AppError::Internal(format!("unreadable stored password hash: {e}")))?;

        match verified {
            Some(user_id) => {
                tracing::info!(correlation_id = %context.correlation_id, user_id, "login succeeded");
                Ok(user_id)
            }
            None => {
                tracing::info!(correlation_id = %context.correlation_id, "login rejected");
                Err(DomainError::InvalidCredentials.into())
            }
        }
    }

    /// Current balance of the user's account
    pub async fn balance(&self, user_id: i64, context: &OperationContext) -> AppResult<Balance> {
        let balance = self.store.fetch_balance(user_id).await?;
        tracing::debug!(correlation_id = %context.correlation_id, user_id, %balance, "balance read");
        Ok(balance)
    }

    /// Execute a transfer, returning the new transfer ID.
    ///
    /// Not retried on any failure: the write happens at most once.
    pub async fn transfer(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> AppResult<i64> {
        let result = self
            .store
            .create_transfer(
                command.from_user_id,
                &command.to_account_number,
                &command.amount,
            )
            .await;

        match result {
            Ok(transfer_id) => {
                tracing::info!(
                    correlation_id = %context.correlation_id,
                    transfer_id,
                    from_user_id = command.from_user_id,
                    to_account_number = %command.to_account_number,
                    amount = %command.amount,
                    "transfer completed"
                );
                Ok(transfer_id)
            }
            Err(StoreError::InsufficientFunds {
                required,
                available,
            }) => {
                tracing::warn!(
                    correlation_id = %context.correlation_id,
                    from_user_id = command.from_user_id,
                    %required,
                    "transfer rejected: insufficient funds"
                );
                Err(DomainError::insufficient_funds(required, available).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Outgoing transfers for the user, newest first
    pub async fn transfer_history(
        &self,
        user_id: i64,
        limit: i64,
        context: &OperationContext,
    ) -> AppResult<Vec<TransferRecord>> {
        let transfers = self.store.list_transfers(user_id, limit).await?;
        tracing::debug!(
            correlation_id = %context.correlation_id,
            user_id,
            count = transfers.len(),
            "transfer history read"
        );
        Ok(transfers)
    }
}
