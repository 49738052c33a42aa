//! In-memory store for service and HTTP tests.
//!
//! A single mutex stands in for the row lock: a transfer holds it across the
//! read-check-write sequence, so concurrent transfers serialize the same way
//! they do against Postgres.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::credentials::hash_password;
use crate::domain::{Amount, Balance};

use super::{BankStore, Credentials, StoreError, StoreResult, TransferRecord};

#[derive(Debug, Default)]
struct State {
    users: HashMap<String, Credentials>,
    /// user_id -> (account_id, balance)
    accounts: HashMap<i64, (i64, Balance)>,
    transfers: Vec<TransferRecord>,
    next_id: i64,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    fail_all: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user with a hashed password and an account holding `balance`
    pub async fn add_user(&self, email: &str, password: &str, balance: Balance) -> i64 {
        let password_hash = hash_password(password).expect("hashing should succeed");
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let user_id = state.next_id;
        state.next_id += 1;
        let account_id = state.next_id;

        state.users.insert(
            email.to_string(),
            Credentials {
                user_id,
                password_hash,
            },
        );
        state.accounts.insert(user_id, (account_id, balance));
        user_id
    }

    /// Make every subsequent call fail with a connection-level error
    pub fn fail_all(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    pub async fn transfer_count(&self) -> usize {
        self.state.lock().await.transfers.len()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl BankStore for InMemoryStore {
    async fn find_credentials(&self, email: &str) -> StoreResult<Option<Credentials>> {
        self.check_available()?;
        Ok(self.state.lock().await.users.get(email).cloned())
    }

    async fn fetch_balance(&self, user_id: i64) -> StoreResult<Balance> {
        self.check_available()?;
        let state = self.state.lock().await;
        state
            .accounts
            .get(&user_id)
            .map(|(_, balance)| *balance)
            .ok_or(StoreError::AccountNotFound(user_id))
    }

    async fn create_transfer(
        &self,
        from_user_id: i64,
        to_account_number: &str,
        amount: &Amount,
    ) -> StoreResult<i64> {
        self.check_available()?;
        let mut state = self.state.lock().await;

        let (account_id, balance) = *state
            .accounts
            .get(&from_user_id)
            .ok_or(StoreError::AccountNotFound(from_user_id))?;

        // Yield while "holding the row lock" so racing tasks really queue up
        tokio::task::yield_now().await;

        let remaining = balance
            .debit(amount)
            .ok_or_else(|| StoreError::InsufficientFunds {
                required: amount.value(),
                available: balance.value(),
            })?;

        state.next_id += 1;
        let transfer_id = state.next_id;
        state.accounts.insert(from_user_id, (account_id, remaining));
        state.transfers.push(TransferRecord {
            id: transfer_id,
            from_account_id: account_id,
            to_account_number: to_account_number.to_string(),
            amount: amount.value(),
            created_at: Utc::now(),
        });

        Ok(transfer_id)
    }

    async fn list_transfers(&self, user_id: i64, limit: i64) -> StoreResult<Vec<TransferRecord>> {
        self.check_available()?;
        let state = self.state.lock().await;
        let Some((account_id, _)) = state.accounts.get(&user_id) else {
            return Ok(Vec::new());
        };

        Ok(state
            .transfers
            .iter()
            .rev()
            .filter(|t| t.from_account_id == *account_id)
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }
}
