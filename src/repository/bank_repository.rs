//! Bank Repository
//!
//! Data access for users, accounts and transfers. The transfer path is the
//! only multi-statement operation and owns its transaction end to end.

use std::time::Duration;

use axum::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::domain::{Amount, Balance};

use super::{StoreError, StoreResult};

/// Stored credential for a user, as looked up by email
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: i64,
    pub password_hash: String,
}

/// Persisted transfer row
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct TransferRecord {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_number: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Storage seam used by the business layer.
///
/// Implementations must make `create_transfer` atomic and serialize concurrent
/// transfers against the same source account.
#[async_trait]
pub trait BankStore: Send + Sync {
    /// Look up the stored credential for an email
    async fn find_credentials(&self, email: &str) -> StoreResult<Option<Credentials>>;

    /// Current balance of the user's account
    async fn fetch_balance(&self, user_id: i64) -> StoreResult<Balance>;

    /// Debit the user's account and record the transfer, returning its id
    async fn create_transfer(
        &self,
        from_user_id: i64,
        to_account_number: &str,
        amount: &Amount,
    ) -> StoreResult<i64>;

    /// Outgoing transfers of the user's account, newest first
    async fn list_transfers(&self, user_id: i64, limit: i64) -> StoreResult<Vec<TransferRecord>>;
}

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgBankStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PgBankStore {
    /// Create a new store over a pool; `lock_timeout` bounds row-lock waits
    pub fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }

    /// Create a user together with its account and opening balance.
    ///
    /// Used for provisioning; there is no public registration endpoint.
    pub async fn create_user_with_account(
        &self,
        email: &str,
        password_hash: &str,
        opening_balance: Balance,
    ) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;

        let user_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO accounts (user_id, balance) VALUES ($1, $2)")
            .bind(user_id)
            .bind(opening_balance.value())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id, "user provisioned");
        Ok(user_id)
    }
}

#[async_trait]
impl BankStore for PgBankStore {
    async fn find_credentials(&self, email: &str) -> StoreResult<Option<Credentials>> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id, password_hash FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(user_id, password_hash)| Credentials {
            user_id,
            password_hash,
        }))
    }

    async fn fetch_balance(&self, user_id: i64) -> StoreResult<Balance> {
        let balance: Option<Decimal> =
            sqlx::query_scalar("SELECT balance FROM accounts WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let balance = balance.ok_or(StoreError::AccountNotFound(user_id))?;
        Balance::new(balance).map_err(|e| StoreError::InvalidData(e.to_string()))
    }

    async fn create_transfer(
        &self,
        from_user_id: i64,
        to_account_number: &str,
        amount: &Amount,
    ) -> StoreResult<i64> {
        // Every early return below drops `tx`, which rolls it back. The same
        // holds when the caller's future is cancelled mid-flight.
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT set_config('lock_timeout', $1, true)")
            .bind(format!("{}ms", self.lock_timeout.as_millis()))
            .execute(&mut *tx)
            .await?;

        let account: Option<(i64, Decimal)> = sqlx::query_as(
            r#"
            SELECT id, balance FROM accounts
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(from_user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (from_account_id, balance) =
            account.ok_or(StoreError::AccountNotFound(from_user_id))?;
        let available =
            Balance::new(balance).map_err(|e| StoreError::InvalidData(e.to_string()))?;

        if !available.is_sufficient_for(amount) {
            tx.rollback().await?;
            return Err(StoreError::InsufficientFunds {
                required: amount.value(),
                available: available.value(),
            });
        }

        sqlx::query("UPDATE accounts SET balance = balance - $2 WHERE id = $1")
            .bind(from_account_id)
            .bind(amount.value())
            .execute(&mut *tx)
            .await?;

        let transfer_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO transfers (from_account_id, to_account_number, amount)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(from_account_id)
        .bind(to_account_number)
        .bind(amount.value())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            transfer_id,
            from_account_id,
            amount = %amount,
            "transfer committed"
        );

        Ok(transfer_id)
    }

    async fn list_transfers(&self, user_id: i64, limit: i64) -> StoreResult<Vec<TransferRecord>> {
        let transfers = sqlx::query_as::<_, TransferRecord>(
            r#"
            SELECT t.id, t.from_account_id, t.to_account_number, t.amount, t.created_at
            FROM transfers t
            JOIN accounts a ON a.id = t.from_account_id
            WHERE a.user_id = $1
            ORDER BY t.created_at DESC, t.id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(transfers)
    }
}
