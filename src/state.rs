//! Shared application state
//!
//! Everything a handler needs is injected here; there is no global store handle.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::repository::{BankStore, PgBankStore};
use crate::service::BankService;

#[derive(Clone)]
pub struct AppState {
    pub bank: BankService,
}

impl AppState {
    /// Wire the Postgres store into the service layer
    pub fn from_pool(pool: PgPool, lock_timeout: Duration) -> Self {
        Self::from_store(Arc::new(PgBankStore::new(pool, lock_timeout)))
    }

    pub fn from_store(store: Arc<dyn BankStore>) -> Self {
        Self {
            bank: BankService::new(store),
        }
    }
}
