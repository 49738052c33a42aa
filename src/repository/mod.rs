//! Repository module
//!
//! Data access layer over the relational store.

mod bank_repository;
mod error;

#[cfg(test)]
pub(crate) mod memory;

pub use bank_repository::{BankStore, Credentials, PgBankStore, TransferRecord};
pub use error::{StoreError, StoreResult};
