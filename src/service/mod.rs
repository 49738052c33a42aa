//! Service module
//!
//! Business layer between the HTTP interface and the store.

mod bank_service;
mod commands;


pub use bank_service::BankService;
pub use commands::TransferCommand;
