//! bank_api Library
//!
//! Login, balance lookup and atomic fund transfers over PostgreSQL.
//! Re-exports modules for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod credentials;
pub mod db;
pub mod domain;
pub mod repository;
pub mod service;
pub mod state;

mod error;

pub use config::Config;
pub use domain::{Amount, AmountError, Balance, DomainError, OperationContext};
pub use error::{AppError, AppResult};
pub use state::AppState;
