//! Common test utilities
//!
//! Database tests need `DATABASE_URL`; without it they log and return early.
//! Each test provisions its own users, so tests never truncate shared tables.

#![allow(dead_code)]

use std::time::Duration;

use bank_api::credentials::hash_password;
use bank_api::repository::PgBankStore;
use bank_api::Balance;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub const TEST_PASSWORD: &str = "password123";

/// Connect and migrate, or `None` when no database is configured
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    bank_api::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

pub fn store(pool: &PgPool) -> PgBankStore {
    PgBankStore::new(pool.clone(), Duration::from_secs(5))
}

/// Create a user with a unique email and the given balance
pub async fn seed_user(pool: &PgPool, balance: Decimal) -> (i64, String) {
    let email = format!("user-{}@example.test", uuid::Uuid::new_v4());
    let password_hash = hash_password(TEST_PASSWORD).expect("Failed to hash password");
    let user_id = store(pool)
        .create_user_with_account(&email, &password_hash, Balance::new(balance).unwrap())
        .await
        .expect("Failed to seed user");
    (user_id, email)
}

pub async fn balance_of(pool: &PgPool, user_id: i64) -> Decimal {
    sqlx::query_scalar("SELECT balance FROM accounts WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read balance")
}

pub async fn transfer_count(pool: &PgPool, user_id: i64) -> i64 {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM transfers t
        JOIN accounts a ON a.id = t.from_account_id
        WHERE a.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .expect("Failed to count transfers")
}
