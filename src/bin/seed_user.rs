//! Provisioning tool: create a user with a hashed password and an opening balance.
//!
//! Run with: cargo run --bin seed_user -- --email alice@example.com --password s3cret --balance 100.00

use rust_decimal::Decimal;

use bank_api::credentials::hash_password;
use bank_api::repository::PgBankStore;
use bank_api::{db, Balance, Config};

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    let email = arg_value(&args, "--email").ok_or_else(|| anyhow::anyhow!("--email is required"))?;
    let password =
        arg_value(&args, "--password").ok_or_else(|| anyhow::anyhow!("--password is required"))?;
    let balance: Decimal = arg_value(&args, "--balance")
        .unwrap_or_else(|| "0".to_string())
        .parse()?;
    let balance = Balance::new(balance)?;

    let config = Config::from_env()?;
    let pool = db::connect(&config).await?;
    if config.run_migrations {
        db::run_migrations(&pool).await?;
    }

    let password_hash = hash_password(&password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let store = PgBankStore::new(pool.clone(), config.lock_timeout);
    let user_id = store
        .create_user_with_account(&email, &password_hash, balance)
        .await?;

    println!("Created user {} ({}) with balance {}", user_id, email, balance);

    pool.close().await;
    Ok(())
}
