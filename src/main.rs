//! bank_api - Minimal banking backend API
//!
//! Authenticates users, reports balances and executes debit transfers
//! against PostgreSQL.

use std::net::SocketAddr;

use axum::{middleware, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bank_api::config::LogFormat;
use bank_api::api::middleware::deadline_middleware;
use bank_api::{api, db, AppState, Config};

/// Initialize tracing/logging
fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bank_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Build the application router
fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        // Health check
        .route("/health", axum::routing::get(health_check))
        .nest("/api", api::create_router());

    let router = match &config.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(middleware::from_fn_with_state(
            config.request_timeout,
            deadline_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(environment = %config.environment, "Starting bank_api server");
    tracing::info!("Connecting to database...");

    let pool = db::connect(&config).await?;

    if config.run_migrations {
        db::run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    }

    if !db::check_schema(&pool).await? {
        tracing::error!("Database schema is not complete. Please run migrations.");
        return Err(anyhow::anyhow!("Database schema incomplete"));
    }

    tracing::info!("Database connected successfully");
    tracing::info!("Listening on http://{}", addr);

    let state = AppState::from_pool(pool.clone(), config.lock_timeout);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutting down...");
    pool.close().await;
    tracing::info!("Database connections closed. Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::time::Duration;

    use axum::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use bank_api::repository::{BankStore, Credentials, StoreResult, TransferRecord};
    use bank_api::{Amount, Balance};

    /// Store whose calls never complete
    struct StalledStore;

    #[async_trait]
    impl BankStore for StalledStore {
        async fn find_credentials(&self, _email: &str) -> StoreResult<Option<Credentials>> {
            std::future::pending().await
        }

        async fn fetch_balance(&self, _user_id: i64) -> StoreResult<Balance> {
            std::future::pending().await
        }

        async fn create_transfer(
            &self,
            _from_user_id: i64,
            _to_account_number: &str,
            _amount: &Amount,
        ) -> StoreResult<i64> {
            std::future::pending().await
        }

        async fn list_transfers(
            &self,
            _user_id: i64,
            _limit: i64,
        ) -> StoreResult<Vec<TransferRecord>> {
            std::future::pending().await
        }
    }

    fn stalled_app() -> Router {
        let mut config =
            Config::from_source(|key| (key == "DATABASE_URL").then(|| "postgres://unused".into()))
                .unwrap();
        config.request_timeout = Duration::from_millis(50);
        build_router(AppState::from_store(Arc::new(StalledStore)), &config)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_generic_server_error() {
        let request = Request::builder()
            .uri("/api/balance?user_id=1")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(stalled_app(), request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "Internal server error", "error_code": "internal_error"})
        );
    }

    #[tokio::test]
    async fn test_deadline_expiry_on_transfer() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/transfer")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"from_user_id": 1, "to_account_number": "ACC-1", "amount": "1.00"})
                    .to_string(),
            ))
            .unwrap();

        let (status, body) = send(stalled_app(), request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error_code"], "internal_error");
    }

    #[tokio::test]
    async fn test_health_within_deadline() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = stalled_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
