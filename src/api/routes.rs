//! API Routes
//!
//! HTTP endpoint definitions. Handlers validate request shape, call the
//! service and render the outcome; malformed input never reaches the service.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Query, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Amount, DomainError, OperationContext};
use crate::error::AppError;
use crate::repository::TransferRecord;
use crate::service::TransferCommand;
use crate::state::AppState;

use super::middleware::{context_middleware, logging_middleware};

const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_HISTORY_LIMIT: i64 = 100;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginRequest {
    /// Both fields must be present and non-empty
    pub fn validate(self) -> Result<(String, String), AppError> {
        let email = self.email.map(|e| e.trim().to_string()).unwrap_or_default();
        let password = self.password.unwrap_or_default();

        if email.is_empty() || password.is_empty() {
            return Err(AppError::InvalidRequest(
                "email and password are required".to_string(),
            ));
        }

        Ok((email, password))
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub user_id: i64,
    pub balance: Decimal,
}

/// Amount as sent by clients: `"40.00"` or `40`.
///
/// Numbers keep their literal decimal text (serde_json `arbitrary_precision`)
/// and are never converted through `f64`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    Text(String),
    Number(serde_json::Number),
}

impl AmountField {
    pub fn parse(&self) -> Result<Amount, DomainError> {
        let parsed = match self {
            AmountField::Text(text) => text.parse::<Amount>(),
            AmountField::Number(number) => number.to_string().parse::<Amount>(),
        };
        parsed.map_err(DomainError::from)
    }
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    #[serde(default)]
    pub from_user_id: Option<i64>,
    #[serde(default)]
    pub to_account_number: Option<String>,
    #[serde(default)]
    pub amount: Option<AmountField>,
}

impl TransferRequest {
    /// Check field presence, then the amount rules
    pub fn into_command(self) -> Result<TransferCommand, AppError> {
        let from_user_id = self.from_user_id.filter(|id| *id > 0);
        let to_account_number = self
            .to_account_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let (Some(from_user_id), Some(to_account_number), Some(amount)) =
            (from_user_id, to_account_number, self.amount)
        else {
            return Err(AppError::InvalidRequest(
                "from_user_id, to_account_number and amount are required".to_string(),
            ));
        };

        let amount = amount.parse()?;
        Ok(TransferCommand::new(from_user_id, to_account_number, amount))
    }
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub transfer_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TransferHistoryQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TransferHistoryResponse {
    pub user_id: i64,
    pub transfers: Vec<TransferRecord>,
}

/// Parse a required `user_id` query parameter
fn parse_user_id(raw: Option<&str>) -> Result<i64, AppError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        AppError::InvalidRequest("user_id is required".to_string())
    })?;

    raw.parse()
        .map_err(|_| AppError::InvalidRequest("invalid user_id".to_string()))
}

fn invalid_body(rejection: JsonRejection) -> AppError {
    tracing::debug!(%rejection, "rejected request body");
    AppError::InvalidRequest("invalid request body".to_string())
}

fn invalid_query(rejection: QueryRejection) -> AppError {
    tracing::debug!(%rejection, "rejected query string");
    AppError::InvalidRequest("invalid query string".to_string())
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router with its request middleware
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/balance", get(balance))
        .route("/transfer", post(transfer))
        .route("/transfers", get(transfer_history))
        // Layers run last-added first: context, then logging
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(context_middleware))
}

// =========================================================================
// POST /login
// =========================================================================

async fn login(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let (email, password) = request.validate()?;

    let user_id = state.bank.login(&email, &password, &context).await?;

    Ok(Json(LoginResponse { user_id }))
}

// =========================================================================
// GET /balance?user_id=
// =========================================================================

async fn balance(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    query: Result<Query<BalanceQuery>, QueryRejection>,
) -> Result<Json<BalanceResponse>, AppError> {
    let Query(query) = query.map_err(invalid_query)?;
    let user_id = parse_user_id(query.user_id.as_deref())?;

    let balance = state.bank.balance(user_id, &context).await?;

    Ok(Json(BalanceResponse {
        user_id,
        balance: balance.value(),
    }))
}

// =========================================================================
// POST /transfer
// =========================================================================

async fn transfer(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, AppError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let command = request.into_command()?;

    let transfer_id = state.bank.transfer(command, &context).await?;

    Ok(Json(TransferResponse { transfer_id }))
}

// =========================================================================
// GET /transfers?user_id=&limit=
// =========================================================================

async fn transfer_history(
    State(state): State<AppState>,
    Extension(context): Extension<OperationContext>,
    query: Result<Query<TransferHistoryQuery>, QueryRejection>,
) -> Result<Json<TransferHistoryResponse>, AppError> {
    let Query(query) = query.map_err(invalid_query)?;
    let user_id = parse_user_id(query.user_id.as_deref())?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let transfers = state.bank.transfer_history(user_id, limit, &context).await?;

    Ok(Json(TransferHistoryResponse { user_id, transfers }))
}
