//! Dashboard API route handlers.
//!
//! All endpoints return JSON and recompute from a fresh ledger read.
//! State is shared via `Arc<DashboardState>`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::engine::scanner::{DebateScanner, DebateView, ScanSummary};
use crate::market::{
    derive_status, estimate_payout, permitted_actions, AllowanceGate, Actions, ClaimQuote,
    DebateStatus, Odds,
};
use crate::money;
use crate::types::{Argument, ArgueError, ParseError, Side, UserPosition, UserStats};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub scanner: DebateScanner,
    /// User whose positions are shown when a request names none.
    pub default_user: Option<String>,
    pub display_decimals: u32,
    /// Smallest bet the allowance gate is evaluated against.
    pub min_bet: u64,
}

impl DashboardState {
    pub fn new(scanner: DebateScanner, default_user: Option<String>, min_bet: u64) -> Self {
        let display_decimals = scanner.display_decimals();
        Self { scanner, default_user, display_decimals, min_bet }
    }

    fn user<'a>(&'a self, requested: &'a Option<String>) -> Option<&'a str> {
        requested.as_deref().or(self.default_user.as_deref())
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(err: anyhow::Error) -> ApiError {
    let status = if err.downcast_ref::<ParseError>().is_some() {
        StatusCode::BAD_REQUEST
    } else {
        match err.downcast_ref::<ArgueError>() {
            Some(ArgueError::DebateNotFound(_)) => StatusCode::NOT_FOUND,
            Some(ArgueError::Parse(_)) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        }
    };
    if status == StatusCode::BAD_GATEWAY {
        warn!(error = %err, "Ledger read failed");
    }
    (status, Json(ErrorBody { error: err.to_string() }))
}

fn bad_request(message: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error: message }))
}

#[derive(Debug, Clone, Serialize)]
pub struct DebatesResponse {
    pub summary: ScanSummary,
    pub debates: Vec<DebateView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    pub side: Side,
    pub side_name: String,
    pub amount: u64,
    pub amount_display: String,
    pub estimated_payout: u64,
    pub estimated_payout_display: String,
    pub odds: Odds,
    /// Estimates are shown for any debate; only an open one takes the bet.
    pub status: DebateStatus,
    pub can_bet: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionsResponse {
    pub status: DebateStatus,
    pub user: Option<String>,
    pub position: Option<UserPosition>,
    pub actions: Actions,
    pub claim: Option<ClaimQuote>,
    pub allowance: AllowanceGate,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArgumentEntry {
    pub author: String,
    pub content: String,
    pub amount: u64,
    pub amount_display: String,
    pub timestamp: i64,
}

impl ArgumentEntry {
    fn new(argument: Argument, display_decimals: u32) -> Self {
        Self {
            amount_display: money::to_display(argument.amount, display_decimals),
            author: argument.author,
            content: argument.content,
            amount: argument.amount,
            timestamp: argument.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArgumentsResponse {
    pub address: String,
    pub side_a_name: String,
    pub side_b_name: String,
    pub side_a: Vec<ArgumentEntry>,
    pub side_b: Vec<ArgumentEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStatsResponse {
    pub user: String,
    pub stats: UserStats,
    pub win_rate_display: String,
    pub net_profit_display: String,
    pub total_bets_display: String,
    pub total_winnings_display: String,
    /// Wallet USDC, `None` if the balance read failed.
    pub balance: Option<u64>,
    pub balance_display: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub side: String,
    pub amount: String,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// GET /api/debates
pub async fn get_debates(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<DebatesResponse>, ApiError> {
    let debates = state
        .scanner
        .scan_all(state.user(&query.user), now())
        .await
        .map_err(api_error)?;
    Ok(Json(DebatesResponse { summary: ScanSummary::from_views(&debates), debates }))
}

/// GET /api/summary
pub async fn get_summary(State(state): State<AppState>) -> Result<Json<ScanSummary>, ApiError> {
    let views = state.scanner.scan_all(None, now()).await.map_err(api_error)?;
    Ok(Json(ScanSummary::from_views(&views)))
}

/// GET /api/debates/:address
pub async fn get_debate(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<DebateView>, ApiError> {
    let view = state
        .scanner
        .view(&address, state.user(&query.user), now())
        .await
        .map_err(api_error)?;
    Ok(Json(view))
}

/// GET /api/debates/:address/quote?side=a&amount=1.5
pub async fn get_quote(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let side: Side = query.side.parse().map_err(|e: anyhow::Error| bad_request(e.to_string()))?;
    let amount = money::to_raw(&query.amount).map_err(|e| api_error(e.into()))?;
    let debate = state.scanner.reader().debate(&address).await.map_err(api_error)?;

    let estimated = estimate_payout(&debate, side, amount);
    let now = now();
    Ok(Json(QuoteResponse {
        side,
        side_name: debate.side_name(side).to_string(),
        amount,
        amount_display: money::to_display(amount, state.display_decimals),
        estimated_payout: estimated,
        estimated_payout_display: money::to_display(estimated, state.display_decimals),
        odds: crate::market::compute_odds(debate.total_side_a, debate.total_side_b),
        status: derive_status(&debate, now),
        can_bet: permitted_actions(Some(&debate), None, now).can_bet,
    }))
}

/// GET /api/debates/:address/actions?user=0x…
pub async fn get_actions(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ActionsResponse>, ApiError> {
    let reader = state.scanner.reader();
    let debate = reader.debate(&address).await.map_err(api_error)?;
    let user = state.user(&query.user).map(str::to_string);
    let now = now();

    let (position, allowance) = match user.as_deref() {
        Some(user) => {
            let position = reader.position(&address, user).await;
            let allowance = reader.allowance(user).await;
            if let Err(e) = &position {
                warn!(debate = %address, user, error = %e, "Position read failed");
            }
            (position.ok(), allowance.ok())
        }
        None => (None, None),
    };

    Ok(Json(ActionsResponse {
        status: derive_status(&debate, now),
        actions: permitted_actions(Some(&debate), position.as_ref(), now),
        claim: position
            .as_ref()
            .and_then(|p| crate::market::claim_quote(&debate, p, now)),
        allowance: AllowanceGate::evaluate(allowance, state.min_bet),
        user,
        position,
    }))
}

/// GET /api/debates/:address/arguments
pub async fn get_arguments(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ArgumentsResponse>, ApiError> {
    let reader = state.scanner.reader();
    let debate = reader.debate(&address).await.map_err(api_error)?;
    let side_a = reader.arguments(&address, Side::A).await.map_err(api_error)?;
    let side_b = reader.arguments(&address, Side::B).await.map_err(api_error)?;

    let entries = |args: Vec<Argument>| -> Vec<ArgumentEntry> {
        args.into_iter()
            .map(|a| ArgumentEntry::new(a, state.display_decimals))
            .collect()
    };
    Ok(Json(ArgumentsResponse {
        address: debate.address,
        side_a_name: debate.side_a_name,
        side_b_name: debate.side_b_name,
        side_a: entries(side_a),
        side_b: entries(side_b),
    }))
}

/// GET /api/users/:user/stats
pub async fn get_user_stats(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<UserStatsResponse>, ApiError> {
    let reader = state.scanner.reader();
    let stats = reader.user_stats(&user).await.map_err(api_error)?;
    let balance = match reader.balance(&user).await {
        Ok(b) => Some(b),
        Err(e) => {
            warn!(user = %user, error = %e, "Balance read failed");
            None
        }
    };

    let decimals = state.display_decimals;
    Ok(Json(UserStatsResponse {
        win_rate_display: stats.win_rate_display(),
        net_profit_display: stats.net_profit_display(decimals),
        total_bets_display: money::to_display(stats.total_bets, decimals),
        total_winnings_display: money::to_display(stats.total_winnings, decimals),
        balance_display: balance.map(|b| money::to_display(b, decimals)),
        balance,
        stats,
        user,
    }))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
