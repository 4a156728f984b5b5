//! Ledger integrations.
//!
//! Defines the `ChainReader` and `TransactionSubmitter` traits that stand
//! between the pure accounting core and the on-chain ledger, and provides:
//! - Snapshot readers (in-memory, JSON file, HTTP) over one wire format
//! - A dry-run submitter that logs instead of broadcasting
//! - `TxTracker`, the pending/confirmed/failed state of a submission

pub mod snapshot;
pub mod submitter;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::market::BetTicket;
use crate::types::{Argument, Debate, Side, UserPosition, UserStats};
use snapshot::LedgerSnapshot;

/// Longest failure message kept for display.
const MAX_ERROR_MESSAGE_CHARS: usize = 100;

/// Read-only view of the ledger.
///
/// Every call returns fresh state; implementors must not cache across
/// calls, since status and claim gating are derived from whatever comes
/// back. A reader that can capture the whole ledger at once exposes it
/// through `snapshot`, so a scan reads one consistent version.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Addresses of every known debate.
    async fn debate_addresses(&self) -> Result<Vec<String>>;

    /// Current snapshot of one debate.
    async fn debate(&self, address: &str) -> Result<Debate>;

    /// A user's stake in one debate. Users who never bet get a zero position.
    async fn position(&self, address: &str, user: &str) -> Result<UserPosition>;

    /// USDC the user has approved for spending by debate contracts.
    async fn allowance(&self, user: &str) -> Result<u64>;

    /// Bets recorded on one side of a debate, oldest first.
    async fn arguments(&self, address: &str, side: Side) -> Result<Vec<Argument>>;

    /// A user's totals across all debates. Unknown users get zeros.
    async fn user_stats(&self, user: &str) -> Result<UserStats>;

    /// The user's wallet USDC balance.
    async fn balance(&self, user: &str) -> Result<u64>;

    /// The whole ledger at one point in time, if this reader can load it in
    /// one go.
    async fn snapshot(&self) -> Result<Option<LedgerSnapshot>> {
        Ok(None)
    }

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Write side of the ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Approve debate contracts to pull up to `amount` USDC.
    async fn approve(&self, amount: u64) -> Result<TxReceipt>;

    /// Stake on a debate, optionally attaching an argument.
    async fn place_bet(&self, address: &str, ticket: &BetTicket) -> Result<TxReceipt>;

    /// Claim winnings or a refund from a terminal debate.
    async fn claim(&self, address: &str) -> Result<TxReceipt>;

    /// Submitter name for logging.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

/// Which write call a receipt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxAction {
    Approve,
    PlaceBet,
    Claim,
}

impl fmt::Display for TxAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxAction::Approve => write!(f, "approve"),
            TxAction::PlaceBet => write!(f, "placeBet"),
            TxAction::Claim => write!(f, "claim"),
        }
    }
}

/// Receipt returned once a transaction is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
    pub action: TxAction,
    /// Debate contract, absent for approvals.
    pub debate: Option<String>,
    pub amount: u64,
    pub dry_run: bool,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for TxReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {} ${} [{}]",
            if self.dry_run { "[DRY RUN] " } else { "" },
            self.action,
            self.debate.as_deref().unwrap_or("-"),
            crate::money::to_display(self.amount, 2),
            self.tx_hash,
        )
    }
}

// ---------------------------------------------------------------------------
// Transaction state
// ---------------------------------------------------------------------------

/// Lifecycle of one submission as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TxState {
    Idle,
    Pending { action: TxAction },
    Confirmed { tx_hash: String },
    Failed { message: String },
}

/// Tracks the most recent submission.
#[derive(Debug, Clone)]
pub struct TxTracker {
    state: TxState,
}

impl Default for TxTracker {
    fn default() -> Self {
        Self { state: TxState::Idle }
    }
}

impl TxTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TxState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TxState::Pending { .. })
    }

    /// Mark a submission in flight. Returns false if one already is.
    pub fn begin(&mut self, action: TxAction) -> bool {
        if self.is_pending() {
            return false;
        }
        self.state = TxState::Pending { action };
        true
    }

    /// Record the outcome of the in-flight submission.
    pub fn finish(&mut self, result: &Result<TxReceipt>) {
        self.state = match result {
            Ok(receipt) => TxState::Confirmed { tx_hash: receipt.tx_hash.clone() },
            Err(e) => TxState::Failed { message: truncate_message(&e.to_string()) },
        };
    }
}

fn truncate_message(message: &str) -> String {
    message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
