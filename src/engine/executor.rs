//! Action executor.
//!
//! Every write goes through the same gates the view shows: lifecycle
//! status, bet ticket validation, the allowance gate, then the submitter.
//! A gate that cannot be evaluated (read failed, data missing) blocks the
//! action; nothing is submitted on a guess.

use anyhow::Result;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::chain::{ChainReader, TransactionSubmitter, TxAction, TxReceipt, TxState, TxTracker};
use crate::market::{derive_status, permitted_actions, AllowanceGate, BetLimits, BetTicket};
use crate::money;
use crate::types::{ArgueError, Side};

pub struct Executor {
    reader: Arc<dyn ChainReader>,
    submitter: Arc<dyn TransactionSubmitter>,
    limits: BetLimits,
    tracker: Mutex<TxTracker>,
}

impl Executor {
    pub fn new(
        reader: Arc<dyn ChainReader>,
        submitter: Arc<dyn TransactionSubmitter>,
        limits: BetLimits,
    ) -> Self {
        Self {
            reader,
            submitter,
            limits,
            tracker: Mutex::new(TxTracker::new()),
        }
    }

    /// State of the most recent submission.
    pub fn tx_state(&self) -> TxState {
        self.tracker
            .lock()
            .map(|t| t.state().clone())
            .unwrap_or(TxState::Idle)
    }

    /// Approve debate contracts to spend `amount_text` USDC.
    pub async fn approve(&self, amount_text: &str) -> Result<TxReceipt> {
        let amount = money::to_raw(amount_text)?;
        self.begin(TxAction::Approve)?;
        let result = self.submitter.approve(amount).await;
        self.finish(&result);
        result
    }

    /// Validate and place a bet for `user`.
    pub async fn place_bet(
        &self,
        address: &str,
        user: &str,
        side: Side,
        amount_text: &str,
        argument: &str,
        now: i64,
    ) -> Result<TxReceipt> {
        let debate = self.reader.debate(address).await?;
        let actions = permitted_actions(Some(&debate), None, now);
        if !actions.can_bet {
            let status = derive_status(&debate, now);
            warn!(debate = address, status = %status, "Bet rejected: betting closed");
            return Err(ArgueError::ActionNotPermitted(format!("betting is closed ({status})")).into());
        }

        let ticket = BetTicket::validate(side, amount_text, argument, &self.limits, &debate)?;

        let allowance = match self.reader.allowance(user).await {
            Ok(a) => Some(a),
            Err(e) => {
                warn!(user, error = %e, "Allowance read failed");
                None
            }
        };
        match AllowanceGate::evaluate(allowance, ticket.amount) {
            AllowanceGate::Approved => {}
            AllowanceGate::NeedsApproval { required, allowance } => {
                return Err(ArgueError::ApprovalRequired { required, allowance }.into());
            }
            AllowanceGate::Unknown => {
                return Err(ArgueError::ActionNotPermitted("allowance unavailable".to_string()).into());
            }
        }

        self.begin(TxAction::PlaceBet)?;
        let result = self.submitter.place_bet(address, &ticket).await;
        self.finish(&result);

        if let Ok(receipt) = &result {
            info!(
                debate = address,
                side = %side,
                amount = %money::to_decimal(ticket.amount),
                tx = %receipt.tx_hash,
                "Bet submitted"
            );
        }
        result
    }

    /// Claim winnings or a refund for `user`.
    pub async fn claim(&self, address: &str, user: &str, now: i64) -> Result<TxReceipt> {
        let debate = self.reader.debate(address).await?;
        let position = self.reader.position(address, user).await?;

        let Some(kind) = permitted_actions(Some(&debate), Some(&position), now).claim else {
            let status = derive_status(&debate, now);
            warn!(debate = address, user, status = %status, "Claim rejected");
            return Err(ArgueError::ActionNotPermitted(format!(
                "nothing to claim ({status}, {position})"
            ))
            .into());
        };

        self.begin(TxAction::Claim)?;
        let result = self.submitter.claim(address).await;
        self.finish(&result);

        if let Ok(receipt) = &result {
            info!(debate = address, user, kind = ?kind, tx = %receipt.tx_hash, "Claim submitted");
        }
        result
    }

    fn begin(&self, action: TxAction) -> Result<()> {
        let mut tracker = self
            .tracker
            .lock()
            .map_err(|_| ArgueError::Submission("tracker lock poisoned".to_string()))?;
        if !tracker.begin(action) {
            return Err(ArgueError::ActionNotPermitted("a transaction is already pending".to_string()).into());
        }
        Ok(())
    }

    fn finish(&self, result: &Result<TxReceipt>) {
        if let Ok(mut tracker) = self.tracker.lock() {
            tracker.finish(result);
        }
        if let Err(e) = result {
            warn!(error = %e, "Transaction failed");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
