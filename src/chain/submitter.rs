//! Dry-run transaction submitter.
//!
//! Logs every write call and returns a synthetic receipt. Receipts are kept
//! in memory so callers (and tests) can inspect what would have been sent.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

use super::{TransactionSubmitter, TxAction, TxReceipt};
use crate::market::BetTicket;
use crate::money;

#[derive(Debug, Clone, Default)]
pub struct DryRunSubmitter {
    receipts: Arc<Mutex<Vec<TxReceipt>>>,
}

impl DryRunSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All receipts issued so far.
    pub fn receipts(&self) -> Vec<TxReceipt> {
        self.receipts.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn record(&self, action: TxAction, debate: Option<&str>, amount: u64) -> TxReceipt {
        let receipt = TxReceipt {
            tx_hash: format!("0x{}", Uuid::new_v4().simple()),
            action,
            debate: debate.map(str::to_string),
            amount,
            dry_run: true,
            timestamp: Utc::now(),
        };
        if let Ok(mut receipts) = self.receipts.lock() {
            receipts.push(receipt.clone());
        }
        receipt
    }
}

#[async_trait]
impl TransactionSubmitter for DryRunSubmitter {
    async fn approve(&self, amount: u64) -> Result<TxReceipt> {
        info!(amount = %money::to_decimal(amount), "[DRY RUN] Would approve USDC");
        Ok(self.record(TxAction::Approve, None, amount))
    }

    async fn place_bet(&self, address: &str, ticket: &BetTicket) -> Result<TxReceipt> {
        info!(
            debate = address,
            side = %ticket.side,
            amount = %money::to_decimal(ticket.amount),
            argument_bytes = money::utf8_byte_length(&ticket.argument),
            "[DRY RUN] Would place bet"
        );
        Ok(self.record(TxAction::PlaceBet, Some(address), ticket.amount))
    }

    async fn claim(&self, address: &str) -> Result<TxReceipt> {
        info!(debate = address, "[DRY RUN] Would claim");
        Ok(self.record(TxAction::Claim, Some(address), 0))
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}
