//! Mock ledger for integration testing.
//!
//! Provides a deterministic ledger that is both a `ChainReader` and a
//! `TransactionSubmitter`: bets move stake from the wallet into the pools
//! and onto the side's argument list, approvals set the allowance, claims
//! flip the claimed flag and update the user's stats. All state is in-memory
//! and shared between clones, so one handle can be given to the executor
//! while the test inspects another.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use argue::chain::{ChainReader, TransactionSubmitter, TxAction, TxReceipt};
use argue::market::{claim_quote, BetTicket, ClaimKind};
use argue::money;
use argue::types::{Argument, ArgueError, Debate, Side, UserPosition, UserStats};

pub const OPEN: &str = "0x00000000000000000000000000000000000000d1";
pub const END_DATE: i64 = 1_800_000_000;
pub const BEFORE_END: i64 = END_DATE - 3_600;
pub const AFTER_END: i64 = END_DATE + 3_600;
pub const STARTING_BALANCE: u64 = 100_000_000;

#[derive(Clone)]
pub struct MockLedger {
    /// Address every submitted transaction is sent from.
    sender: String,
    debates: Arc<Mutex<Vec<Debate>>>,
    positions: Arc<Mutex<HashMap<(String, String), UserPosition>>>,
    allowances: Arc<Mutex<HashMap<String, u64>>>,
    balances: Arc<Mutex<HashMap<String, u64>>>,
    arguments: Arc<Mutex<HashMap<Side, Vec<Argument>>>>,
    stats: Arc<Mutex<HashMap<String, UserStats>>>,
    receipts: Arc<Mutex<Vec<TxReceipt>>>,
    /// If set, every read and write fails with this message.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockLedger {
    /// A ledger holding one open debate with 3 USDC on A and 7 USDC on B.
    /// The sender's wallet starts with 100 USDC.
    pub fn new(sender: &str) -> Self {
        Self {
            sender: sender.to_string(),
            debates: Arc::new(Mutex::new(vec![Self::open_debate()])),
            positions: Arc::new(Mutex::new(HashMap::new())),
            allowances: Arc::new(Mutex::new(HashMap::new())),
            balances: Arc::new(Mutex::new(HashMap::from([(
                sender.to_string(),
                STARTING_BALANCE,
            )]))),
            arguments: Arc::new(Mutex::new(HashMap::new())),
            stats: Arc::new(Mutex::new(HashMap::new())),
            receipts: Arc::new(Mutex::new(Vec::new())),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    fn open_debate() -> Debate {
        Debate {
            address: OPEN.to_string(),
            creator: "0x00000000000000000000000000000000000000c1".to_string(),
            statement: "Memory safety should be the default".to_string(),
            description: String::new(),
            side_a_name: "Agree".to_string(),
            side_b_name: "Disagree".to_string(),
            creation_date: END_DATE - 86_400,
            end_date: END_DATE,
            is_resolved: false,
            is_side_a_winner: None,
            total_side_a: 3_000_000,
            total_side_b: 7_000_000,
            winner_reasoning: String::new(),
            total_content_bytes: 0,
            max_total_content_bytes: 120_000,
            total_bounty: 0,
        }
    }

    /// Modify the stored debate in place.
    pub fn update_debate(&self, f: impl FnOnce(&mut Debate)) {
        let mut debates = self.debates.lock().unwrap();
        if let Some(d) = debates.iter_mut().find(|d| d.address == OPEN) {
            f(d);
        }
    }

    /// Judge the debate. `None` leaves it undetermined.
    pub fn resolve(&self, winner: Option<Side>) {
        self.update_debate(|d| {
            d.is_resolved = true;
            d.is_side_a_winner = winner.map(|s| s == Side::A);
            d.winner_reasoning = "Judged".to_string();
        });
    }

    pub fn set_error(&self, error: Option<&str>) {
        *self.force_error.lock().unwrap() = error.map(str::to_string);
    }

    pub fn snapshot(&self) -> Debate {
        self.debates.lock().unwrap()[0].clone()
    }

    pub fn position_of(&self, user: &str) -> UserPosition {
        self.positions
            .lock()
            .unwrap()
            .get(&(OPEN.to_string(), user.to_string()))
            .copied()
            .unwrap_or_default()
    }

    pub fn receipts(&self) -> Vec<TxReceipt> {
        self.receipts.lock().unwrap().clone()
    }

    fn update_stats(&self, f: impl FnOnce(&mut UserStats)) {
        f(self.stats.lock().unwrap().entry(self.sender.clone()).or_default());
    }

    fn check_error(&self) -> Result<()> {
        match self.force_error.lock().unwrap().as_ref() {
            Some(msg) => Err(anyhow!("{msg}")),
            None => Ok(()),
        }
    }

    fn find(&self, address: &str) -> Result<Debate> {
        self.debates
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.address.eq_ignore_ascii_case(address))
            .cloned()
            .ok_or_else(|| ArgueError::DebateNotFound(address.to_string()).into())
    }

    fn record(&self, action: TxAction, debate: Option<&str>, amount: u64) -> TxReceipt {
        let receipt = TxReceipt {
            tx_hash: format!("0x{}", Uuid::new_v4().simple()),
            action,
            debate: debate.map(str::to_string),
            amount,
            dry_run: false,
            timestamp: Utc::now(),
        };
        self.receipts.lock().unwrap().push(receipt.clone());
        receipt
    }
}

#[async_trait]
impl ChainReader for MockLedger {
    async fn debate_addresses(&self) -> Result<Vec<String>> {
        self.check_error()?;
        Ok(self.debates.lock().unwrap().iter().map(|d| d.address.clone()).collect())
    }

    async fn debate(&self, address: &str) -> Result<Debate> {
        self.check_error()?;
        self.find(address)
    }

    async fn position(&self, address: &str, user: &str) -> Result<UserPosition> {
        self.check_error()?;
        self.find(address)?;
        Ok(self.position_of(user))
    }

    async fn allowance(&self, user: &str) -> Result<u64> {
        self.check_error()?;
        Ok(self.allowances.lock().unwrap().get(user).copied().unwrap_or(0))
    }

    async fn arguments(&self, address: &str, side: Side) -> Result<Vec<Argument>> {
        self.check_error()?;
        self.find(address)?;
        Ok(self.arguments.lock().unwrap().get(&side).cloned().unwrap_or_default())
    }

    async fn user_stats(&self, user: &str) -> Result<UserStats> {
        self.check_error()?;
        Ok(self.stats.lock().unwrap().get(user).copied().unwrap_or_default())
    }

    async fn balance(&self, user: &str) -> Result<u64> {
        self.check_error()?;
        Ok(self.balances.lock().unwrap().get(user).copied().unwrap_or(0))
    }

    fn name(&self) -> &str {
        "mock-ledger"
    }
}

#[async_trait]
impl TransactionSubmitter for MockLedger {
    async fn approve(&self, amount: u64) -> Result<TxReceipt> {
        self.check_error()?;
        self.allowances.lock().unwrap().insert(self.sender.clone(), amount);
        Ok(self.record(TxAction::Approve, None, amount))
    }

    async fn place_bet(&self, address: &str, ticket: &BetTicket) -> Result<TxReceipt> {
        self.check_error()?;
        {
            let mut allowances = self.allowances.lock().unwrap();
            let mut balances = self.balances.lock().unwrap();
            let allowance = allowances.entry(self.sender.clone()).or_insert(0);
            let balance = balances.entry(self.sender.clone()).or_insert(0);
            if *allowance < ticket.amount {
                return Err(anyhow!("ERC20: insufficient allowance"));
            }
            if *balance < ticket.amount {
                return Err(anyhow!("ERC20: transfer amount exceeds balance"));
            }
            *allowance -= ticket.amount;
            *balance -= ticket.amount;
        }

        self.update_debate(|d| {
            match ticket.side {
                Side::A => d.total_side_a += ticket.amount,
                Side::B => d.total_side_b += ticket.amount,
            }
            d.total_content_bytes += money::utf8_byte_length(&ticket.argument) as u64;
        });

        let mut positions = self.positions.lock().unwrap();
        let pos = positions
            .entry((address.to_string(), self.sender.clone()))
            .or_default();
        let first_bet = !pos.has_stake();
        match ticket.side {
            Side::A => pos.side_a += ticket.amount,
            Side::B => pos.side_b += ticket.amount,
        }
        drop(positions);

        self.arguments.lock().unwrap().entry(ticket.side).or_default().push(Argument {
            author: self.sender.clone(),
            content: ticket.argument.clone(),
            amount: ticket.amount,
            timestamp: Utc::now().timestamp(),
        });
        self.update_stats(|stats| {
            stats.total_bets += ticket.amount;
            stats.net_profit -= ticket.amount as i64;
            if first_bet {
                stats.debates_participated += 1;
            }
        });

        Ok(self.record(TxAction::PlaceBet, Some(address), ticket.amount))
    }

    async fn claim(&self, address: &str) -> Result<TxReceipt> {
        self.check_error()?;
        let debate = self.find(address)?;
        let key = (address.to_string(), self.sender.clone());

        let mut positions = self.positions.lock().unwrap();
        let pos = positions.get_mut(&key).ok_or_else(|| anyhow!("No bets placed"))?;
        let quote = claim_quote(&debate, pos, debate.end_date)
            .ok_or_else(|| anyhow!("Nothing to claim"))?;
        pos.has_claimed = true;
        drop(positions);

        *self.balances.lock().unwrap().entry(self.sender.clone()).or_insert(0) += quote.amount;
        self.update_stats(|stats| {
            stats.total_claimed += quote.amount;
            stats.net_profit += quote.amount as i64;
            if quote.kind == ClaimKind::Winnings && quote.amount > 0 {
                stats.total_winnings += quote.amount;
                stats.debates_won += 1;
            }
            stats.win_rate_bps = (stats.debates_won * 10_000 / stats.debates_participated.max(1)) as u32;
        });

        Ok(self.record(TxAction::Claim, Some(address), quote.amount))
    }

    fn name(&self) -> &str {
        "mock-ledger"
    }
}
