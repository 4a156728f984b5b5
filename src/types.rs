//! Shared types for the ARGUE client.
//!
//! The `Debate` record is the single named view of a debate contract's
//! state. It is populated once at the read boundary (see `chain::snapshot`)
//! and every other module works from it, never from positional tuples.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which side of a debate a stake is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// The opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Parse a side from user input (case-insensitive).
impl std::str::FromStr for Side {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a" | "side_a" | "sidea" => Ok(Side::A),
            "b" | "side_b" | "sideb" => Ok(Side::B),
            _ => Err(anyhow::anyhow!("Unknown side: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Debate
// ---------------------------------------------------------------------------

/// Snapshot of one debate as held by the ledger.
///
/// Amounts are USDC in 6-decimal fixed point. Timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debate {
    pub address: String,
    pub creator: String,
    pub statement: String,
    pub description: String,
    pub side_a_name: String,
    pub side_b_name: String,
    pub creation_date: i64,
    pub end_date: i64,
    pub is_resolved: bool,
    /// `None` until a winner is judged, and for undetermined debates.
    pub is_side_a_winner: Option<bool>,
    pub total_side_a: u64,
    pub total_side_b: u64,
    pub winner_reasoning: String,
    pub total_content_bytes: u64,
    pub max_total_content_bytes: u64,
    pub total_bounty: u64,
}

impl fmt::Display for Debate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}: ${} | {}: ${} | bounty: ${})",
            self.address,
            self.statement,
            self.side_a_name,
            money::to_display(self.total_side_a, 2),
            self.side_b_name,
            money::to_display(self.total_side_b, 2),
            money::to_display(self.total_bounty, 2),
        )
    }
}

impl Debate {
    /// Total stake on one side.
    pub fn side_total(&self, side: Side) -> u64 {
        match side {
            Side::A => self.total_side_a,
            Side::B => self.total_side_b,
        }
    }

    /// Display name of one side.
    pub fn side_name(&self, side: Side) -> &str {
        match side {
            Side::A => &self.side_a_name,
            Side::B => &self.side_b_name,
        }
    }

    /// Everything available for distribution: both sides plus bounty.
    pub fn total_pool(&self) -> u64 {
        self.total_side_a
            .saturating_add(self.total_side_b)
            .saturating_add(self.total_bounty)
    }

    /// The judged winner, if the debate is resolved with one.
    pub fn winner(&self) -> Option<Side> {
        if !self.is_resolved {
            return None;
        }
        self.is_side_a_winner
            .map(|a_won| if a_won { Side::A } else { Side::B })
    }

    /// Argument bytes the ledger will still accept for this debate.
    pub fn remaining_content_bytes(&self) -> u64 {
        self.max_total_content_bytes
            .saturating_sub(self.total_content_bytes)
    }

    /// Helper to build a test debate with sensible defaults.
    #[cfg(test)]
    pub fn sample() -> Self {
        Debate {
            address: "0x00000000000000000000000000000000000000d1".to_string(),
            creator: "0x00000000000000000000000000000000000000c1".to_string(),
            statement: "Rust is the best language for smart contract tooling".to_string(),
            description: "Judged on ecosystem maturity and safety.".to_string(),
            side_a_name: "Agree".to_string(),
            side_b_name: "Disagree".to_string(),
            creation_date: 50,
            end_date: 200,
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
}

// ---------------------------------------------------------------------------
// User position
// ---------------------------------------------------------------------------

/// A user's aggregate stake in one debate, plus the ledger's claimed flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPosition {
    pub side_a: u64,
    pub side_b: u64,
    pub has_claimed: bool,
}

impl fmt::Display for UserPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A=${} B=${}{}",
            money::to_display(self.side_a, 2),
            money::to_display(self.side_b, 2),
            if self.has_claimed { " (claimed)" } else { "" },
        )
    }
}

impl UserPosition {
    /// Stake on one side.
    pub fn stake_on(&self, side: Side) -> u64 {
        match side {
            Side::A => self.side_a,
            Side::B => self.side_b,
        }
    }

    /// Combined stake on both sides.
    pub fn total_stake(&self) -> u64 {
        self.side_a.saturating_add(self.side_b)
    }

    /// Whether the user has anything staked at all.
    pub fn has_stake(&self) -> bool {
        self.side_a > 0 || self.side_b > 0
    }
}

// ---------------------------------------------------------------------------
// Arguments and user stats
// ---------------------------------------------------------------------------

/// One bet as recorded on a side's argument list. Every bet is listed,
/// including those placed without any argument text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub author: String,
    pub content: String,
    pub amount: u64,
    pub timestamp: i64,
}

impl Argument {
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// Per-side argument counts for a debate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentCounts {
    pub side_a: usize,
    pub side_b: usize,
}

/// A user's totals across every debate, as kept by the factory ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_winnings: u64,
    pub total_bets: u64,
    pub debates_participated: u64,
    pub debates_won: u64,
    pub total_claimed: u64,
    /// Signed: claims minus stakes.
    pub net_profit: i64,
    /// Basis points, 5000 = 50%.
    pub win_rate_bps: u32,
}

impl UserStats {
    /// Win rate rounded to one decimal, e.g. `6667` → `"66.7%"`.
    pub fn win_rate_display(&self) -> String {
        let tenths = self.win_rate_bps.saturating_add(5) / 10;
        format!("{}.{}%", tenths / 10, tenths % 10)
    }

    /// Net profit with an explicit sign, e.g. `"+1.50"`.
    pub fn net_profit_display(&self, decimals: u32) -> String {
        let sign = if self.net_profit < 0 { '-' } else { '+' };
        format!("{sign}{}", money::to_display(self.net_profit.unsigned_abs(), decimals))
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Validation failures for human-entered amounts and argument text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Amount is empty")]
    Empty,

    #[error("Not a valid amount: {0}")]
    InvalidNumber(String),

    #[error("Amount cannot be negative")]
    Negative,

    #[error("At most {max} decimal places allowed")]
    TooManyDecimals { max: u32 },

    #[error("Amount is too large")]
    Overflow,

    #[error("Minimum bet is {min} USDC")]
    BelowMinimum { min: String },

    #[error("Argument is {bytes} bytes, limit is {max} bytes")]
    ArgumentTooLong { bytes: usize, max: usize },

    #[error("Argument needs {bytes} bytes but the debate only has {remaining} left")]
    ContentBudgetExceeded { bytes: usize, remaining: u64 },
}

/// Domain-specific error types for ARGUE.
#[derive(Debug, thiserror::Error)]
pub enum ArgueError {
    #[error("Chain read error ({source_name}): {message}")]
    Chain { source_name: String, message: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Debate not found: {0}")]
    DebateNotFound(String),

    #[error("Action not permitted: {0}")]
    ActionNotPermitted(String),

    #[error("USDC approval required: need {required}, allowance {allowance}")]
    ApprovalRequired { required: u64, allowance: u64 },

    #[error("Transaction failed: {0}")]
    Submission(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::A.opposite(), Side::B);
        assert_eq!(Side::B.opposite(), Side::A);
    }

    #[test]
    fn test_side_from_str() {
        assert_eq!("a".parse::<Side>().unwrap(), Side::A);
        assert_eq!(" B ".parse::<Side>().unwrap(), Side::B);
        assert_eq!("side_a".parse::<Side>().unwrap(), Side::A);
        assert!("c".parse::<Side>().is_err());
    }

    #[test]
    fn test_total_pool_includes_bounty() {
        let mut d = Debate::sample();
        d.total_bounty = 500_000;
        assert_eq!(d.total_pool(), 10_500_000);
    }

    #[test]
    fn test_winner_requires_resolution() {
        let mut d = Debate::sample();
        d.is_side_a_winner = Some(true);
        assert_eq!(d.winner(), None);

        d.is_resolved = true;
        assert_eq!(d.winner(), Some(Side::A));

        d.is_side_a_winner = Some(false);
        assert_eq!(d.winner(), Some(Side::B));

        d.is_side_a_winner = None;
        assert_eq!(d.winner(), None);
    }

    #[test]
    fn test_remaining_content_bytes_saturates() {
        let mut d = Debate::sample();
        d.total_content_bytes = 100;
        d.max_total_content_bytes = 1_000;
        assert_eq!(d.remaining_content_bytes(), 900);

        d.total_content_bytes = 2_000;
        assert_eq!(d.remaining_content_bytes(), 0);
    }

    #[test]
    fn test_position_stake() {
        let p = UserPosition { side_a: 2_000_000, side_b: 0, has_claimed: false };
        assert!(p.has_stake());
        assert_eq!(p.stake_on(Side::A), 2_000_000);
        assert_eq!(p.stake_on(Side::B), 0);
        assert_eq!(p.total_stake(), 2_000_000);
        assert!(!UserPosition::default().has_stake());
    }

    #[test]
    fn test_debate_display() {
        let s = format!("{}", Debate::sample());
        assert!(s.contains("Agree: $3.00"));
        assert!(s.contains("Disagree: $7.00"));
    }

    #[test]
    fn test_user_stats_display() {
        let stats = UserStats { net_profit: -2_500_000, win_rate_bps: 6_667, ..Default::default() };
        assert_eq!(stats.win_rate_display(), "66.7%");
        assert_eq!(stats.net_profit_display(2), "-2.50");

        let stats = UserStats { net_profit: 1_000_000, win_rate_bps: 5_000, ..Default::default() };
        assert_eq!(stats.win_rate_display(), "50.0%");
        assert_eq!(stats.net_profit_display(2), "+1.00");
        assert_eq!(UserStats::default().net_profit_display(2), "+0.00");
    }

    #[test]
    fn test_argument_has_content() {
        let mut arg = Argument {
            author: "0xaa".to_string(),
            content: "  ".to_string(),
            amount: 1_000_000,
            timestamp: 100,
        };
        assert!(!arg.has_content());
        arg.content = "Borrow checker".to_string();
        assert!(arg.has_content());
    }

    #[test]
    fn test_parse_error_from() {
        let err: ArgueError = ParseError::Negative.into();
        assert_eq!(err.to_string(), "Amount cannot be negative");
    }
}
