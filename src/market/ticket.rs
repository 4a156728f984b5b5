//! Bet form validation.
//!
//! Turns raw form input (side, amount text, argument text) into a
//! `BetTicket` the submitter can send, or the `ParseError` to show inline.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BettingConfig;
use crate::money::{self, ONE_USDC};
use crate::types::{ArgueError, Debate, ParseError, Side};

/// Default per-argument byte cap.
pub const DEFAULT_MAX_ARGUMENT_BYTES: usize = 1_000;

/// Client-side limits applied before a bet is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetLimits {
    /// Minimum stake in raw USDC.
    pub min_bet: u64,
    pub max_argument_bytes: usize,
}

impl Default for BetLimits {
    fn default() -> Self {
        Self {
            min_bet: ONE_USDC,
            max_argument_bytes: DEFAULT_MAX_ARGUMENT_BYTES,
        }
    }
}

impl BetLimits {
    /// Build limits from the `[betting]` config section.
    pub fn from_config(cfg: &BettingConfig) -> Result<Self> {
        let min_bet = money::to_raw(&cfg.min_bet_usdc)
            .map_err(|e| ArgueError::Config(format!("betting.min_bet_usdc: {e}")))?;
        Ok(Self {
            min_bet,
            max_argument_bytes: cfg.max_argument_bytes,
        })
    }
}

/// A validated bet, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetTicket {
    pub side: Side,
    pub amount: u64,
    pub argument: String,
}

impl BetTicket {
    /// Validate form input against `limits` and the debate's content budget.
    pub fn validate(
        side: Side,
        amount_text: &str,
        argument: &str,
        limits: &BetLimits,
        debate: &Debate,
    ) -> Result<Self, ParseError> {
        let amount = money::to_raw(amount_text)?;
        if amount < limits.min_bet {
            return Err(ParseError::BelowMinimum {
                min: money::to_display(limits.min_bet, 2),
            });
        }

        let bytes = money::utf8_byte_length(argument);
        if bytes > limits.max_argument_bytes {
            return Err(ParseError::ArgumentTooLong {
                bytes,
                max: limits.max_argument_bytes,
            });
        }
        let remaining = debate.remaining_content_bytes();
        if bytes as u64 > remaining {
            return Err(ParseError::ContentBudgetExceeded { bytes, remaining });
        }

        debug!(side = %side, amount, argument_bytes = bytes, "Bet ticket validated");

        Ok(Self {
            side,
            amount,
            argument: argument.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
