//! Pari-mutuel payout with bounty top-up.
//!
//! A winning stake gets itself back plus a pro-rata share of the losing
//! pool and of the bounty, each share floored on its own. Flooring every
//! term is what keeps the sum of all winners' payouts within the pool.

use serde::Serialize;
use tracing::debug;

use super::lifecycle::{derive_status, permitted_actions, ClaimKind, DebateStatus};
use crate::money::ONE_USDC;
use crate::types::{Debate, Side, UserPosition};

/// Payout for a winning `bet`.
///
/// `winning_pool_after_bet` must already include `bet`. An empty winning
/// pool returns 0 instead of dividing by zero.
pub fn compute_payout(
    bet: u64,
    winning_pool_after_bet: u64,
    losing_pool: u64,
    bounty: u64,
) -> u64 {
    if winning_pool_after_bet == 0 {
        return 0;
    }
    let bet_w = bet as u128;
    let winning = winning_pool_after_bet as u128;

    let losing_share = bet_w * losing_pool as u128 / winning;
    let bounty_share = bet_w * bounty as u128 / winning;

    let total = bet_w.saturating_add(losing_share).saturating_add(bounty_share);
    u64::try_from(total).unwrap_or(u64::MAX)
}

/// Estimated payout if `bet` were placed on `side` now and that side won.
///
/// Only this one hypothetical bet is added; the other side is taken as
/// read.
pub fn estimate_payout(debate: &Debate, side: Side, bet: u64) -> u64 {
    let winning = debate.side_total(side).saturating_add(bet);
    let losing = debate.side_total(side.opposite());
    compute_payout(bet, winning, losing, debate.total_bounty)
}

/// What 1 USDC on each side would pay if that side won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PayoutPreview {
    pub per_unit_a: u64,
    pub per_unit_b: u64,
}

/// Two independent single-bet estimates, one per side.
pub fn payout_preview(debate: &Debate) -> PayoutPreview {
    PayoutPreview {
        per_unit_a: estimate_payout(debate, Side::A, ONE_USDC),
        per_unit_b: estimate_payout(debate, Side::B, ONE_USDC),
    }
}

/// Amount a claim would pay out right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClaimQuote {
    pub kind: ClaimKind,
    pub amount: u64,
}

/// Quote the user's claim the way the ledger settles it.
///
/// Returns `None` whenever claiming is not offered. A resolved debate pays
/// the winning-side stake pro-rata against the final winning total; stake
/// on the losing side is worth nothing. An undetermined debate refunds
/// both sides.
pub fn claim_quote(debate: &Debate, position: &UserPosition, now: i64) -> Option<ClaimQuote> {
    let kind = permitted_actions(Some(debate), Some(position), now).claim?;

    let amount = match derive_status(debate, now) {
        DebateStatus::Undetermined => position.total_stake(),
        DebateStatus::Resolved => {
            let winner = debate.winner()?;
            compute_payout(
                position.stake_on(winner),
                debate.side_total(winner),
                debate.side_total(winner.opposite()),
                debate.total_bounty,
            )
        }
        DebateStatus::Active | DebateStatus::Resolving => return None,
    };

    debug!(
        debate = %debate.address,
        kind = ?kind,
        amount,
        "Claim quoted"
    );

    Some(ClaimQuote { kind, amount })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
