//! Odds split between the two sides of a debate.
//!
//! Integer-only so the percentages shown never drift from the ledger's
//! own integer arithmetic.

use serde::Serialize;

/// Basis points in 100%.
const BPS_SCALE: u128 = 10_000;

/// Share of the staked pool on each side.
///
/// `pct_a + pct_b == 100` and `bps_a + bps_b == 10_000` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Odds {
    pub pct_a: u32,
    pub pct_b: u32,
    /// Side A share in basis points (floored).
    pub bps_a: u32,
    pub bps_b: u32,
}

impl Odds {
    /// Even split, shown before anyone has staked.
    pub const EVEN: Odds = Odds { pct_a: 50, pct_b: 50, bps_a: 5_000, bps_b: 5_000 };
}

/// Compute the percentage split for two side totals.
///
/// Side A's share is taken in basis points with floor division, rounded
/// half-up to a whole percent, and side B gets the complement.
pub fn compute_odds(total_a: u64, total_b: u64) -> Odds {
    let total = total_a as u128 + total_b as u128;
    if total == 0 {
        return Odds::EVEN;
    }

    let bps_a = (total_a as u128 * BPS_SCALE / total) as u32;
    let pct_a = (bps_a + 50) / 100;

    Odds {
        pct_a,
        pct_b: 100 - pct_a,
        bps_a,
        bps_b: BPS_SCALE as u32 - bps_a,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
