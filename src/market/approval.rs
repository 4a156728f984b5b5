//! USDC spending approval gate.
//!
//! Placing a bet is a two-step flow: the debate contract may only pull
//! USDC once the user has approved an allowance at least as large as the
//! stake. The gate makes the two states explicit.

use serde::Serialize;

/// Allowance state for a pending bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AllowanceGate {
    /// Allowance has not been read yet (or the read failed).
    Unknown,
    /// Approval transaction needed before the bet.
    NeedsApproval { required: u64, allowance: u64 },
    /// Allowance covers the stake.
    Approved,
}

impl AllowanceGate {
    /// Evaluate the gate for a stake of `required`.
    pub fn evaluate(allowance: Option<u64>, required: u64) -> Self {
        match allowance {
            None => AllowanceGate::Unknown,
            Some(allowance) if allowance >= required => AllowanceGate::Approved,
            Some(allowance) => AllowanceGate::NeedsApproval { required, allowance },
        }
    }

    /// Only an approved gate lets a bet through.
    pub fn permits_bet(&self) -> bool {
        matches!(self, AllowanceGate::Approved)
    }

    /// Whether the approval step should be offered.
    pub fn needs_approval(&self) -> bool {
        matches!(self, AllowanceGate::NeedsApproval { .. })
    }
}
