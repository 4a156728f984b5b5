//! Debate lifecycle and action gating.
//!
//! Status is never stored: it is derived from a fresh `Debate` snapshot
//! on every read. Gating fails closed, so a missing snapshot or missing
//! user position permits nothing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Debate, UserPosition};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle state of a debate.
///
/// `Active` is initial, `Resolving` is the judging window after the
/// deadline, `Resolved` and `Undetermined` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebateStatus {
    Active,
    Resolving,
    Resolved,
    Undetermined,
}

impl DebateStatus {
    /// Whether no further transition can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DebateStatus::Resolved | DebateStatus::Undetermined)
    }

    /// Badge label.
    pub fn label(&self) -> &'static str {
        match self {
            DebateStatus::Active => "Active",
            DebateStatus::Resolving => "Resolving",
            DebateStatus::Resolved => "Resolved",
            DebateStatus::Undetermined => "Undetermined",
        }
    }

    /// Map the ledger's numeric status code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(DebateStatus::Active),
            1 => Some(DebateStatus::Resolving),
            2 => Some(DebateStatus::Resolved),
            3 => Some(DebateStatus::Undetermined),
            _ => None,
        }
    }
}

impl fmt::Display for DebateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Derive the status of a debate at unix time `now`.
pub fn derive_status(debate: &Debate, now: i64) -> DebateStatus {
    if debate.is_resolved {
        return match debate.is_side_a_winner {
            Some(_) => DebateStatus::Resolved,
            None => DebateStatus::Undetermined,
        };
    }
    if now < debate.end_date {
        DebateStatus::Active
    } else {
        DebateStatus::Resolving
    }
}

// ---------------------------------------------------------------------------
// Action gating
// ---------------------------------------------------------------------------

/// What a claim pays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimKind {
    Winnings,
    Refund,
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimKind::Winnings => write!(f, "Claim Winnings"),
            ClaimKind::Refund => write!(f, "Claim Refund"),
        }
    }
}

/// Actions offered to a user for one debate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Actions {
    pub can_bet: bool,
    pub claim: Option<ClaimKind>,
    /// Passive "judging in progress" indicator.
    pub judging: bool,
}

impl Actions {
    /// Nothing enabled.
    pub const NONE: Actions = Actions { can_bet: false, claim: None, judging: false };

    pub fn can_claim(&self) -> bool {
        self.claim.is_some()
    }
}

/// Decide which actions are enabled.
///
/// Betting needs only the debate snapshot. Claiming also needs the user's
/// position; without it no claim is offered.
pub fn permitted_actions(
    debate: Option<&Debate>,
    position: Option<&UserPosition>,
    now: i64,
) -> Actions {
    let Some(debate) = debate else {
        return Actions::NONE;
    };

    match derive_status(debate, now) {
        DebateStatus::Active => Actions { can_bet: true, ..Actions::NONE },
        DebateStatus::Resolving => Actions { judging: true, ..Actions::NONE },
        status @ (DebateStatus::Resolved | DebateStatus::Undetermined) => {
            let claimable = position.is_some_and(|p| p.has_stake() && !p.has_claimed);
            if !claimable {
                return Actions::NONE;
            }
            let kind = if status == DebateStatus::Undetermined {
                ClaimKind::Refund
            } else {
                ClaimKind::Winnings
            };
            Actions { claim: Some(kind), ..Actions::NONE }
        }
    }
}

/// Countdown text for an active debate.
pub fn time_remaining(end_date: i64, now: i64) -> String {
    let diff = end_date - now;
    if diff <= 0 {
        return "Ended".to_string();
    }
    let days = diff / 86_400;
    let hours = (diff % 86_400) / 3_600;
    let minutes = (diff % 3_600) / 60;
    if days > 0 {
        format!("{days}d {hours}h left")
    } else if hours > 0 {
        format!("{hours}h {minutes}m left")
    } else {
        format!("{minutes}m left")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
