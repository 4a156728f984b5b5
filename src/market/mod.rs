//! Pool accounting and lifecycle: odds, payouts, status derivation, and
//! the gates that decide which actions are offered.

pub mod approval;
pub mod lifecycle;
pub mod odds;
pub mod payout;
pub mod ticket;

pub use approval::AllowanceGate;
pub use lifecycle::{derive_status, permitted_actions, Actions, ClaimKind, DebateStatus};
pub use odds::{compute_odds, Odds};
pub use payout::{claim_quote, compute_payout, estimate_payout, payout_preview, ClaimQuote, PayoutPreview};
pub use ticket::{BetLimits, BetTicket};
