//! Debate scanner.
//!
//! Reads every debate from the ledger and composes the accounting core into
//! a `DebateView` per debate: status, odds, payout preview, the user's
//! actions and claim quote. Views are rebuilt from a fresh read each time;
//! a full scan reads from one pinned snapshot when the reader offers one.

use anyhow::Result;
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::chain::ChainReader;
use crate::market::{
    claim_quote, compute_odds, derive_status, lifecycle, payout_preview, permitted_actions,
    Actions, ClaimQuote, DebateStatus, Odds, PayoutPreview,
};
use crate::money;
use crate::types::{ArgumentCounts, Debate, Side, UserPosition};

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Everything the presentation layer shows for one debate.
#[derive(Debug, Clone, Serialize)]
pub struct DebateView {
    pub debate: Debate,
    pub status: DebateStatus,
    pub odds: Odds,
    pub total_pool: Decimal,
    pub total_pool_display: String,
    pub preview: PayoutPreview,
    /// Countdown, only while betting is open.
    pub time_remaining: Option<String>,
    pub position: Option<UserPosition>,
    pub actions: Actions,
    pub claim: Option<ClaimQuote>,
    /// `None` when the argument lists could not be read.
    pub arguments: Option<ArgumentCounts>,
}

/// Counts across one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub total: usize,
    pub active: usize,
    pub resolving: usize,
    pub resolved: usize,
    pub undetermined: usize,
    /// Sum of both sides across all debates, raw USDC.
    pub total_volume: u64,
    pub total_bounty: u64,
}

impl ScanSummary {
    pub fn from_views(views: &[DebateView]) -> Self {
        let mut summary = ScanSummary { total: views.len(), ..Default::default() };
        for v in views {
            match v.status {
                DebateStatus::Active => summary.active += 1,
                DebateStatus::Resolving => summary.resolving += 1,
                DebateStatus::Resolved => summary.resolved += 1,
                DebateStatus::Undetermined => summary.undetermined += 1,
            }
            summary.total_volume = summary
                .total_volume
                .saturating_add(v.debate.total_side_a)
                .saturating_add(v.debate.total_side_b);
            summary.total_bounty = summary.total_bounty.saturating_add(v.debate.total_bounty);
        }
        summary
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct DebateScanner {
    reader: Arc<dyn ChainReader>,
    display_decimals: u32,
}

impl DebateScanner {
    pub fn new(reader: Arc<dyn ChainReader>, display_decimals: u32) -> Self {
        Self { reader, display_decimals }
    }

    pub fn reader(&self) -> &Arc<dyn ChainReader> {
        &self.reader
    }

    pub fn display_decimals(&self) -> u32 {
        self.display_decimals
    }

    /// Build the view of one debate, optionally for one user.
    ///
    /// A failed debate read is an error. A failed position read is logged
    /// and leaves the user with no claim offered.
    pub async fn view(&self, address: &str, user: Option<&str>, now: i64) -> Result<DebateView> {
        let debate = self.reader.debate(address).await?;

        let position = match user {
            Some(user) => match self.reader.position(address, user).await {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(debate = address, user, error = %e, "Position read failed");
                    None
                }
            },
            None => None,
        };

        let arguments = match self.argument_counts(address).await {
            Ok(counts) => Some(counts),
            Err(e) => {
                warn!(debate = address, error = %e, "Argument read failed");
                None
            }
        };

        let mut view = compose(debate, position, now, self.display_decimals);
        view.arguments = arguments;
        Ok(view)
    }

    async fn argument_counts(&self, address: &str) -> Result<ArgumentCounts> {
        Ok(ArgumentCounts {
            side_a: self.reader.arguments(address, Side::A).await?.len(),
            side_b: self.reader.arguments(address, Side::B).await?.len(),
        })
    }

    /// Build views for every debate. Debates whose read fails are skipped.
    ///
    /// If the reader can load the whole ledger at once, every view in the
    /// scan is built from that one copy.
    pub async fn scan_all(&self, user: Option<&str>, now: i64) -> Result<Vec<DebateView>> {
        let pinned = match self.reader.snapshot().await? {
            Some(snapshot) => DebateScanner::new(Arc::new(snapshot), self.display_decimals),
            None => self.clone(),
        };
        let addresses = pinned.reader.debate_addresses().await?;
        debug!(source = self.reader.name(), count = addresses.len(), "Scanning debates");

        let results = join_all(addresses.iter().map(|a| pinned.view(a, user, now))).await;

        let mut views = Vec::with_capacity(results.len());
        for (address, result) in addresses.iter().zip(results) {
            match result {
                Ok(view) => views.push(view),
                Err(e) => warn!(debate = %address, error = %e, "Skipping debate"),
            }
        }

        info!(
            scanned = addresses.len(),
            ok = views.len(),
            "Debate scan complete"
        );
        Ok(views)
    }
}

/// Compose the core computations for one snapshot.
pub fn compose(
    debate: Debate,
    position: Option<UserPosition>,
    now: i64,
    display_decimals: u32,
) -> DebateView {
    let status = derive_status(&debate, now);
    let odds = compute_odds(debate.total_side_a, debate.total_side_b);
    let actions = permitted_actions(Some(&debate), position.as_ref(), now);
    let claim = position.as_ref().and_then(|p| claim_quote(&debate, p, now));
    let time_remaining = (status == DebateStatus::Active)
        .then(|| lifecycle::time_remaining(debate.end_date, now));

    DebateView {
        status,
        odds,
        total_pool: money::to_decimal(debate.total_pool()),
        total_pool_display: money::to_display(debate.total_pool(), display_decimals),
        preview: payout_preview(&debate),
        time_remaining,
        position,
        actions,
        claim,
        arguments: None,
        debate,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
