//! Ledger snapshot wire format and readers.
//!
//! A snapshot is a JSON document holding every debate's `getInfo` fields,
//! per-user bets and claimed flags, USDC allowances and balances, each
//! side's argument list, and per-user stats. Amounts may be JSON numbers or
//! decimal strings (the ledger's integers exceed what some producers emit
//! as numbers).
//!
//! The raw records are decoded into the named `Debate` record exactly once,
//! here. Nothing downstream sees the wire shape. A resolved debate whose
//! outcome cannot be told from the wire fails to decode.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

use super::ChainReader;
use crate::market::DebateStatus;
use crate::types::{Argument, ArgueError, Debate, Side, UserPosition, UserStats};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Raw USDC amount as it appears on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Amount(pub u64);

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

/// Integer field that may arrive as a JSON number or a decimal string.
fn number_or_text<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
{
    match NumberOrText::<T>::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid integer: {s:?}"))),
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        number_or_text(deserializer).map(Amount)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

/// One debate's fields as returned by the contract's `getInfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDebate {
    pub address: String,
    #[serde(default)]
    pub creator: String,
    #[serde(alias = "debateStatement")]
    pub statement: String,
    #[serde(default)]
    pub description: String,
    pub side_a_name: String,
    pub side_b_name: String,
    pub creation_date: i64,
    pub end_date: i64,
    pub is_resolved: bool,
    #[serde(default)]
    pub is_side_a_winner: Option<bool>,
    /// The ledger's own status code. Required once `is_resolved` is set:
    /// `2` for a judged winner, `3` for undetermined.
    #[serde(default)]
    pub status: Option<u8>,
    pub total_side_a: Amount,
    pub total_side_b: Amount,
    #[serde(default)]
    pub winner_reasoning: String,
    #[serde(default)]
    pub total_content_bytes: Amount,
    #[serde(default)]
    pub max_total_content_bytes: Amount,
    #[serde(default)]
    pub total_bounty: Amount,
}

impl TryFrom<RawDebate> for Debate {
    type Error = ArgueError;

    /// The ledger's `isSideAWinner` is `false` both for a side-B win and for
    /// an undetermined outcome, so a resolved debate is only decoded when
    /// its status code says which one it is.
    fn try_from(raw: RawDebate) -> Result<Self, Self::Error> {
        let is_side_a_winner = if raw.is_resolved {
            match (raw.status.and_then(DebateStatus::from_code), raw.is_side_a_winner) {
                (Some(DebateStatus::Resolved), Some(a_won)) => Some(a_won),
                (Some(DebateStatus::Undetermined), _) => None,
                _ => {
                    return Err(ArgueError::Chain {
                        source_name: "snapshot".to_string(),
                        message: format!(
                            "{}: resolved with status {:?} and winner {:?}, outcome unknown",
                            raw.address, raw.status, raw.is_side_a_winner
                        ),
                    })
                }
            }
        } else {
            None
        };

        Ok(Debate {
            address: raw.address,
            creator: raw.creator,
            statement: raw.statement,
            description: raw.description,
            side_a_name: raw.side_a_name,
            side_b_name: raw.side_b_name,
            creation_date: raw.creation_date,
            end_date: raw.end_date,
            is_resolved: raw.is_resolved,
            is_side_a_winner,
            total_side_a: raw.total_side_a.0,
            total_side_b: raw.total_side_b.0,
            winner_reasoning: raw.winner_reasoning,
            total_content_bytes: raw.total_content_bytes.0,
            max_total_content_bytes: raw.max_total_content_bytes.0,
            total_bounty: raw.total_bounty.0,
        })
    }
}

/// A user's bets in one debate (`getUserBets` + `hasClaimed`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPosition {
    #[serde(default)]
    pub side_a: Amount,
    #[serde(default)]
    pub side_b: Amount,
    #[serde(default)]
    pub has_claimed: bool,
}

impl From<RawPosition> for UserPosition {
    fn from(raw: RawPosition) -> Self {
        UserPosition {
            side_a: raw.side_a.0,
            side_b: raw.side_b.0,
            has_claimed: raw.has_claimed,
        }
    }
}

/// One entry of `getArgumentDataOnSideA/B`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArgument {
    pub author: String,
    #[serde(default)]
    pub content: String,
    pub amount: Amount,
    #[serde(deserialize_with = "number_or_text")]
    pub timestamp: i64,
}

impl From<RawArgument> for Argument {
    fn from(raw: RawArgument) -> Self {
        Argument {
            author: raw.author,
            content: raw.content,
            amount: raw.amount.0,
            timestamp: raw.timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSideArguments {
    #[serde(default)]
    pub side_a: Vec<RawArgument>,
    #[serde(default)]
    pub side_b: Vec<RawArgument>,
}

/// The factory's `getUserStats` tuple.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUserStats {
    #[serde(default)]
    pub total_winnings: Amount,
    #[serde(default)]
    pub total_bets: Amount,
    #[serde(default)]
    pub debates_participated: Amount,
    #[serde(default)]
    pub debates_won: Amount,
    #[serde(default)]
    pub total_claimed: Amount,
    #[serde(default, deserialize_with = "number_or_text")]
    pub net_profit: i64,
    /// Basis points.
    #[serde(default, deserialize_with = "number_or_text")]
    pub win_rate: u32,
}

impl From<RawUserStats> for UserStats {
    fn from(raw: RawUserStats) -> Self {
        UserStats {
            total_winnings: raw.total_winnings.0,
            total_bets: raw.total_bets.0,
            debates_participated: raw.debates_participated.0,
            debates_won: raw.debates_won.0,
            total_claimed: raw.total_claimed.0,
            net_profit: raw.net_profit,
            win_rate_bps: raw.win_rate,
        }
    }
}

/// Full ledger snapshot. Also usable directly as an in-memory reader.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub debates: Vec<RawDebate>,
    /// debate address → user address → position
    #[serde(default)]
    pub positions: HashMap<String, HashMap<String, RawPosition>>,
    /// user address → allowance
    #[serde(default)]
    pub allowances: HashMap<String, Amount>,
    /// user address → wallet USDC balance
    #[serde(default)]
    pub balances: HashMap<String, Amount>,
    /// debate address → both sides' argument lists
    #[serde(default)]
    pub arguments: HashMap<String, RawSideArguments>,
    /// user address → stats
    #[serde(default)]
    pub user_stats: HashMap<String, RawUserStats>,
}

impl LedgerSnapshot {
    /// Parse a snapshot document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            ArgueError::Chain {
                source_name: "snapshot".to_string(),
                message: format!("malformed snapshot: {e}"),
            }
            .into()
        })
    }

    fn find_debate(&self, address: &str) -> Result<&RawDebate> {
        self.debates
            .iter()
            .find(|d| d.address.eq_ignore_ascii_case(address))
            .ok_or_else(|| ArgueError::DebateNotFound(address.to_string()).into())
    }
}

fn lookup<'a, V>(map: &'a HashMap<String, V>, key: &str) -> Option<&'a V> {
    map.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

#[async_trait]
impl ChainReader for LedgerSnapshot {
    async fn debate_addresses(&self) -> Result<Vec<String>> {
        Ok(self.debates.iter().map(|d| d.address.clone()).collect())
    }

    async fn debate(&self, address: &str) -> Result<Debate> {
        Ok(Debate::try_from(self.find_debate(address)?.clone())?)
    }

    async fn position(&self, address: &str, user: &str) -> Result<UserPosition> {
        self.find_debate(address)?;
        let position = lookup(&self.positions, address)
            .and_then(|users| lookup(users, user))
            .copied()
            .unwrap_or_default();
        Ok(position.into())
    }

    async fn allowance(&self, user: &str) -> Result<u64> {
        Ok(lookup(&self.allowances, user).map(|a| a.0).unwrap_or(0))
    }

    async fn arguments(&self, address: &str, side: Side) -> Result<Vec<Argument>> {
        self.find_debate(address)?;
        let arguments = lookup(&self.arguments, address)
            .map(|lists| match side {
                Side::A => &lists.side_a,
                Side::B => &lists.side_b,
            })
            .map(|raw| raw.iter().cloned().map(Argument::from).collect())
            .unwrap_or_default();
        Ok(arguments)
    }

    async fn user_stats(&self, user: &str) -> Result<UserStats> {
        Ok(lookup(&self.user_stats, user).copied().map(UserStats::from).unwrap_or_default())
    }

    async fn balance(&self, user: &str) -> Result<u64> {
        Ok(lookup(&self.balances, user).map(|b| b.0).unwrap_or(0))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ---------------------------------------------------------------------------
// File reader
// ---------------------------------------------------------------------------

/// Reads the snapshot file afresh on every call. `snapshot` loads it once
/// for a whole scan.
pub struct SnapshotFileReader {
    path: PathBuf,
}

impl SnapshotFileReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<LedgerSnapshot> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read snapshot {}", self.path.display()))?;
        let snapshot = LedgerSnapshot::from_json(&json)?;
        debug!(
            path = %self.path.display(),
            debates = snapshot.debates.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl ChainReader for SnapshotFileReader {
    async fn debate_addresses(&self) -> Result<Vec<String>> {
        self.load().await?.debate_addresses().await
    }

    async fn debate(&self, address: &str) -> Result<Debate> {
        self.load().await?.debate(address).await
    }

    async fn position(&self, address: &str, user: &str) -> Result<UserPosition> {
        self.load().await?.position(address, user).await
    }

    async fn allowance(&self, user: &str) -> Result<u64> {
        self.load().await?.allowance(user).await
    }

    async fn arguments(&self, address: &str, side: Side) -> Result<Vec<Argument>> {
        self.load().await?.arguments(address, side).await
    }

    async fn user_stats(&self, user: &str) -> Result<UserStats> {
        self.load().await?.user_stats(user).await
    }

    async fn balance(&self, user: &str) -> Result<u64> {
        self.load().await?.balance(user).await
    }

    async fn snapshot(&self) -> Result<Option<LedgerSnapshot>> {
        self.load().await.map(Some)
    }

    fn name(&self) -> &str {
        "file"
    }
}

// ---------------------------------------------------------------------------
// HTTP reader
// ---------------------------------------------------------------------------

/// Fetches the snapshot document over HTTP on every call. `snapshot` fetches
/// it once for a whole scan.
pub struct HttpSnapshotReader {
    http: Client,
    url: String,
}

impl HttpSnapshotReader {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent("ARGUE/0.1.0 (debate-pool-client)")
            .build()
            .context("Failed to build HTTP client for snapshot reader")?;
        Ok(Self { http, url: url.into() })
    }

    async fn load(&self) -> Result<LedgerSnapshot> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Snapshot request failed: {}", self.url))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ArgueError::Chain {
                source_name: "http".to_string(),
                message: format!("{} returned {status}", self.url),
            }
            .into());
        }

        let body = resp.text().await.context("Failed to read snapshot body")?;
        let snapshot = LedgerSnapshot::from_json(&body)?;
        debug!(url = %self.url, debates = snapshot.debates.len(), "Snapshot fetched");
        Ok(snapshot)
    }
}

#[async_trait]
impl ChainReader for HttpSnapshotReader {
    async fn debate_addresses(&self) -> Result<Vec<String>> {
        self.load().await?.debate_addresses().await
    }

    async fn debate(&self, address: &str) -> Result<Debate> {
        self.load().await?.debate(address).await
    }

    async fn position(&self, address: &str, user: &str) -> Result<UserPosition> {
        self.load().await?.position(address, user).await
    }

    async fn allowance(&self, user: &str) -> Result<u64> {
        self.load().await?.allowance(user).await
    }

    async fn arguments(&self, address: &str, side: Side) -> Result<Vec<Argument>> {
        self.load().await?.arguments(address, side).await
    }

    async fn user_stats(&self, user: &str) -> Result<UserStats> {
        self.load().await?.user_stats(user).await
    }

    async fn balance(&self, user: &str) -> Result<u64> {
        self.load().await?.balance(user).await
    }

    async fn snapshot(&self) -> Result<Option<LedgerSnapshot>> {
        self.load().await.map(Some)
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
