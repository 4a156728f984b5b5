//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Values that vary per deployment (e.g. the snapshot URL) may be given
//! as env-var names and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSection,
    pub chain: ChainConfig,
    pub betting: BettingConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
    pub poll_interval_secs: u64,
    /// Wallet whose positions are tracked, if any.
    #[serde(default)]
    pub user_address: Option<String>,
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    /// Submit claims for `user_address` as soon as they become available.
    #[serde(default)]
    pub auto_claim: bool,
}

/// Where ledger snapshots come from.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    File,
    Http,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChainConfig {
    pub source: SnapshotSource,
    #[serde(default)]
    pub snapshot_path: Option<String>,
    #[serde(default)]
    pub snapshot_url: Option<String>,
    /// Env var holding the snapshot URL; takes precedence over `snapshot_url`.
    #[serde(default)]
    pub snapshot_url_env: Option<String>,
    pub chain_id: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BettingConfig {
    /// Minimum stake as a human amount, e.g. `"1"`.
    pub min_bet_usdc: String,
    pub max_argument_bytes: usize,
    pub display_decimals: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

fn default_dry_run() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// The snapshot URL for the HTTP source, env var first.
    pub fn snapshot_url(&self) -> Result<String> {
        if let Some(env) = &self.chain.snapshot_url_env {
            return Self::resolve_env(env);
        }
        self.chain
            .snapshot_url
            .clone()
            .context("chain.snapshot_url is required when chain.source = \"http\"")
    }
}
