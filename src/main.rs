//! ARGUE: pari-mutuel debate pool accounting and lifecycle client
//!
//! Entry point. Loads configuration, initialises structured logging,
//! starts the dashboard, and polls the ledger on an interval with
//! graceful shutdown.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use argue::chain::snapshot::{HttpSnapshotReader, SnapshotFileReader};
use argue::chain::submitter::DryRunSubmitter;
use argue::chain::ChainReader;
use argue::config::{self, SnapshotSource};
use argue::dashboard;
use argue::dashboard::routes::DashboardState;
use argue::engine::executor::Executor;
use argue::engine::scanner::{DebateScanner, DebateView, ScanSummary};
use argue::market::BetLimits;
use argue::money;

const BANNER: &str = r#"
    _    ____   ____ _   _ _____
   / \  |  _ \ / ___| | | | ____|
  / _ \ | |_) | |  _| | | |  _|
 / ___ \|  _ <| |_| | |_| | |___
/_/   \_\_| \_\\____|\___/|_____|

  Pari-mutuel debate pools
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = config::AppConfig::load("config.toml")?;

    init_logging();

    println!("{BANNER}");
    info!(
        name = %cfg.app.name,
        poll_interval_secs = cfg.app.poll_interval_secs,
        chain_id = cfg.chain.chain_id,
        dry_run = cfg.app.dry_run,
        "ARGUE starting up"
    );

    // -- Initialise components -------------------------------------------

    let reader = build_reader(&cfg)?;
    info!(source = reader.name(), "Ledger reader ready");

    let limits = BetLimits::from_config(&cfg.betting)?;
    let scanner = DebateScanner::new(reader.clone(), cfg.betting.display_decimals);

    if !cfg.app.dry_run {
        warn!("Live submission is not available in this build; transactions are dry-run only");
    }
    let executor = Executor::new(reader, Arc::new(DryRunSubmitter::new()), limits);

    if cfg.dashboard.enabled {
        let state = Arc::new(DashboardState::new(
            scanner.clone(),
            cfg.app.user_address.clone(),
            limits.min_bet,
        ));
        dashboard::spawn_dashboard(state, cfg.dashboard.port).await?;
    }

    // -- Main loop -------------------------------------------------------

    let mut interval = tokio::time::interval(Duration::from_secs(cfg.app.poll_interval_secs));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_secs = cfg.app.poll_interval_secs,
        "Entering main loop. Press Ctrl+C to stop."
    );

    let user = cfg.app.user_address.as_deref();
    let mut polls: u64 = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                polls += 1;
                let now = chrono::Utc::now().timestamp();
                match scanner.scan_all(user, now).await {
                    Ok(views) => {
                        log_summary(polls, &ScanSummary::from_views(&views));
                        if cfg.app.auto_claim {
                            if let Some(user) = user {
                                claim_all(&executor, &views, user, now).await;
                            }
                        }
                    }
                    Err(e) => error!(error = %e, "Poll failed, continuing"),
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    info!(polls, "ARGUE shut down cleanly.");
    Ok(())
}

/// Pick the ledger reader named by `[chain] source`.
fn build_reader(cfg: &config::AppConfig) -> Result<Arc<dyn ChainReader>> {
    let reader: Arc<dyn ChainReader> = match cfg.chain.source {
        SnapshotSource::File => {
            let path = cfg
                .chain
                .snapshot_path
                .clone()
                .unwrap_or_else(|| "ledger_snapshot.json".to_string());
            Arc::new(SnapshotFileReader::new(path))
        }
        SnapshotSource::Http => Arc::new(HttpSnapshotReader::new(cfg.snapshot_url()?)?),
    };
    Ok(reader)
}

/// Submit every claim the scan found for `user`.
async fn claim_all(executor: &Executor, views: &[DebateView], user: &str, now: i64) {
    for view in views.iter().filter(|v| v.actions.can_claim()) {
        let address = &view.debate.address;
        match executor.claim(address, user, now).await {
            Ok(receipt) => info!(debate = %address, receipt = %receipt, "Claimed"),
            Err(e) => warn!(debate = %address, error = %e, "Claim failed"),
        }
    }
}

fn log_summary(poll: u64, summary: &ScanSummary) {
    info!(
        poll,
        debates = summary.total,
        active = summary.active,
        resolving = summary.resolving,
        resolved = summary.resolved,
        undetermined = summary.undetermined,
        volume = format!("${}", money::to_display(summary.total_volume, 2)),
        bounty = format!("${}", money::to_display(summary.total_bounty, 2)),
        "Poll complete"
    );
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("argue=info"));

    let json_logging = std::env::var("ARGUE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
