//! Veilcrawl main entry point
//!
//! Command-line interface for running registry-document collection
//! campaigns. The binary ships with a minimal probe adapter that fetches
//! the configured target URL per identifier; real target adapters are
//! implemented against the library's `TargetAdapter` trait.

use async_trait::async_trait;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;
use veilcrawl::campaign::{
    AttemptError, BlockProbe, CampaignController, ConsoleGate, CrawlOutcome, TargetAdapter,
};
use veilcrawl::config::load_config_with_hash;
use veilcrawl::ledger::ResumeLedger;
use veilcrawl::quota::QuotaTracker;
use veilcrawl::session::Session;
use veilcrawl::store::load_identifiers;

/// Veilcrawl: a careful registry-document collection engine
///
/// Drives a resumable, quota-respecting crawl campaign over a list of
/// registry identifiers, rotating anonymity proxies and deferring to a
/// human operator whenever the target raises a challenge.
#[derive(Parser, Debug)]
#[command(name = "veilcrawl")]
#[command(version)]
#[command(about = "A careful registry-document collection engine", long_about = None)]
struct Cli {
    /// Path to TOML campaign configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Ignore the resume ledger and reattempt every identifier
    #[arg(long)]
    fresh: bool,

    /// Show quota and ledger status and exit
    #[arg(long, conflicts_with = "dry_run")]
    status: bool,

    /// Validate config and show the campaign plan without crawling
    #[arg(long, conflicts_with = "status")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.status {
        handle_status(&config)?;
    } else if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_campaign(config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("veilcrawl=info,warn"),
            1 => EnvFilter::new("veilcrawl=debug,info"),
            2 => EnvFilter::new("veilcrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --status: quota and ledger state
fn handle_status(config: &veilcrawl::Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut quota = QuotaTracker::load(Path::new(&config.paths.quota_file), config.quota.daily_limit);
    let ledger = ResumeLedger::load(Path::new(&config.paths.ledger_file));

    println!("{}", quota.status_report());
    println!("\nResume ledger: {} identifier(s) already attempted", ledger.len());

    Ok(())
}

/// Handles --dry-run: validates config and shows the campaign plan
fn handle_dry_run(config: &veilcrawl::Config) -> Result<(), Box<dyn std::error::Error>> {
    let identifiers = load_identifiers(&config.paths)?;
    let ledger = ResumeLedger::load(Path::new(&config.paths.ledger_file));
    let pending = identifiers.iter().filter(|id| !ledger.contains(id)).count();

    println!("=== Veilcrawl Dry Run ===\n");

    println!("Campaign:");
    println!("  Rotate proxy every: {} identifiers", config.campaign.rotate_every);
    println!("  Max attempts: {}", config.campaign.max_attempts);
    println!("  Call timeout: {}s", config.campaign.call_timeout_secs);
    println!(
        "  Pacing: {}-{}s between identifiers",
        config.campaign.pace_min_secs, config.campaign.pace_max_secs
    );
    println!("  Mark failed attempts: {}", config.campaign.mark_failed_attempts);

    println!("\nQuota:");
    println!("  Daily limit: {}", config.quota.daily_limit);

    println!("\nProxies:");
    println!("  Anonymity network: {}", config.proxy.use_anonymity_network);
    println!("  External endpoints: {}", config.proxy.external_endpoints.len());
    println!("  Control channel: {}", config.proxy.control_address);

    println!("\nIdentity renewal:");
    println!("  Usage threshold: {}", config.identity.usage_threshold);
    println!("  Time threshold: {}s", config.identity.time_threshold_secs);
    println!("  Min interval: {}s", config.identity.min_interval_secs);

    println!("\nIdentifiers:");
    println!("  Total: {}", identifiers.len());
    println!("  Already attempted: {}", identifiers.len() - pending);
    println!("  Pending: {}", pending);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main campaign run
async fn handle_campaign(
    config: veilcrawl::Config,
    fresh: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if fresh {
        let ledger_path = Path::new(&config.paths.ledger_file);
        if ledger_path.exists() {
            tracing::info!("Fresh run requested, clearing resume ledger");
            std::fs::remove_file(ledger_path)?;
        }
    }

    let identifiers = load_identifiers(&config.paths)?;
    if identifiers.is_empty() {
        tracing::warn!("Identifier list is empty, nothing to do");
        return Ok(());
    }

    let Some(target_url) = config.campaign.target_url.clone() else {
        return Err("campaign.target-url must be set to run the built-in probe adapter".into());
    };

    let adapter = Box::new(ProbeAdapter { target_url });
    let mut controller = CampaignController::new(config, adapter, Box::new(ConsoleGate))?;

    // Graceful teardown: the flag is honored between identifiers
    let interrupt = controller.interrupt_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing current identifier");
            interrupt.store(true, Ordering::SeqCst);
        }
    });

    let report = controller.run(&identifiers).await?;
    println!("\n{}", controller.render_report(&report));

    Ok(())
}

/// Minimal adapter for smoke runs: fetches the target URL per identifier
/// and classifies the response through the block probe
struct ProbeAdapter {
    target_url: String,
}

#[async_trait]
impl TargetAdapter for ProbeAdapter {
    async fn collect(
        &mut self,
        session: &Session,
        identifier: &str,
        probe: &dyn BlockProbe,
    ) -> Result<CrawlOutcome, AttemptError> {
        let url = self.target_url.replace("{id}", identifier);

        let response = session
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))?;

        if probe.check(&body, &final_url).is_blocked() {
            return Ok(CrawlOutcome::Blocked);
        }

        if status.as_u16() == 404 {
            return Ok(CrawlOutcome::NotFound);
        }

        if status.is_success() {
            Ok(CrawlOutcome::Success(final_url))
        } else {
            Ok(CrawlOutcome::Error(format!("HTTP {}", status.as_u16())))
        }
    }
}
