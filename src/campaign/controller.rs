//! Campaign controller - per-identifier crawl orchestration
//!
//! The controller turns the identifier list into a sequence of attempts:
//! - Resume ledger skip check
//! - Quota check (denial halts the whole campaign)
//! - Proxy rotation and session recreation every N identifiers
//! - Randomized human-pacing pause between identifiers
//! - Target adapter invocation with block detection and human recovery
//! - Bounded exponential backoff with jitter for transport failures
//! - Crash-safe progress tracking and per-proxy statistics
//!
//! Strictly sequential: one active session, one in-flight identifier.
//! Operator interrupts are honored only at safe points, between
//! identifiers.

use crate::campaign::adapter::{AttemptError, CrawlOutcome, DetectorProbe, TargetAdapter};
use crate::campaign::recovery::OperatorGate;
use crate::campaign::report::{CampaignEnd, CampaignReport};
use crate::config::Config;
use crate::ledger::ResumeLedger;
use crate::proxy::{ProxyEndpoint, ProxyManager};
use crate::quota::QuotaTracker;
use crate::session::SessionManager;
use crate::{Result, VeilError};
use rand::Rng;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Orchestrates one campaign over an identifier list
pub struct CampaignController {
    config: Config,
    quota: QuotaTracker,
    ledger: ResumeLedger,
    proxies: ProxyManager,
    sessions: SessionManager,
    adapter: Box<dyn TargetAdapter>,
    gate: Box<dyn OperatorGate>,
    probe: DetectorProbe,
    interrupt: Arc<AtomicBool>,
    current_proxy: Option<ProxyEndpoint>,
}

impl CampaignController {
    /// Creates a controller with explicitly injected collaborators
    ///
    /// Loads quota and ledger state from the configured paths and builds
    /// the proxy pool.
    ///
    /// # Errors
    ///
    /// * `VeilError::ProxyPoolEmpty` - No proxy endpoints survived
    ///   configuration; fatal before any identifier is touched
    pub fn new(
        config: Config,
        adapter: Box<dyn TargetAdapter>,
        gate: Box<dyn OperatorGate>,
    ) -> Result<Self> {
        let call_timeout = Duration::from_secs(config.campaign.call_timeout_secs);

        let quota = QuotaTracker::load(Path::new(&config.paths.quota_file), config.quota.daily_limit);
        let ledger = ResumeLedger::load(Path::new(&config.paths.ledger_file));

        let mut proxies = ProxyManager::new(&config.proxy, &config.identity, call_timeout);
        if !proxies.configure(&config.proxy) {
            return Err(VeilError::ProxyPoolEmpty);
        }

        Ok(Self {
            sessions: SessionManager::new(call_timeout),
            config,
            quota,
            ledger,
            proxies,
            adapter,
            gate,
            probe: DetectorProbe,
            interrupt: Arc::new(AtomicBool::new(false)),
            current_proxy: None,
        })
    }

    /// Flag the operator-interrupt handler sets; checked between identifiers
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        self.interrupt.clone()
    }

    /// Runs the campaign over the given identifier list
    ///
    /// Terminates on list exhaustion, quota denial, or operator interrupt.
    /// Only quota denial and an empty proxy pool halt the campaign; every
    /// other failure is contained to its identifier.
    pub async fn run(&mut self, identifiers: &[String]) -> Result<CampaignReport> {
        let total = identifiers.len();
        let start = std::time::Instant::now();
        let mut report = CampaignReport::new();

        tracing::info!(
            "Campaign start: {} identifier(s), {} request(s) remaining today",
            total,
            self.quota.remaining()
        );

        for (index, identifier) in identifiers.iter().enumerate() {
            // Safe point: honor interrupts only between identifiers
            if self.interrupt.load(Ordering::SeqCst) {
                tracing::warn!("Operator interrupt, stopping before {}", identifier);
                report.end = CampaignEnd::Interrupted;
                report.remaining = (total - index) as u32;
                break;
            }

            if self.ledger.contains(identifier) {
                tracing::debug!("{} already attempted, skipping", identifier);
                report.skipped_resume += 1;
                continue;
            }

            if !self.quota.can_make_request() {
                tracing::warn!(
                    "Daily quota exhausted ({} requests), halting campaign",
                    self.quota.daily_limit()
                );
                report.end = CampaignEnd::QuotaDenied;
                report.remaining = (total - index) as u32;
                break;
            }

            // Spread load: fresh proxy and session every N identifiers
            if report.attempted % self.config.campaign.rotate_every == 0 {
                self.rotate_proxy().await?;
            }

            // Human pacing: randomized pause between identifiers, not
            // before the first one
            if report.attempted > 0 {
                let pause = pacing_delay(
                    self.config.campaign.pace_min_secs,
                    self.config.campaign.pace_max_secs,
                );
                if !pause.is_zero() {
                    tracing::debug!("Pacing {:.1}s before {}", pause.as_secs_f64(), identifier);
                    tokio::time::sleep(pause).await;
                }
            }

            let outcome = match self.process_identifier(identifier).await {
                Ok(outcome) => outcome,
                Err(VeilError::QuotaExhausted { used, limit }) => {
                    // The in-progress identifier is NOT marked processed
                    tracing::warn!("Quota denied mid-identifier ({}/{}), halting", used, limit);
                    report.end = CampaignEnd::QuotaDenied;
                    report.remaining = (total - index) as u32;
                    break;
                }
                Err(e) => return Err(e),
            };

            report.attempted += 1;
            tracing::info!("[{}/{}] {} -> {}", index + 1, total, identifier, outcome.label());

            let proxy = self.current_proxy.clone();
            match &outcome {
                CrawlOutcome::Success(artifact) => {
                    tracing::debug!("{} collected: {}", identifier, artifact);
                    report.succeeded += 1;
                    if let Some(p) = &proxy {
                        self.proxies.report_success(p);
                    }
                }
                CrawlOutcome::NotFound => {
                    report.not_found += 1;
                    if let Some(p) = &proxy {
                        self.proxies.report_success(p);
                    }
                }
                CrawlOutcome::Blocked => {
                    report.blocked += 1;
                    if let Some(p) = &proxy {
                        self.proxies.report_failure(p);
                    }
                }
                CrawlOutcome::Error(detail) => {
                    tracing::warn!("{} failed: {}", identifier, detail);
                    report.errored += 1;
                    if let Some(p) = &proxy {
                        self.proxies.report_failure(p);
                    }
                }
            }

            // Forward-progress bias: failed attempts are marked too, unless
            // the operator opted into stricter retry-next-run semantics.
            let mark = match &outcome {
                CrawlOutcome::Error(_) => self.config.campaign.mark_failed_attempts,
                _ => true,
            };
            if mark {
                self.ledger.mark_processed(identifier);
            }

            if report.attempted % 10 == 0 {
                let rate = f64::from(report.attempted) / start.elapsed().as_secs_f64().max(0.001);
                tracing::info!(
                    "Progress: {} attempted, {} collected, {} remaining in quota, {:.2} ids/sec",
                    report.attempted,
                    report.succeeded,
                    self.quota.remaining(),
                    rate
                );
            }
        }

        self.sessions.teardown();
        tracing::info!("Campaign finished: {}", report.end.describe());
        Ok(report)
    }

    /// Renders the final summary with proxy and quota statistics
    pub fn render_report(&mut self, report: &CampaignReport) -> String {
        let quota_report = self.quota.status_report();
        report.render(self.proxies.stats(), &quota_report)
    }

    /// Processes one identifier to a terminal outcome
    ///
    /// Retries transport failures with bounded jittered backoff and block
    /// detections with at most one rotate-and-retry after recovery fails.
    /// Only quota denial escapes as an error.
    async fn process_identifier(&mut self, identifier: &str) -> Result<CrawlOutcome> {
        let mut block_retry_used = false;
        let mut attempt: u32 = 0;

        loop {
            if !self.quota.register_request() {
                return Err(VeilError::QuotaExhausted {
                    used: self.quota.state().count,
                    limit: self.quota.daily_limit(),
                });
            }

            let proxy = self.current_proxy.clone().ok_or(VeilError::ProxyPoolEmpty)?;
            let session = match self.sessions.ensure_session(&proxy) {
                Ok(session) => session,
                Err(e) => {
                    // Contained to this identifier; the session is rebuilt
                    // from scratch on the next use.
                    self.sessions.teardown();
                    return Ok(CrawlOutcome::Error(format!("session unavailable: {}", e)));
                }
            };

            match self.adapter.collect(session, identifier, &self.probe).await {
                Ok(CrawlOutcome::Blocked) => {
                    if block_retry_used {
                        tracing::warn!("{} still blocked after retry, giving up", identifier);
                        return Ok(CrawlOutcome::Blocked);
                    }

                    if self.recover(identifier).await {
                        tracing::info!("Recovery succeeded, retrying {}", identifier);
                    } else {
                        tracing::warn!("Recovery failed, rotating proxy and retrying {}", identifier);
                        self.rotate_proxy().await?;
                    }

                    // Never more than one block-triggered retry per identifier
                    block_retry_used = true;
                }

                Ok(outcome) => return Ok(outcome),

                Err(error) => {
                    attempt += 1;
                    if attempt >= self.config.campaign.max_attempts {
                        return Ok(CrawlOutcome::Error(error.to_string()));
                    }

                    let wait = backoff_delay(attempt);
                    match &error {
                        AttemptError::Transport(detail) => {
                            tracing::warn!(
                                "Transport failure for {} (attempt {}): {}; backing off {:.1}s",
                                identifier,
                                attempt,
                                detail,
                                wait.as_secs_f64()
                            );
                        }
                        AttemptError::Adapter(detail) => {
                            tracing::warn!(
                                "Adapter failure for {} (attempt {}): {}; backing off {:.1}s",
                                identifier,
                                attempt,
                                detail,
                                wait.as_secs_f64()
                            );
                        }
                    }
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Runs the human-assisted recovery protocol
    ///
    /// Blocks on the operator gate (unbounded by design), then re-checks
    /// the page state exactly once. Returns whether the block cleared.
    /// A gate failure counts as failed recovery, contained to the current
    /// identifier like any other non-fatal failure.
    async fn recover(&mut self, identifier: &str) -> bool {
        if let Err(e) = self.gate.await_acknowledgement(identifier).await {
            tracing::warn!("Operator gate failed for {}: {}", identifier, e);
            return false;
        }

        let Some(proxy) = self.current_proxy.clone() else {
            return false;
        };
        let Ok(session) = self.sessions.ensure_session(&proxy) else {
            return false;
        };

        let detection = self.adapter.recheck_block(session, &self.probe).await;
        if detection.is_blocked() {
            tracing::warn!("Block still present after operator recovery");
            false
        } else {
            true
        }
    }

    /// Advances to the next proxy and tears the session down
    ///
    /// The replacement session is created lazily on the next use, bound to
    /// the new proxy.
    async fn rotate_proxy(&mut self) -> Result<()> {
        self.sessions.teardown();

        match self.proxies.next().await {
            Some(endpoint) => {
                tracing::info!("Rotated to proxy {}", endpoint.address);
                self.current_proxy = Some(endpoint);
                Ok(())
            }
            None => Err(VeilError::ProxyPoolEmpty),
        }
    }
}

/// Backoff before retry `attempt`: 2^attempt seconds plus up to 2s jitter
fn backoff_delay(attempt: u32) -> Duration {
    let base = 2u64.saturating_pow(attempt.min(6));
    let jitter: f64 = rand::thread_rng().gen_range(0.0..2.0);
    Duration::from_secs_f64(base as f64 + jitter)
}

/// Human-pacing pause drawn uniformly from the configured bounds
///
/// A zero upper bound disables pacing.
fn pacing_delay(min_secs: f64, max_secs: f64) -> Duration {
    if max_secs <= 0.0 {
        return Duration::ZERO;
    }
    let secs = rand::thread_rng().gen_range(min_secs..=max_secs);
    Duration::from_secs_f64(secs)
}
