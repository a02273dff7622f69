//! Anonymity proxy management
//!
//! This module owns the proxy endpoint pool, the identity renewal policy,
//! and the control channel used to request new exit identities:
//! - Round-robin endpoint selection with per-endpoint statistics
//! - Usage- and time-based identity renewal with a storm guard
//! - Line-oriented control protocol client

mod control;
mod identity;
mod pool;

pub use control::ControlChannel;
pub use identity::IdentityRotationState;
pub use pool::{probe_local_anonymity_proxy, EndpointStats, ProxyEndpoint, ProxyKind, ProxyPool};

use crate::config::{IdentityConfig, ProxyConfig};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Coordinates the proxy pool with the identity renewal policy
///
/// Owned exclusively by the campaign controller; there is no concurrent
/// access and therefore no synchronization.
#[derive(Debug)]
pub struct ProxyManager {
    pool: ProxyPool,
    identity: IdentityRotationState,
    control: ControlChannel,
}

impl ProxyManager {
    pub fn new(
        proxy_config: &ProxyConfig,
        identity_config: &IdentityConfig,
        call_timeout: Duration,
    ) -> Self {
        Self {
            pool: ProxyPool::new(),
            identity: IdentityRotationState::new(identity_config),
            control: ControlChannel::new(
                &proxy_config.control_address,
                proxy_config.control_password.clone(),
                call_timeout,
            ),
        }
    }

    /// Overrides the control channel (tests use scripted endpoints)
    pub fn with_control(mut self, control: ControlChannel) -> Self {
        self.control = control;
        self
    }

    /// Builds the endpoint pool from the configured sources
    ///
    /// When the anonymity network is enabled and no address override is set,
    /// the well-known local SOCKS ports are probed. Returns false if the
    /// resulting pool is empty; the controller treats that as fatal.
    pub fn configure(&mut self, config: &ProxyConfig) -> bool {
        let external: &[String] = if config.use_external {
            &config.external_endpoints
        } else {
            &[]
        };

        let anonymity = if config.use_anonymity_network {
            config
                .anonymity_address
                .clone()
                .or_else(probe_local_anonymity_proxy)
        } else {
            None
        };

        self.pool.configure(external, anonymity)
    }

    /// Returns the next proxy endpoint in round-robin order
    ///
    /// Each call counts one use against the current identity; when the
    /// renewal policy says the identity is both due and allowed to change,
    /// a renewal is attempted through the control channel first. A failed
    /// renewal is logged and the current identity serves the next cycle.
    pub async fn next(&mut self) -> Option<ProxyEndpoint> {
        self.identity.record_use();

        if self.pool.has_anonymity_endpoint() {
            self.maybe_renew_identity().await;
        }

        self.pool.next()
    }

    async fn maybe_renew_identity(&mut self) {
        let now = Instant::now();
        if !self.identity.renewal_due(now) || !self.identity.renewal_allowed(now) {
            return;
        }

        tracing::info!(
            "Identity renewal due after {} use(s), requesting new exit identity",
            self.identity.usage_counter()
        );

        match self.control.request_new_identity().await {
            Ok(()) => {
                self.identity.mark_renewed(Instant::now());
            }
            Err(e) => {
                tracing::warn!("Identity renewal failed, keeping current identity: {}", e);
            }
        }
    }

    pub fn report_success(&mut self, endpoint: &ProxyEndpoint) {
        self.pool.report_success(endpoint);
    }

    pub fn report_failure(&mut self, endpoint: &ProxyEndpoint) {
        self.pool.report_failure(endpoint);
    }

    /// Per-endpoint usage statistics, keyed by address
    pub fn stats(&self) -> &HashMap<String, EndpointStats> {
        self.pool.stats()
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }
}
