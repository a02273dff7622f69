//! Session management
//!
//! Owns at most one active automation session bound to a specific proxy
//! endpoint. A session is an HTTP client configured with the proxy binding
//! and an independently drawn fingerprint profile; it is torn down and
//! recreated whenever the proxy changes, and never reused across a proxy
//! change.

mod fingerprint;

pub use fingerprint::FingerprintProfile;

use crate::proxy::ProxyEndpoint;
use crate::{Result, VeilError};
use std::time::Duration;

/// One active session bound to a proxy endpoint
#[derive(Debug)]
pub struct Session {
    client: reqwest::Client,
    proxy: ProxyEndpoint,
    fingerprint: FingerprintProfile,
}

impl Session {
    fn new(proxy: &ProxyEndpoint, call_timeout: Duration) -> Result<Self> {
        let fingerprint = FingerprintProfile::random();

        let client = reqwest::Client::builder()
            .user_agent(fingerprint.user_agent.clone())
            .timeout(call_timeout)
            .connect_timeout(Duration::from_secs(10))
            .proxy(reqwest::Proxy::all(&proxy.address).map_err(|e| {
                VeilError::Session(format!("Invalid proxy address {}: {}", proxy.address, e))
            })?)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| VeilError::Session(format!("Failed to build client: {}", e)))?;

        tracing::debug!(
            "Session created via {} ({}x{}, {} cores, {})",
            proxy.address,
            fingerprint.viewport.0,
            fingerprint.viewport.1,
            fingerprint.hardware_concurrency,
            fingerprint.platform
        );

        Ok(Self {
            client,
            proxy: proxy.clone(),
            fingerprint,
        })
    }

    /// The proxy endpoint this session is bound to
    pub fn proxy(&self) -> &ProxyEndpoint {
        &self.proxy
    }

    /// The HTTP client routed through the bound proxy
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// The fingerprint profile this session presents
    pub fn fingerprint(&self) -> &FingerprintProfile {
        &self.fingerprint
    }
}

/// Owns the single active session for a campaign
#[derive(Debug)]
pub struct SessionManager {
    current: Option<Session>,
    call_timeout: Duration,
}

impl SessionManager {
    pub fn new(call_timeout: Duration) -> Self {
        Self {
            current: None,
            call_timeout,
        }
    }

    /// Returns a session bound to the given proxy
    ///
    /// Creates a new session if none exists or the proxy differs from the
    /// current binding; the old session is torn down first.
    pub fn ensure_session(&mut self, proxy: &ProxyEndpoint) -> Result<&Session> {
        let needs_new = match &self.current {
            Some(session) => session.proxy.address != proxy.address,
            None => true,
        };

        if needs_new {
            self.teardown();
            self.current = Some(Session::new(proxy, self.call_timeout)?);
        }

        match &self.current {
            Some(session) => Ok(session),
            None => Err(VeilError::Session("session was not created".to_string())),
        }
    }

    /// Releases the current session, if any
    pub fn teardown(&mut self) {
        if self.current.take().is_some() {
            tracing::debug!("Session torn down");
        }
    }

    /// Whether a session is currently active
    pub fn has_session(&self) -> bool {
        self.current.is_some()
    }
}
