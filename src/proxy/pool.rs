//! Proxy endpoint pool with round-robin selection

use std::collections::HashMap;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

/// What kind of proxy an endpoint is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyKind {
    /// Exit through the anonymity network (rotatable identity)
    AnonymityNetwork,

    /// Externally supplied proxy with a fixed identity
    DirectExternal,
}

impl ProxyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnonymityNetwork => "anonymity-network",
            Self::DirectExternal => "direct-external",
        }
    }
}

/// Per-endpoint success/failure counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndpointStats {
    pub success: u32,
    pub failure: u32,
}

impl EndpointStats {
    /// Success rate in percent, or None when the endpoint was never used
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.success + self.failure;
        if total == 0 {
            return None;
        }
        Some(f64::from(self.success) / f64::from(total) * 100.0)
    }
}

/// A single proxy endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    pub address: String,
    pub kind: ProxyKind,
}

/// Ordered pool of proxy endpoints with a wrapping rotation cursor
#[derive(Debug, Default)]
pub struct ProxyPool {
    endpoints: Vec<ProxyEndpoint>,
    cursor: usize,
    stats: HashMap<String, EndpointStats>,
}

impl ProxyPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates the pool from the selected sources
    ///
    /// Returns false if the resulting pool is empty, which callers treat as
    /// fatal at configuration time.
    pub fn configure(
        &mut self,
        external_endpoints: &[String],
        anonymity_address: Option<String>,
    ) -> bool {
        self.endpoints.clear();
        self.cursor = 0;

        for address in external_endpoints {
            self.endpoints.push(ProxyEndpoint {
                address: address.clone(),
                kind: ProxyKind::DirectExternal,
            });
        }

        if let Some(address) = anonymity_address {
            self.endpoints.push(ProxyEndpoint {
                address,
                kind: ProxyKind::AnonymityNetwork,
            });
        }

        self.stats = self
            .endpoints
            .iter()
            .map(|e| (e.address.clone(), EndpointStats::default()))
            .collect();

        if self.endpoints.is_empty() {
            tracing::warn!("No proxy endpoints configured");
            return false;
        }

        tracing::info!("Configured {} proxy endpoint(s)", self.endpoints.len());
        true
    }

    /// Returns the next endpoint in round-robin order
    ///
    /// The cursor wraps modulo pool size, so over N consecutive calls every
    /// endpoint of an N-sized pool is visited exactly once, in stable order.
    pub fn next(&mut self) -> Option<ProxyEndpoint> {
        if self.endpoints.is_empty() {
            return None;
        }

        let endpoint = self.endpoints[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.endpoints.len();
        Some(endpoint)
    }

    /// Records a successful use of the endpoint
    pub fn report_success(&mut self, endpoint: &ProxyEndpoint) {
        if let Some(stats) = self.stats.get_mut(&endpoint.address) {
            stats.success += 1;
        }
    }

    /// Records a failed use of the endpoint
    pub fn report_failure(&mut self, endpoint: &ProxyEndpoint) {
        if let Some(stats) = self.stats.get_mut(&endpoint.address) {
            stats.failure += 1;
        }
    }

    /// Per-endpoint usage statistics
    pub fn stats(&self) -> &HashMap<String, EndpointStats> {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Whether the pool contains an anonymity-network endpoint
    pub fn has_anonymity_endpoint(&self) -> bool {
        self.endpoints
            .iter()
            .any(|e| e.kind == ProxyKind::AnonymityNetwork)
    }
}

/// Probes the well-known local SOCKS ports for a running anonymity proxy
///
/// The browser-bundle port (9150) is checked first, then the standalone
/// daemon port (9050). Returns the SOCKS address of the first port that
/// accepts a connection.
pub fn probe_local_anonymity_proxy() -> Option<String> {
    for port in [9150u16, 9050] {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        match TcpStream::connect_timeout(&addr, Duration::from_secs(3)) {
            Ok(_) => {
                tracing::info!("Anonymity proxy reachable on port {}", port);
                return Some(format!("socks5://127.0.0.1:{}", port));
            }
            Err(_) => {
                tracing::debug!("No anonymity proxy on port {}", port);
            }
        }
    }

    tracing::warn!("Anonymity proxy not reachable on ports 9150 or 9050");
    None
}
