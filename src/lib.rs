//! Veilcrawl: a careful registry-document collection engine
//!
//! This crate turns a static list of registry identifiers into a safe,
//! resumable, quota-respecting crawl campaign against a target that actively
//! blocks automated access. It coordinates an anonymity-network proxy pool,
//! block/CAPTCHA detection with human-assisted recovery, retry/backoff, and
//! crash-safe progress tracking.

pub mod campaign;
pub mod config;
pub mod detector;
pub mod ledger;
pub mod proxy;
pub mod quota;
pub mod session;
pub mod store;

use thiserror::Error;

/// Main error type for veilcrawl operations
#[derive(Debug, Error)]
pub enum VeilError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The daily request budget is spent. Fatal for the run; the campaign
    /// halts and may resume on the next calendar day.
    #[error("Daily request quota exhausted ({used}/{limit})")]
    QuotaExhausted { used: u32, limit: u32 },

    /// No proxy endpoints survived configuration. Fatal before any
    /// identifier is attempted.
    #[error("Proxy pool is empty after configuration")]
    ProxyPoolEmpty,

    #[error("Control channel error: {0}")]
    ControlChannel(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Identifier store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Operator console error: {0}")]
    Console(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for veilcrawl operations
pub type Result<T> = std::result::Result<T, VeilError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use campaign::{CampaignController, CrawlOutcome, TargetAdapter};
pub use config::Config;
pub use detector::{classify_page, Detection};
pub use ledger::ResumeLedger;
pub use proxy::{ProxyEndpoint, ProxyKind, ProxyManager};
pub use quota::QuotaTracker;
pub use session::{Session, SessionManager};
