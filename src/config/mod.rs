//! Configuration module for veilcrawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use veilcrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("campaign.toml")).unwrap();
//! println!("Daily request limit: {}", config.quota.daily_limit);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CampaignConfig, Config, IdentityConfig, PathsConfig, ProxyConfig, QuotaConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
