use serde::Deserialize;

/// Main configuration structure for a veilcrawl campaign
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub campaign: CampaignConfig,
    pub quota: QuotaConfig,
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    pub paths: PathsConfig,
}

/// Controller behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignConfig {
    /// Rotate proxy and recreate the session every N identifiers
    #[serde(rename = "rotate-every", default = "default_rotate_every")]
    pub rotate_every: u32,

    /// URL template for the built-in probe adapter; `{id}` is replaced with
    /// the identifier. Library users inject their own adapter instead.
    #[serde(rename = "target-url")]
    pub target_url: Option<String>,

    /// Maximum attempts per identifier on transport failures
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-call timeout for network-facing operations, in seconds
    #[serde(rename = "call-timeout-secs", default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    /// Lower bound of the randomized pause between identifiers, in seconds
    #[serde(rename = "pace-min-secs", default = "default_pace_min")]
    pub pace_min_secs: f64,

    /// Upper bound of the randomized pause between identifiers, in seconds.
    /// Zero disables pacing entirely.
    #[serde(rename = "pace-max-secs", default = "default_pace_max")]
    pub pace_max_secs: f64,

    /// Whether identifiers whose attempt failed are still marked processed.
    /// Marking them guarantees forward progress at the cost of never
    /// revisiting an identifier that hit a transient site error.
    #[serde(rename = "mark-failed-attempts", default = "default_true")]
    pub mark_failed_attempts: bool,
}

/// Daily request budget configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaConfig {
    /// Maximum number of target requests per calendar day
    #[serde(rename = "daily-limit", default = "default_daily_limit")]
    pub daily_limit: u32,
}

/// Proxy pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Whether to include externally supplied proxy endpoints
    #[serde(rename = "use-external", default)]
    pub use_external: bool,

    /// Externally supplied proxy addresses (e.g. "http://proxy1.example.com:8080")
    #[serde(rename = "external-endpoints", default)]
    pub external_endpoints: Vec<String>,

    /// Whether to include the local anonymity-network proxy
    #[serde(rename = "use-anonymity-network", default = "default_true")]
    pub use_anonymity_network: bool,

    /// Override for the anonymity-network SOCKS address; when unset the
    /// well-known local ports are probed instead
    #[serde(rename = "anonymity-address")]
    pub anonymity_address: Option<String>,

    /// Address of the anonymity-network control channel
    #[serde(rename = "control-address", default = "default_control_address")]
    pub control_address: String,

    /// Control channel password, when the network daemon requires one
    #[serde(rename = "control-password")]
    pub control_password: Option<String>,
}

/// Identity renewal policy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Renewal is requested once this many requests used the same identity
    #[serde(rename = "usage-threshold", default = "default_usage_threshold")]
    pub usage_threshold: u32,

    /// Renewal is also requested once this much time passed, in seconds
    #[serde(rename = "time-threshold-secs", default = "default_time_threshold")]
    pub time_threshold_secs: u64,

    /// Minimum seconds between successful renewals (prevents renewal storms)
    #[serde(rename = "min-interval-secs", default = "default_min_interval")]
    pub min_interval_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            usage_threshold: default_usage_threshold(),
            time_threshold_secs: default_time_threshold(),
            min_interval_secs: default_min_interval(),
        }
    }
}

/// Filesystem paths for persisted campaign state
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// SQLite database holding the identifier list
    #[serde(rename = "identifier-db")]
    pub identifier_db: Option<String>,

    /// Plain-text identifier list, one per line (fallback to identifier-db)
    #[serde(rename = "identifier-file")]
    pub identifier_file: Option<String>,

    /// Quota state file, fully rewritten on every mutation
    #[serde(rename = "quota-file")]
    pub quota_file: String,

    /// Resume ledger file, fully rewritten on every mutation
    #[serde(rename = "ledger-file")]
    pub ledger_file: String,
}

fn default_rotate_every() -> u32 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_call_timeout() -> u64 {
    30
}

fn default_pace_min() -> f64 {
    1.0
}

fn default_pace_max() -> f64 {
    3.0
}

fn default_daily_limit() -> u32 {
    2950
}

fn default_usage_threshold() -> u32 {
    2500
}

fn default_time_threshold() -> u64 {
    1800
}

fn default_min_interval() -> u64 {
    60
}

fn default_control_address() -> String {
    "127.0.0.1:9051".to_string()
}

fn default_true() -> bool {
    true
}
