use crate::config::types::{CampaignConfig, Config, PathsConfig, ProxyConfig, QuotaConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_campaign_config(&config.campaign)?;
    validate_quota_config(&config.quota)?;
    validate_proxy_config(&config.proxy)?;
    validate_paths_config(&config.paths)?;
    Ok(())
}

/// Validates controller configuration
fn validate_campaign_config(config: &CampaignConfig) -> Result<(), ConfigError> {
    if config.rotate_every < 1 {
        return Err(ConfigError::Validation(format!(
            "rotate-every must be >= 1, got {}",
            config.rotate_every
        )));
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.call_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "call-timeout-secs must be >= 1, got {}",
            config.call_timeout_secs
        )));
    }

    if config.pace_min_secs < 0.0 || config.pace_max_secs < config.pace_min_secs {
        return Err(ConfigError::Validation(format!(
            "pacing bounds must satisfy 0 <= pace-min-secs <= pace-max-secs, got {} and {}",
            config.pace_min_secs, config.pace_max_secs
        )));
    }

    Ok(())
}

/// Validates quota configuration
fn validate_quota_config(config: &QuotaConfig) -> Result<(), ConfigError> {
    if config.daily_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "daily-limit must be >= 1, got {}",
            config.daily_limit
        )));
    }

    Ok(())
}

/// Validates proxy configuration
///
/// An empty resulting pool is a fatal configuration error, so the cheap
/// structural cases are rejected before the campaign even starts.
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    if !config.use_external && !config.use_anonymity_network {
        return Err(ConfigError::Validation(
            "at least one of use-external and use-anonymity-network must be enabled".to_string(),
        ));
    }

    if config.use_external && config.external_endpoints.is_empty() {
        return Err(ConfigError::Validation(
            "use-external is enabled but external-endpoints is empty".to_string(),
        ));
    }

    for endpoint in &config.external_endpoints {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("socks5://") {
            return Err(ConfigError::Validation(format!(
                "external endpoint must start with http:// or socks5://, got '{}'",
                endpoint
            )));
        }
    }

    if config.control_address.is_empty() {
        return Err(ConfigError::Validation(
            "control-address cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates path configuration
fn validate_paths_config(config: &PathsConfig) -> Result<(), ConfigError> {
    if config.identifier_db.is_none() && config.identifier_file.is_none() {
        return Err(ConfigError::Validation(
            "one of identifier-db and identifier-file must be set".to_string(),
        ));
    }

    if config.quota_file.is_empty() {
        return Err(ConfigError::Validation(
            "quota-file cannot be empty".to_string(),
        ));
    }

    if config.ledger_file.is_empty() {
        return Err(ConfigError::Validation(
            "ledger-file cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::IdentityConfig;

    fn base_config() -> Config {
        Config {
            campaign: CampaignConfig {
                rotate_every: 10,
                target_url: None,
                max_attempts: 3,
                call_timeout_secs: 30,
                pace_min_secs: 1.0,
                pace_max_secs: 3.0,
                mark_failed_attempts: true,
            },
            quota: QuotaConfig { daily_limit: 2950 },
            proxy: ProxyConfig {
                use_external: false,
                external_endpoints: vec![],
                use_anonymity_network: true,
                anonymity_address: None,
                control_address: "127.0.0.1:9051".to_string(),
                control_password: None,
            },
            identity: IdentityConfig::default(),
            paths: PathsConfig {
                identifier_db: None,
                identifier_file: Some("./identifiers.txt".to_string()),
                quota_file: "./quota.json".to_string(),
                ledger_file: "./ledger.json".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn test_rejects_zero_rotate_every() {
        let mut config = base_config();
        config.campaign.rotate_every = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_inverted_pacing_bounds() {
        let mut config = base_config();
        config.campaign.pace_min_secs = 3.0;
        config.campaign.pace_max_secs = 1.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_negative_pacing() {
        let mut config = base_config();
        config.campaign.pace_min_secs = -1.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_accepts_disabled_pacing() {
        let mut config = base_config();
        config.campaign.pace_min_secs = 0.0;
        config.campaign.pace_max_secs = 0.0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_zero_daily_limit() {
        let mut config = base_config();
        config.quota.daily_limit = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_no_proxy_sources() {
        let mut config = base_config();
        config.proxy.use_anonymity_network = false;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_external_without_endpoints() {
        let mut config = base_config();
        config.proxy.use_external = true;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_malformed_external_endpoint() {
        let mut config = base_config();
        config.proxy.use_external = true;
        config.proxy.external_endpoints = vec!["ftp://proxy:21".to_string()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_accepts_external_endpoints() {
        let mut config = base_config();
        config.proxy.use_external = true;
        config.proxy.external_endpoints = vec![
            "http://proxy1.example.com:8080".to_string(),
            "socks5://127.0.0.1:1080".to_string(),
        ];
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_missing_identifier_source() {
        let mut config = base_config();
        config.paths.identifier_file = None;
        assert!(validate(&config).is_err());
    }
}
