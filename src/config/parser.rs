use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a campaign configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let config: Config = toml::from_str(&content)?;

    // Validate the configuration
    validate(&config)?;

    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Used to detect whether the configuration changed between campaign runs.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[campaign]
rotate-every = 10
max-attempts = 3

[quota]
daily-limit = 2950

[proxy]
use-anonymity-network = true

[paths]
identifier-file = "./identifiers.txt"
quota-file = "./quota.json"
ledger-file = "./ledger.json"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.campaign.rotate_every, 10);
        assert_eq!(config.quota.daily_limit, 2950);
        assert!(config.proxy.use_anonymity_network);
        assert_eq!(config.identity.usage_threshold, 2500);
    }

    #[test]
    fn test_load_config_applies_defaults() {
        let config_content = r#"
[campaign]

[quota]

[proxy]

[paths]
identifier-file = "./identifiers.txt"
quota-file = "./quota.json"
ledger-file = "./ledger.json"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.campaign.rotate_every, 10);
        assert_eq!(config.campaign.max_attempts, 3);
        assert_eq!(config.campaign.call_timeout_secs, 30);
        assert_eq!(config.campaign.pace_min_secs, 1.0);
        assert_eq!(config.campaign.pace_max_secs, 3.0);
        assert!(config.campaign.mark_failed_attempts);
        assert_eq!(config.identity.min_interval_secs, 60);
        assert_eq!(config.proxy.control_address, "127.0.0.1:9051");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/campaign.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        // Neither proxy source enabled: pool would be empty at configure time.
        let config_content = r#"
[campaign]

[quota]

[proxy]
use-external = false
use-anonymity-network = false

[paths]
identifier-file = "./identifiers.txt"
quota-file = "./quota.json"
ledger-file = "./ledger.json"
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        // Same content should produce same hash
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA-256 produces 64 hex characters
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        assert_ne!(
            compute_config_hash(file1.path()).unwrap(),
            compute_config_hash(file2.path()).unwrap()
        );
    }
}
