//! # Configuration Loader
//!
//! Reads the TOML file into [`AppConfig`] and layers the `AF_*` environment
//! overrides on top. Defaults live on the DTO itself; this module only loads.

use std::path::{Path, PathBuf};

use af_core::config::AppConfig;
use anyhow::Context;
use tracing::info;

pub const CONFIG_PATH_ENV: &str = "AF_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "auctionfront.toml";

/// Load configuration from a TOML file.
///
/// A missing file is not an error: the storefront runs on defaults. A file
/// that exists but cannot be read or parsed is.
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %config_path.display(), "Config file not found, using defaults");
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })
        }
    };
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
        .with_context(|| format!("Invalid configuration in {}", config_path.display()))
}

/// Applies `AF_API_BASE_URL`, `AF_KYC_AUTH_TOKEN`, `AF_RELAY_PORT` and
/// `AF_STATE_DIR`. `lookup` is `std::env::var` in production.
pub fn apply_env_overrides(
    config: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(base_url) = lookup("AF_API_BASE_URL") {
        config.api.base_url = base_url;
    }
    if let Some(token) = lookup("AF_KYC_AUTH_TOKEN") {
        config.kyc_services.auth_token = token;
    }
    if let Some(port) = lookup("AF_RELAY_PORT") {
        config.relay.port = port
            .trim()
            .parse()
            .with_context(|| format!("AF_RELAY_PORT is not a valid port: {port}"))?;
    }
    if let Some(dir) = lookup("AF_STATE_DIR") {
        config.storage.state_dir = Some(PathBuf::from(dir));
    }
    Ok(())
}

/// Path from `AF_CONFIG`, or `auctionfront.toml` in the working directory.
pub fn config_path_from_env() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Loads the file named by the environment and applies the overrides.
pub fn load_from_env() -> anyhow::Result<AppConfig> {
    let mut config = load_config(&config_path_from_env())?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_core::config::VerificationTransport;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_valid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
                [api]
                base_url = "https://api.example.com/api/"

                [relay]
                port = 4000
                public_base_url = "https://shop.example.com"

                [verification]
                transport = "message"
                max_poll_attempts = 10
                "#,
            )
            .unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(config.api.base_url, "https://api.example.com/api/");
        assert_eq!(config.relay.port, 4000);
        assert_eq!(config.verification.transport, VerificationTransport::Message);
        assert_eq!(config.verification.max_poll_attempts, 10);
        assert_eq!(config.listings.records_per_page, 21);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[relay\nport = ").unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config as TOML"));
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("AF_API_BASE_URL", "https://staging.example.com/api/"),
            ("AF_KYC_AUTH_TOKEN", "secret"),
            ("AF_RELAY_PORT", " 8088 "),
            ("AF_STATE_DIR", "/var/lib/auctionfront"),
        ]);
        let mut config = AppConfig::default();

        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.api.base_url, "https://staging.example.com/api/");
        assert_eq!(config.kyc_services.auth_token, "secret");
        assert_eq!(config.relay.port, 8088);
        assert_eq!(
            config.storage.state_dir,
            Some(PathBuf::from("/var/lib/auctionfront"))
        );
    }

    #[test]
    fn bad_port_override_is_rejected() {
        let mut config = AppConfig::default();
        let err = apply_env_overrides(&mut config, |key| {
            (key == "AF_RELAY_PORT").then(|| "eighty".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("AF_RELAY_PORT"));
        assert_eq!(config.relay.port, 3000);
    }
}
