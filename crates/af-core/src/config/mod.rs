//! # Configuration DTO
//!
//! TOML → [`AppConfig`] mapping. Every section is optional and falls back to
//! the storefront's defaults, so an empty file is a valid configuration.
//! Loading the file and applying environment overrides happens in the
//! server bootstrap.

use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub kyc_services: KycServicesConfig,
    pub relay: RelayConfig,
    pub listings: ListingsConfig,
    pub verification: VerificationConfig,
    pub bidding: BiddingConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_toml(value: &toml::Value) -> anyhow::Result<Self> {
        Ok(value.clone().try_into()?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend REST root; endpoint paths are appended to it.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/".to_string(),
            timeout_secs: 30,
        }
    }
}

/// PAN lookup and DigiLocker service credentials.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KycServicesConfig {
    pub base_url: String,
    pub client_user_id: String,
    pub auth_token: String,
}

impl Default for KycServicesConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001/".to_string(),
            client_user_id: String::new(),
            auth_token: String::new(),
        }
    }
}

impl std::fmt::Debug for KycServicesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KycServicesConfig")
            .field("base_url", &self.base_url)
            .field("client_user_id", &self.client_user_id)
            .field("auth_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub bind_address: String,
    pub port: u16,
    /// Origin the DigiLocker callback and the status endpoint are reached at.
    pub public_base_url: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
            public_base_url: "http://localhost:3000".to_string(),
        }
    }
}

impl RelayConfig {
    pub fn callback_url(&self, user_id: &str) -> String {
        format!(
            "{}/api/verify-aadhaar-webhook?user_id={}",
            self.public_base_url.trim_end_matches('/'),
            user_id
        )
    }

    pub fn status_url(&self) -> String {
        format!(
            "{}/api/aadhaar-verification-status",
            self.public_base_url.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingsConfig {
    pub records_per_page: u32,
    pub filter_debounce_ms: u64,
    /// Offset of the backend's bare `YYYY-MM-DD HH:mm:ss` timestamps.
    pub timezone_offset_minutes: i32,
}

impl Default for ListingsConfig {
    fn default() -> Self {
        Self {
            records_per_page: 21,
            filter_debounce_ms: 300,
            timezone_offset_minutes: 330,
        }
    }
}

impl ListingsConfig {
    /// Out-of-range offsets fall back to UTC.
    pub fn timezone_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.timezone_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationTransport {
    #[default]
    Polling,
    Message,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub transport: VerificationTransport,
    pub poll_interval_secs: u64,
    pub max_poll_attempts: u32,
    pub close_delay_ms: u64,
    /// Origin window messages must come from; defaults to the relay's.
    pub allowed_origin: Option<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            transport: VerificationTransport::Polling,
            poll_interval_secs: 5,
            max_poll_attempts: 60,
            close_delay_ms: 1500,
            allowed_origin: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiddingConfig {
    pub default_increment: u64,
    /// Re-read item details after an accepted bid instead of trusting the
    /// optimistic update alone.
    pub reconcile_after_bid: bool,
}

impl Default for BiddingConfig {
    fn default() -> Self {
        Self {
            default_increment: 10_000,
            reconcile_after_bid: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Where client state is persisted. `None` keeps state in memory only.
    pub state_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily-rolling log files; stdout only when unset.
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.listings.records_per_page, 21);
        assert_eq!(config.verification.max_poll_attempts, 60);
        assert_eq!(config.bidding.default_increment, 10_000);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [verification]
            transport = "message"

            [relay]
            port = 4100
            public_base_url = "https://shop.example.com/"
            "#,
        )
        .unwrap();

        assert_eq!(config.verification.transport, VerificationTransport::Message);
        assert_eq!(config.verification.poll_interval_secs, 5);
        assert_eq!(config.relay.port, 4100);
        assert_eq!(config.relay.bind_address, "127.0.0.1");
        assert_eq!(
            config.relay.callback_url("42"),
            "https://shop.example.com/api/verify-aadhaar-webhook?user_id=42"
        );
    }

    #[test]
    fn ist_offset_by_default() {
        let offset = ListingsConfig::default().timezone_offset();
        assert_eq!(offset.local_minus_utc(), 330 * 60);
    }

    #[test]
    fn token_is_redacted_in_debug() {
        let config = KycServicesConfig {
            auth_token: "secret".into(),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn unknown_transport_is_rejected() {
        assert!(AppConfig::from_toml_str("[verification]\ntransport = \"carrier-pigeon\"").is_err());
    }
}
