//! Engine and upstream configuration
//! Missing credentials or base URLs fail at startup, never per-request

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default home country for the domestic/international gate
pub const DEFAULT_HOME_COUNTRY: &str = "FR";

/// Default number of tracking history entries kept after normalization
pub const DEFAULT_HISTORY_CAP: usize = 3;

/// Default status string when no upstream field yields one
pub const DEFAULT_FALLBACK_STATUS: &str = "processing";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{service}: base URL is not configured")]
    MissingBaseUrl { service: &'static str },
    #[error("{service}: API credential is not configured")]
    MissingCredential { service: &'static str },
    #[error("{service}: invalid base URL: {detail}")]
    InvalidBaseUrl { service: &'static str, detail: String },
    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Resolution policy knobs, all with workable defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Country code considered domestic
    pub home_country: String,
    /// Maximum tracking history entries after normalization
    pub history_cap: usize,
    /// Status string used when no upstream status field is present
    pub fallback_status: String,
    /// Order metadata keys that may carry an embedded tracking number,
    /// tried in order
    pub tracking_meta_keys: Vec<String>,
    /// Page size for order searches (upstream list is newest-first)
    pub search_page_size: usize,
    /// Link template used when no upstream tracking URL is present;
    /// `{tracking_number}` is substituted
    pub tracking_link_template: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            home_country: DEFAULT_HOME_COUNTRY.to_string(),
            history_cap: DEFAULT_HISTORY_CAP,
            fallback_status: DEFAULT_FALLBACK_STATUS.to_string(),
            tracking_meta_keys: vec![
                "tracking_number".to_string(),
                "trackingNumber".to_string(),
                "tracking_code".to_string(),
            ],
            search_page_size: 10,
            tracking_link_template: "https://track.example.com/{tracking_number}".to_string(),
        }
    }
}

/// Connection settings for one upstream system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Account identifier for Basic auth; empty means Bearer auth
    pub auth_user: String,
    /// API token; loadable from the environment, never logged
    pub api_token: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Number of retries for transient errors (default: 2)
    pub max_retries: u32,
    /// Retry delay in milliseconds (default: 1000)
    pub retry_delay_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth_user: String::new(),
            api_token: String::new(),
            timeout_secs: 30,
            max_retries: 2,
            retry_delay_ms: 1000,
        }
    }
}

impl UpstreamConfig {
    /// Validate at startup, before any request is made
    pub fn validate(&self, service: &'static str) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl { service });
        }
        let parsed = url::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            service,
            detail: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidBaseUrl {
                service,
                detail: format!("unsupported scheme: {}", parsed.scheme()),
            });
        }
        if self.api_token.trim().is_empty() {
            return Err(ConfigError::MissingCredential { service });
        }
        Ok(())
    }
}

/// Full application configuration: engine policy plus the three upstreams
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub orders: UpstreamConfig,
    pub parcels: UpstreamConfig,
    pub carrier: UpstreamConfig,
}

impl AppConfig {
    /// Load from a JSON file, then apply environment credential overrides
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&raw)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Credentials may come from the environment instead of the file:
    /// PARCELASSIST_ORDERS_TOKEN, PARCELASSIST_PARCELS_TOKEN,
    /// PARCELASSIST_CARRIER_TOKEN
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("PARCELASSIST_ORDERS_TOKEN") {
            self.orders.api_token = token;
        }
        if let Ok(token) = std::env::var("PARCELASSIST_PARCELS_TOKEN") {
            self.parcels.api_token = token;
        }
        if let Ok(token) = std::env::var("PARCELASSIST_CARRIER_TOKEN") {
            self.carrier.api_token = token;
        }
    }

    /// Validate all three upstreams; fatal before any request
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.orders.validate("orders")?;
        self.parcels.validate("parcels")?;
        self.carrier.validate("carrier")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_upstream() -> UpstreamConfig {
        UpstreamConfig {
            base_url: "https://orders.example.com".to_string(),
            api_token: "token".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_engine_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.home_country, "FR");
        assert_eq!(cfg.history_cap, 3);
        assert_eq!(cfg.fallback_status, "processing");
        assert!(cfg.tracking_meta_keys.contains(&"tracking_number".to_string()));
    }

    #[test]
    fn test_validate_ok() {
        assert!(valid_upstream().validate("orders").is_ok());
    }

    #[test]
    fn test_validate_missing_base_url() {
        let cfg = UpstreamConfig {
            base_url: "  ".to_string(),
            ..valid_upstream()
        };
        assert!(matches!(
            cfg.validate("orders"),
            Err(ConfigError::MissingBaseUrl { service: "orders" })
        ));
    }

    #[test]
    fn test_validate_missing_token() {
        let cfg = UpstreamConfig {
            api_token: String::new(),
            ..valid_upstream()
        };
        assert!(matches!(
            cfg.validate("carrier"),
            Err(ConfigError::MissingCredential { service: "carrier" })
        ));
    }

    #[test]
    fn test_validate_rejects_non_http_scheme() {
        let cfg = UpstreamConfig {
            base_url: "ftp://orders.example.com".to_string(),
            ..valid_upstream()
        };
        assert!(matches!(
            cfg.validate("orders"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_config_json_partial() {
        // Unspecified fields fall back to defaults
        let raw = r#"{ "engine": { "home_country": "BE" } }"#;
        let cfg: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.engine.home_country, "BE");
        assert_eq!(cfg.engine.history_cap, 3);
        assert_eq!(cfg.orders.timeout_secs, 30);
    }
}
