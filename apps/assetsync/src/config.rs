//! Environment-driven configuration.

use std::env::VarError;
use std::time::Duration;

use assetsync_core::{RetryPolicy, SyncSettings};
use assetsync_meraki::{MerakiConfig, DEFAULT_BASE_URL};
use assetsync_snipeit::SnipeItConfig;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::logging::LogFormat;

/// Runtime configuration for the sync service.
#[derive(Debug)]
pub struct AppConfig {
    pub meraki_api_key: SecretString,
    pub meraki_organization_id: String,
    /// Dashboard API root, including the `/api/v1` prefix.
    pub meraki_base_url: Url,

    /// Snipe-IT instance root (without `/api/v1`).
    pub snipe_it_url: Url,
    pub snipe_it_api_key: SecretString,

    /// Default filter directive, overridden by `RUST_LOG`.
    pub log_level: String,
    pub log_format: LogFormat,

    /// Pause between consecutive devices.
    pub device_delay: Duration,
    /// Wait after a rate-limit response without a `Retry-After` hint.
    pub rate_limit_default_wait: Duration,
    pub http_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// This allows tests to supply variables without mutating process-global
    /// environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let get = |key: &str| reader(key).ok().filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).ok_or_else(|| ConfigError::MissingVar(key.into()));

        let meraki_api_key = SecretString::from(required("MERAKI_API_KEY")?);
        let meraki_organization_id = get("MERAKI_ORGANIZATION_ID")
            .or_else(|| get("ORGANIZATION_ID"))
            .ok_or_else(|| ConfigError::MissingVar("MERAKI_ORGANIZATION_ID".into()))?;
        let meraki_base_url = parse_url(
            "MERAKI_BASE_URL",
            &get("MERAKI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        )?;

        let snipe_it_url = parse_url("SNIPE_IT_URL", &required("SNIPE_IT_URL")?)?;
        let snipe_it_api_key = SecretString::from(required("SNIPE_IT_API_KEY")?);

        let log_level = get("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::InvalidValue("LOG_FORMAT".into(), e))?,
            None => LogFormat::Text,
        };

        let device_delay = Duration::from_millis(parse_u64(&get, "SYNC_DEVICE_DELAY_MS", 500)?);
        let rate_limit_default_wait =
            Duration::from_secs(parse_u64(&get, "RATE_LIMIT_DEFAULT_WAIT_SECS", 10)?);
        let http_timeout = Duration::from_secs(parse_u64(&get, "HTTP_TIMEOUT_SECS", 30)?);

        Ok(Self {
            meraki_api_key,
            meraki_organization_id,
            meraki_base_url,
            snipe_it_url,
            snipe_it_api_key,
            log_level,
            log_format,
            device_delay,
            rate_limit_default_wait,
            http_timeout,
        })
    }

    /// Retry policy shared by both remote systems.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(3, self.rate_limit_default_wait)
    }

    #[must_use]
    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            device_delay: self.device_delay,
            retry: self.retry_policy(),
        }
    }

    #[must_use]
    pub fn meraki(&self) -> MerakiConfig {
        let mut config = MerakiConfig::new(
            SecretString::from(self.meraki_api_key.expose_secret().to_string()),
            self.meraki_organization_id.clone(),
            self.meraki_base_url.clone(),
        );
        config.timeout = self.http_timeout;
        config.retry = self.retry_policy();
        config
    }

    #[must_use]
    pub fn snipe_it(&self) -> SnipeItConfig {
        let mut config = SnipeItConfig::new(
            self.snipe_it_url.clone(),
            SecretString::from(self.snipe_it_api_key.expose_secret().to_string()),
        );
        config.timeout = self.http_timeout;
        config
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue(key.into(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidValue(
            key.into(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}

fn parse_u64<G>(get: &G, key: &str, default: u64) -> Result<u64, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(key.into(), e.to_string())),
        None => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
