//! Meraki Dashboard HTTP client (reqwest-based).

use std::time::Duration;

use assetsync_core::{DeviceSource, RetryPolicy, SourceDevice, SyncError, SyncResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, LINK, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::models::{next_page_link, MerakiDevice};

/// Public Meraki Dashboard API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.meraki.com/api/v1";

/// Largest page the device listing accepts.
const PAGE_SIZE: u32 = 1000;

/// Connection settings for the Dashboard API.
#[derive(Debug)]
pub struct MerakiConfig {
    pub api_key: SecretString,
    pub organization_id: String,
    pub base_url: Url,
    pub timeout: Duration,
    /// Retry applied to each page request.
    pub retry: RetryPolicy,
}

impl MerakiConfig {
    #[must_use]
    pub fn new(api_key: SecretString, organization_id: impl Into<String>, base_url: Url) -> Self {
        Self {
            api_key,
            organization_id: organization_id.into(),
            base_url,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Lists the devices of one Meraki organization.
#[derive(Debug)]
pub struct MerakiClient {
    http_client: Client,
    config: MerakiConfig,
}

impl MerakiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: MerakiConfig) -> SyncResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("assetsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::Transport(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http_client,
            config,
        })
    }

    #[must_use]
    pub fn organization_id(&self) -> &str {
        &self.config.organization_id
    }

    fn devices_url(&self) -> String {
        format!(
            "{}/organizations/{}/devices?perPage={PAGE_SIZE}",
            self.config.base_url.as_str().trim_end_matches('/'),
            self.config.organization_id
        )
    }

    /// Fetch one page of devices and the link to the next page, if any.
    async fn fetch_page(&self, url: &str) -> SyncResult<(Vec<MerakiDevice>, Option<String>)> {
        debug!(url, "Fetching device page");
        let response = self
            .http_client
            .get(url)
            .bearer_auth(self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = retry_after(response.headers());
            warn!(?retry_after_secs, "Meraki API rate limited");
            return Err(SyncError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(SyncError::RemoteOperationFailed {
                status: status.as_u16(),
                body,
            });
        }

        let next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_page_link);
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        let devices = serde_json::from_str(&body)
            .map_err(|e| SyncError::InvalidResponse(format!("Failed to parse devices: {e}")))?;
        Ok((devices, next))
    }
}

fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

#[async_trait]
impl DeviceSource for MerakiClient {
    #[instrument(skip(self), fields(organization_id = %self.config.organization_id))]
    async fn list_devices(&self) -> SyncResult<Vec<SourceDevice>> {
        let mut devices = Vec::new();
        let mut url = Some(self.devices_url());
        let mut pages = 0u32;

        while let Some(current) = url.take() {
            let (page, next) = self
                .config
                .retry
                .execute("list_devices", || self.fetch_page(&current))
                .await?;
            pages += 1;

            for device in page {
                match device.into_source_device() {
                    Some(source) => devices.push(source),
                    None => warn!("Skipping Meraki device without a serial"),
                }
            }
            url = next;
        }

        info!(devices = devices.len(), pages, "Fetched Meraki devices");
        Ok(devices)
    }
}
