//! Snipe-IT REST client (reqwest-based).

use std::time::Duration;

use assetsync_core::{
    AssetFieldSet, AssetRecord, AssetSystem, NameMatching, NewTaxonomyEntry, RemoteId,
    SyncError, SyncResult, TaxonomyEntry, TaxonomyKind,
};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::models::{
    HardwareRow, ListResponse, NewCategory, NewModel, TaxonomyRow, WriteResponse,
};

/// Rows requested per listing page.
const PAGE_LIMIT: u64 = 500;

/// Connection settings for a Snipe-IT instance.
#[derive(Debug)]
pub struct SnipeItConfig {
    /// Instance root, e.g. `https://assets.example.com`.
    pub base_url: Url,
    pub api_key: SecretString,
    pub timeout: Duration,
}

impl SnipeItConfig {
    #[must_use]
    pub fn new(base_url: Url, api_key: SecretString) -> Self {
        Self {
            base_url,
            api_key,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Snipe-IT asset system client.
#[derive(Debug)]
pub struct SnipeItClient {
    api_base: String,
    api_key: SecretString,
    http_client: Client,
}

impl SnipeItClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: SnipeItConfig) -> SyncResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("assetsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base: format!(
                "{}/api/v1",
                config.base_url.as_str().trim_end_matches('/')
            ),
            api_key: config.api_key,
            http_client,
        })
    }

    /// Base of every API route, `{instance}/api/v1`.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(self.api_key.expose_secret())
            .header(ACCEPT, "application/json")
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> SyncResult<T> {
        let url = format!("{}{path}", self.api_base);
        debug!(%url, "GET");
        let response = self
            .request(self.http_client.get(&url).query(query))
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        Self::handle_response(response).await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> SyncResult<RemoteId> {
        let url = format!("{}{path}", self.api_base);
        debug!(%url, "POST");
        let response = self
            .request(self.http_client.post(&url).json(body))
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        Self::handle_write(response).await
    }

    async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> SyncResult<RemoteId> {
        let url = format!("{}{path}", self.api_base);
        debug!(%url, "PUT");
        let response = self
            .request(self.http_client.put(&url).json(body))
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        Self::handle_write(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> SyncResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from(response).await);
        }
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        serde_json::from_str(&body)
            .map_err(|e| SyncError::InvalidResponse(format!("Failed to parse response: {e}")))
    }

    /// Decode a create/update response, treating `status: "error"` as failure.
    async fn handle_write(response: Response) -> SyncResult<RemoteId> {
        let status = response.status();
        let written: WriteResponse = Self::handle_response(response).await?;
        if written.is_error() {
            return Err(SyncError::RemoteOperationFailed {
                status: status.as_u16(),
                body: written.messages_text(),
            });
        }
        written
            .payload
            .map(|p| RemoteId(p.id))
            .ok_or_else(|| SyncError::InvalidResponse("Write response has no payload id".into()))
    }

    async fn error_from(response: Response) -> SyncError {
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            warn!(?retry_after_secs, "Snipe-IT rate limited");
            return SyncError::RateLimited { retry_after_secs };
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        SyncError::RemoteOperationFailed {
            status: status.as_u16(),
            body: if body.is_empty() {
                format!("HTTP {status}")
            } else {
                body
            },
        }
    }

    /// Fetch every row of a collection matching `filters`, page by page, until
    /// `total` is reached.
    async fn list_all<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &[(&str, String)],
    ) -> SyncResult<Vec<T>> {
        let mut rows = Vec::new();
        let mut offset = 0u64;
        loop {
            let mut query = filters.to_vec();
            query.push(("limit", PAGE_LIMIT.to_string()));
            query.push(("offset", offset.to_string()));
            let page: ListResponse<T> = self.get(path, &query).await?;
            let fetched = page.rows.len() as u64;
            rows.extend(page.rows);
            offset += fetched;
            if fetched == 0 || offset >= page.total {
                return Ok(rows);
            }
        }
    }

    fn record_from(id: RemoteId, fields: &AssetFieldSet) -> AssetRecord {
        AssetRecord {
            id,
            name: fields.name.clone(),
            asset_tag: Some(fields.asset_tag.clone()),
            serial: Some(fields.serial.clone()),
            model_id: Some(fields.model_id),
            status_id: Some(fields.status_id),
            notes: Some(fields.notes.clone()),
            purchase_date: fields.purchase_date,
            purchase_cost: fields.purchase_cost,
        }
    }
}

fn collection(kind: TaxonomyKind) -> &'static str {
    match kind {
        TaxonomyKind::Category => "/categories",
        TaxonomyKind::Model => "/models",
    }
}

#[async_trait]
impl AssetSystem for SnipeItClient {
    /// Snipe-IT stores names in a case-insensitive MySQL collation.
    fn name_matching(&self) -> NameMatching {
        NameMatching::CaseInsensitive
    }

    async fn list_taxonomy(&self, kind: TaxonomyKind) -> SyncResult<Vec<TaxonomyEntry>> {
        let rows: Vec<TaxonomyRow> = self.list_all(collection(kind), &[]).await?;
        Ok(rows.into_iter().map(TaxonomyEntry::from).collect())
    }

    async fn create_taxonomy(&self, entry: &NewTaxonomyEntry) -> SyncResult<RemoteId> {
        match entry.kind {
            TaxonomyKind::Category => {
                let body = NewCategory {
                    name: &entry.name,
                    category_type: "asset",
                };
                self.post(collection(entry.kind), &body).await
            }
            TaxonomyKind::Model => {
                let category_id = entry.category_id.ok_or_else(|| {
                    SyncError::InvalidDevice(format!("model '{}' has no category", entry.name))
                })?;
                let body = NewModel {
                    name: &entry.name,
                    category_id,
                };
                self.post(collection(entry.kind), &body).await
            }
        }
    }

    async fn search_assets(&self, query: &str) -> SyncResult<Vec<AssetRecord>> {
        // Free-text search can return many partial hits ahead of the exact one.
        let rows: Vec<HardwareRow> = self
            .list_all("/hardware", &[("search", query.to_string())])
            .await?;
        Ok(rows.into_iter().map(AssetRecord::from).collect())
    }

    async fn create_asset(&self, fields: &AssetFieldSet) -> SyncResult<AssetRecord> {
        let id = self.post("/hardware", fields).await?;
        Ok(Self::record_from(id, fields))
    }

    async fn update_asset(&self, id: RemoteId, fields: &AssetFieldSet) -> SyncResult<AssetRecord> {
        let updated = self.put(&format!("/hardware/{id}"), fields).await?;
        Ok(Self::record_from(updated, fields))
    }
}
