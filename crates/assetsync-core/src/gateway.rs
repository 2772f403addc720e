//! Retry-wrapped, counted access to the asset system for one run.

use tracing::{debug, instrument};

use crate::error::SyncResult;
use crate::retry::RetryPolicy;
use crate::stats::{ApiCallTally, CallKind};
use crate::traits::AssetSystem;
use crate::types::{
    AssetFieldSet, AssetRecord, NameMatching, NewTaxonomyEntry, RemoteId, TaxonomyEntry,
    TaxonomyKind,
};

/// The only path from the resolver, matcher and writer to the asset system.
///
/// Every call goes through the [`RetryPolicy`] and is tallied once as a
/// logical operation, however many attempts the policy needed.
pub struct AssetGateway<'a, A: ?Sized> {
    system: &'a A,
    retry: &'a RetryPolicy,
    tally: ApiCallTally,
}

impl<'a, A: AssetSystem + ?Sized> AssetGateway<'a, A> {
    #[must_use]
    pub fn new(system: &'a A, retry: &'a RetryPolicy) -> Self {
        Self {
            system,
            retry,
            tally: ApiCallTally::default(),
        }
    }

    /// Calls issued through this gateway so far.
    #[must_use]
    pub fn tally(&self) -> &ApiCallTally {
        &self.tally
    }

    #[must_use]
    pub fn name_matching(&self) -> NameMatching {
        self.system.name_matching()
    }

    #[instrument(skip(self))]
    pub async fn list_taxonomy(&self, kind: TaxonomyKind) -> SyncResult<Vec<TaxonomyEntry>> {
        self.tally.record(CallKind::Listing);
        let operation = format!("list_{kind}");
        self.retry
            .execute(&operation, || self.system.list_taxonomy(kind))
            .await
    }

    #[instrument(skip(self, entry), fields(kind = %entry.kind, name = %entry.name))]
    pub async fn create_taxonomy(&self, entry: &NewTaxonomyEntry) -> SyncResult<RemoteId> {
        self.tally.record(CallKind::Create);
        let operation = format!("create_{}", entry.kind);
        self.retry
            .execute(&operation, || self.system.create_taxonomy(entry))
            .await
    }

    #[instrument(skip(self))]
    pub async fn search_assets(&self, query: &str) -> SyncResult<Vec<AssetRecord>> {
        self.tally.record(CallKind::Search);
        let rows = self
            .retry
            .execute("search_assets", || self.system.search_assets(query))
            .await?;
        debug!(rows = rows.len(), "Asset search returned");
        Ok(rows)
    }

    #[instrument(skip(self, fields), fields(asset_tag = %fields.asset_tag))]
    pub async fn create_asset(&self, fields: &AssetFieldSet) -> SyncResult<AssetRecord> {
        self.tally.record(CallKind::Create);
        self.retry
            .execute("create_asset", || self.system.create_asset(fields))
            .await
    }

    #[instrument(skip(self, fields), fields(asset_tag = %fields.asset_tag))]
    pub async fn update_asset(
        &self,
        id: RemoteId,
        fields: &AssetFieldSet,
    ) -> SyncResult<AssetRecord> {
        self.tally.record(CallKind::Update);
        self.retry
            .execute("update_asset", || self.system.update_asset(id, fields))
            .await
    }
}
