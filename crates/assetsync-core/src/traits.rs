//! Collaborator traits consumed by the sync engine.
//!
//! The engine never talks HTTP itself. A [`DeviceSource`] supplies the devices
//! to reconcile and an [`AssetSystem`] holds taxonomy and asset records.
//! Implementations signal throttling with [`SyncError::RateLimited`] and let
//! the engine decide whether to retry.
//!
//! [`SyncError::RateLimited`]: crate::SyncError::RateLimited

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::types::{
    AssetFieldSet, AssetRecord, NameMatching, NewTaxonomyEntry, RemoteId, SourceDevice,
    TaxonomyEntry, TaxonomyKind,
};

/// The system of truth for physical devices.
#[async_trait]
pub trait DeviceSource: Send + Sync {
    /// Return the complete, ordered set of devices. May be empty.
    async fn list_devices(&self) -> SyncResult<Vec<SourceDevice>>;
}

/// The system of record for organizational assets.
#[async_trait]
pub trait AssetSystem: Send + Sync {
    /// Uniqueness rule the system applies to taxonomy names.
    fn name_matching(&self) -> NameMatching {
        NameMatching::Exact
    }

    /// List every existing entry of one taxonomy.
    async fn list_taxonomy(&self, kind: TaxonomyKind) -> SyncResult<Vec<TaxonomyEntry>>;

    /// Create a taxonomy entry and return its id.
    async fn create_taxonomy(&self, entry: &NewTaxonomyEntry) -> SyncResult<RemoteId>;

    /// Free-text asset search. Callers filter the rows for exact key matches.
    async fn search_assets(&self, query: &str) -> SyncResult<Vec<AssetRecord>>;

    /// Create an asset.
    async fn create_asset(&self, fields: &AssetFieldSet) -> SyncResult<AssetRecord>;

    /// Update the asset with the given id.
    async fn update_asset(&self, id: RemoteId, fields: &AssetFieldSet)
        -> SyncResult<AssetRecord>;
}
