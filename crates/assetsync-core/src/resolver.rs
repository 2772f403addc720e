//! Taxonomy name resolution with create-on-miss.

use tracing::{debug, info, instrument};

use crate::cache::TaxonomyCache;
use crate::error::{SyncError, SyncResult};
use crate::gateway::AssetGateway;
use crate::traits::AssetSystem;
use crate::types::{NewTaxonomyEntry, RemoteId, TaxonomyKind};

/// Resolves category and model names to asset-system ids for one run.
///
/// The first resolution bulk-loads both taxonomies. A name missing from the
/// cache is created remotely and cached only after the create succeeded, so
/// each distinct name is created at most once per run.
#[derive(Debug, Default)]
pub struct EntityResolver {
    cache: TaxonomyCache,
}

impl EntityResolver {
    #[must_use]
    pub fn new(cache: TaxonomyCache) -> Self {
        Self { cache }
    }

    #[must_use]
    pub fn cache(&self) -> &TaxonomyCache {
        &self.cache
    }

    /// Load every category and model once. Later calls are no-ops.
    pub async fn ensure_loaded<A>(&mut self, gateway: &AssetGateway<'_, A>) -> SyncResult<()>
    where
        A: AssetSystem + ?Sized,
    {
        if self.cache.is_loaded() {
            return Ok(());
        }

        for kind in [TaxonomyKind::Category, TaxonomyKind::Model] {
            let entries = gateway.list_taxonomy(kind).await?;
            debug!(kind = %kind, count = entries.len(), "Loaded taxonomy into cache");
            self.cache.load(kind, entries);
        }
        self.cache.mark_loaded();

        info!(
            categories = self.cache.len(TaxonomyKind::Category),
            models = self.cache.len(TaxonomyKind::Model),
            "Taxonomy cache initialized"
        );
        Ok(())
    }

    /// Resolve a category name, creating it when absent.
    pub async fn resolve_category<A>(
        &mut self,
        gateway: &AssetGateway<'_, A>,
        name: &str,
    ) -> SyncResult<RemoteId>
    where
        A: AssetSystem + ?Sized,
    {
        self.resolve(gateway, TaxonomyKind::Category, name, None)
            .await
    }

    /// Resolve a model name, creating it under `category_id` when absent.
    pub async fn resolve_model<A>(
        &mut self,
        gateway: &AssetGateway<'_, A>,
        name: &str,
        category_id: RemoteId,
    ) -> SyncResult<RemoteId>
    where
        A: AssetSystem + ?Sized,
    {
        self.resolve(gateway, TaxonomyKind::Model, name, Some(category_id))
            .await
    }

    #[instrument(skip(self, gateway))]
    pub async fn resolve<A>(
        &mut self,
        gateway: &AssetGateway<'_, A>,
        kind: TaxonomyKind,
        name: &str,
        category_id: Option<RemoteId>,
    ) -> SyncResult<RemoteId>
    where
        A: AssetSystem + ?Sized,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(SyncError::InvalidDevice(format!("empty {kind} name")));
        }

        self.ensure_loaded(gateway).await?;

        if let Some(id) = self.cache.get(kind, name) {
            debug!(id = %id, "Found {kind} '{name}' in cache");
            return Ok(id);
        }

        info!("Creating new {kind} '{name}'");
        let request = NewTaxonomyEntry {
            kind,
            name: name.to_string(),
            category_id,
        };
        let id = gateway
            .create_taxonomy(&request)
            .await
            .map_err(|source| SyncError::CreationFailed {
                taxonomy: kind,
                name: name.to_string(),
                source: Box::new(source),
            })?;

        self.cache.insert(kind, name, id);
        info!(id = %id, "Created {kind} '{name}'");
        Ok(id)
    }
}
