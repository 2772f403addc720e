//! Asset create-or-update.

use tracing::info;

use crate::error::SyncResult;
use crate::gateway::AssetGateway;
use crate::traits::AssetSystem;
use crate::types::{AssetFieldSet, AssetRecord, WriteKind, WriteOutcome};

/// Writes a resolved field set to the asset system.
pub struct AssetWriter;

impl AssetWriter {
    /// Create the asset when `existing` is `None`, otherwise update it in place.
    pub async fn upsert<A>(
        gateway: &AssetGateway<'_, A>,
        existing: Option<&AssetRecord>,
        fields: &AssetFieldSet,
    ) -> SyncResult<WriteOutcome>
    where
        A: AssetSystem + ?Sized,
    {
        match existing {
            Some(record) => {
                info!(id = %record.id, asset_tag = %fields.asset_tag, "Updating existing asset");
                gateway.update_asset(record.id, fields).await?;
                Ok(WriteOutcome {
                    kind: WriteKind::Updated,
                    id: record.id,
                })
            }
            None => {
                info!(asset_tag = %fields.asset_tag, "Creating new asset");
                let created = gateway.create_asset(fields).await?;
                Ok(WriteOutcome {
                    kind: WriteKind::Created,
                    id: created.id,
                })
            }
        }
    }
}
