//! Lookup of an existing asset by natural key.

use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::gateway::AssetGateway;
use crate::traits::AssetSystem;
use crate::types::{AssetRecord, MatchField};

/// Finds the asset a device already corresponds to, if any. Never creates.
pub struct AssetMatcher;

impl AssetMatcher {
    /// Look up by serial, then by asset tag.
    ///
    /// Search rows are filtered for exact key equality. More than one exact
    /// match for a key is an [`SyncError::AmbiguousMatch`]; the matcher never
    /// picks one of several candidates.
    pub async fn find<A>(
        gateway: &AssetGateway<'_, A>,
        serial: &str,
        asset_tag: &str,
    ) -> SyncResult<Option<AssetRecord>>
    where
        A: AssetSystem + ?Sized,
    {
        let serial_rows = gateway.search_assets(serial).await?;
        if let Some(record) = Self::select(serial_rows.iter(), MatchField::Serial, serial)? {
            debug!(id = %record.id, "Found existing asset by serial");
            return Ok(Some(record));
        }

        // Free-text search for the same value returns the same rows.
        let tag_rows = if asset_tag == serial {
            serial_rows
        } else {
            gateway.search_assets(asset_tag).await?
        };
        let found = Self::select(tag_rows.iter(), MatchField::AssetTag, asset_tag)?;
        if let Some(ref record) = found {
            debug!(id = %record.id, "Found existing asset by asset tag");
        }
        Ok(found)
    }

    fn select<'r>(
        rows: impl Iterator<Item = &'r AssetRecord>,
        field: MatchField,
        value: &str,
    ) -> SyncResult<Option<AssetRecord>> {
        let mut matches: Vec<&AssetRecord> = rows
            .filter(|record| {
                let key = match field {
                    MatchField::Serial => record.serial.as_deref(),
                    MatchField::AssetTag => record.asset_tag.as_deref(),
                };
                key == Some(value)
            })
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop().cloned()),
            count => Err(SyncError::AmbiguousMatch {
                field,
                value: value.to_string(),
                count,
            }),
        }
    }
}
