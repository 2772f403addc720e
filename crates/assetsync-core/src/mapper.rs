//! Device to asset field mapping.

use crate::types::{AssetFieldSet, RemoteId, SourceDevice, READY_TO_DEPLOY_STATUS_ID};

/// Pure transformation from a source device to an asset payload.
pub struct AssetFieldMapper;

impl AssetFieldMapper {
    /// Build the asset field set for `device` with its resolved taxonomy ids.
    ///
    /// The serial doubles as the asset tag. Purchase fields are carried only
    /// when the device has them, so an update never clears existing values.
    #[must_use]
    pub fn map(device: &SourceDevice, category_id: RemoteId, model_id: RemoteId) -> AssetFieldSet {
        AssetFieldSet {
            asset_tag: device.serial.clone(),
            serial: device.serial.clone(),
            name: device.name.clone(),
            model_id,
            status_id: READY_TO_DEPLOY_STATUS_ID,
            notes: Self::notes(device),
            purchase_date: device.purchase_date,
            purchase_cost: device.purchase_cost,
            category_id,
        }
    }

    fn notes(device: &SourceDevice) -> String {
        format!(
            "Imported from Meraki. MAC: {}, Network ID: {}",
            device.mac_address.as_deref().unwrap_or("None"),
            device.network_id.as_deref().unwrap_or("None")
        )
    }
}
