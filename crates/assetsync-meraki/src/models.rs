//! Meraki Dashboard API payloads.

use assetsync_core::SourceDevice;
use chrono::NaiveDate;
use serde::Deserialize;

/// One entry of `GET /organizations/{organizationId}/devices`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerakiDevice {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, alias = "purchase_date")]
    pub purchase_date: Option<String>,
    #[serde(default, alias = "purchase_cost")]
    pub purchase_cost: Option<f64>,
}

impl MerakiDevice {
    /// Convert into the engine's device type. Devices without a serial have
    /// no natural key and yield `None`.
    #[must_use]
    pub fn into_source_device(self) -> Option<SourceDevice> {
        let serial = self.serial.filter(|s| !s.trim().is_empty())?;
        Some(SourceDevice {
            name: self.name.filter(|n| !n.is_empty()),
            serial,
            model_name: self.model,
            category_hint: self.product_type,
            mac_address: self.mac,
            network_id: self.network_id,
            purchase_date: self
                .purchase_date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
            purchase_cost: self.purchase_cost,
        })
    }
}

/// Extract the `rel=next` target from an RFC 5988 `Link` header.
#[must_use]
pub fn next_page_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|param| {
            let param = param.trim();
            param == "rel=next" || param == "rel=\"next\""
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}
