//! Domain types shared by the engine and the remote collaborators.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Status assigned to every synced asset ("Ready to Deploy").
pub const READY_TO_DEPLOY_STATUS_ID: RemoteId = RemoteId(2);

/// Identifier assigned by the asset system.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RemoteId(pub u64);

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RemoteId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A classification tier that must exist before an asset can reference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomyKind {
    Category,
    Model,
}

impl TaxonomyKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Model => "model",
        }
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the asset system compares taxonomy names for uniqueness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMatching {
    /// Byte-for-byte comparison.
    #[default]
    Exact,
    /// Surrounding whitespace ignored, compared lowercased.
    CaseInsensitive,
}

impl NameMatching {
    /// Cache key for `name` under this comparison rule.
    #[must_use]
    pub fn key(&self, name: &str) -> String {
        match self {
            Self::Exact => name.to_string(),
            Self::CaseInsensitive => name.trim().to_lowercase(),
        }
    }
}

/// An existing category or model in the asset system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub name: String,
    pub id: RemoteId,
    /// Parent category, models only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<RemoteId>,
}

/// Request to create a category or model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaxonomyEntry {
    pub kind: TaxonomyKind,
    pub name: String,
    pub category_id: Option<RemoteId>,
}

/// A device as reported by the network-management system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDevice {
    pub name: Option<String>,
    pub serial: String,
    pub model_name: Option<String>,
    /// Product type (e.g. "appliance", "switch"), used as the asset category.
    pub category_hint: Option<String>,
    pub mac_address: Option<String>,
    pub network_id: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_cost: Option<f64>,
}

impl SourceDevice {
    /// Human-readable identity for logs.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown")
    }
}

/// A transient copy of an asset held by the asset system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: RemoteId,
    pub name: Option<String>,
    pub asset_tag: Option<String>,
    pub serial: Option<String>,
    pub model_id: Option<RemoteId>,
    pub status_id: Option<RemoteId>,
    pub notes: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_cost: Option<f64>,
}

/// Fully resolved payload for an asset create or update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetFieldSet {
    pub asset_tag: String,
    pub serial: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub model_id: RemoteId,
    pub status_id: RemoteId,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_cost: Option<f64>,
    /// Resolved category. Not sent: the asset system derives it from the model.
    #[serde(skip)]
    pub category_id: RemoteId,
}

/// Natural-key field an asset was looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Serial,
    AssetTag,
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => f.write_str("serial"),
            Self::AssetTag => f.write_str("asset_tag"),
        }
    }
}

/// Whether an upsert created or updated the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteKind {
    Created,
    Updated,
}

/// Result of a successful asset upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub kind: WriteKind,
    pub id: RemoteId,
}
