//! Snipe-IT REST API payloads.

use assetsync_core::{AssetRecord, RemoteId, TaxonomyEntry};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Paged listing envelope used by every collection endpoint.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub total: u64,
    #[serde(default = "Vec::new")]
    pub rows: Vec<T>,
}

/// Nested `{id, name}` reference.
#[derive(Debug, Clone, Deserialize)]
pub struct IdRef {
    pub id: u64,
}

/// Row of `/categories` or `/models`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxonomyRow {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub category: Option<IdRef>,
}

impl From<TaxonomyRow> for TaxonomyEntry {
    fn from(row: TaxonomyRow) -> Self {
        Self {
            name: row.name,
            id: RemoteId(row.id),
            category_id: row.category.map(|c| RemoteId(c.id)),
        }
    }
}

/// Row of `/hardware`.
#[derive(Debug, Clone, Deserialize)]
pub struct HardwareRow {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub asset_tag: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub model: Option<IdRef>,
    #[serde(default)]
    pub status_label: Option<IdRef>,
    #[serde(default)]
    pub notes: Option<String>,
    /// `{"date": "2023-04-01", "formatted": "..."}` or null.
    #[serde(default)]
    pub purchase_date: Option<Value>,
    /// Formatted decimal string, sometimes a number.
    #[serde(default)]
    pub purchase_cost: Option<Value>,
}

impl From<HardwareRow> for AssetRecord {
    fn from(row: HardwareRow) -> Self {
        Self {
            id: RemoteId(row.id),
            name: row.name,
            asset_tag: row.asset_tag,
            serial: row.serial,
            model_id: row.model.map(|m| RemoteId(m.id)),
            status_id: row.status_label.map(|s| RemoteId(s.id)),
            notes: row.notes,
            purchase_date: row.purchase_date.as_ref().and_then(parse_date),
            purchase_cost: row.purchase_cost.as_ref().and_then(parse_cost),
        }
    }
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let raw = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("date")?.as_str()?,
        _ => return None,
    };
    NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d").ok()
}

fn parse_cost(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.replace(',', "").trim().parse().ok(),
        _ => None,
    }
}

/// Response of a create or update. HTTP 200 does not imply success.
#[derive(Debug, Deserialize)]
pub struct WriteResponse {
    pub status: String,
    #[serde(default)]
    pub messages: Value,
    #[serde(default)]
    pub payload: Option<WritePayload>,
}

#[derive(Debug, Deserialize)]
pub struct WritePayload {
    pub id: u64,
}

impl WriteResponse {
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status.eq_ignore_ascii_case("error")
    }

    /// Human-readable rendering of `messages`.
    #[must_use]
    pub fn messages_text(&self) -> String {
        match &self.messages {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewCategory<'a> {
    pub name: &'a str,
    pub category_type: &'static str,
}

#[derive(Debug, Serialize)]
pub struct NewModel<'a> {
    pub name: &'a str,
    pub category_id: RemoteId,
}
