//! In-memory collaborators for engine integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use assetsync_core::{
    AssetFieldSet, AssetRecord, AssetSystem, DeviceSource, NameMatching, NewTaxonomyEntry,
    RemoteId, RetryPolicy, SourceDevice, SyncError, SyncResult, SyncSettings, TaxonomyEntry,
    TaxonomyKind,
};
use async_trait::async_trait;

/// Settings without pacing so tests only wait on rate-limit backoff.
pub fn fast_settings() -> SyncSettings {
    SyncSettings {
        device_delay: Duration::ZERO,
        retry: RetryPolicy::default(),
    }
}

pub fn device(serial: &str, name: &str, model: &str, product_type: &str) -> SourceDevice {
    SourceDevice {
        name: Some(name.to_string()),
        serial: serial.to_string(),
        model_name: Some(model.to_string()),
        category_hint: Some(product_type.to_string()),
        mac_address: Some("00:18:0a:aa:bb:cc".to_string()),
        network_id: Some("N_1234".to_string()),
        purchase_date: None,
        purchase_cost: None,
    }
}

/// The branch firewall used across scenarios.
pub fn branch_appliance() -> SourceDevice {
    device("S1", "Branch MX", "MX68", "Appliance")
}

// =============================================================================
// Device source
// =============================================================================

#[derive(Default)]
pub struct FakeDeviceSource {
    devices: Vec<SourceDevice>,
    failure: Option<String>,
    calls: Mutex<u32>,
}

impl FakeDeviceSource {
    pub fn new(devices: Vec<SourceDevice>) -> Self {
        Self {
            devices,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl DeviceSource for FakeDeviceSource {
    async fn list_devices(&self) -> SyncResult<Vec<SourceDevice>> {
        *self.calls.lock().unwrap() += 1;
        match &self.failure {
            Some(message) => Err(SyncError::RemoteOperationFailed {
                status: 503,
                body: message.clone(),
            }),
            None => Ok(self.devices.clone()),
        }
    }
}

// =============================================================================
// Asset system
// =============================================================================

#[derive(Default)]
struct State {
    next_id: u64,
    categories: Vec<TaxonomyEntry>,
    models: Vec<TaxonomyEntry>,
    assets: Vec<AssetRecord>,

    /// Remaining rate-limit responses per operation.
    rate_limits: HashMap<&'static str, u32>,
    /// Attempts per operation, retries included.
    attempts: HashMap<&'static str, u32>,
    taxonomy_creates: Vec<NewTaxonomyEntry>,
    asset_creates: Vec<AssetFieldSet>,
    asset_updates: Vec<(RemoteId, AssetFieldSet)>,

    rejected_names: HashSet<String>,
    listing_failure: bool,
}

impl State {
    fn allocate(&mut self) -> RemoteId {
        self.next_id += 1;
        RemoteId(self.next_id)
    }

    fn attempt(&mut self, operation: &'static str) -> SyncResult<()> {
        *self.attempts.entry(operation).or_default() += 1;
        match self.rate_limits.get_mut(operation) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(SyncError::RateLimited {
                    retry_after_secs: Some(1),
                })
            }
            _ => Ok(()),
        }
    }
}

/// An asset register kept in memory, with Snipe-IT-like search semantics.
pub struct FakeAssetSystem {
    matching: NameMatching,
    state: Mutex<State>,
}

impl Default for FakeAssetSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeAssetSystem {
    pub fn new() -> Self {
        Self {
            matching: NameMatching::Exact,
            state: Mutex::new(State {
                next_id: 100,
                ..Default::default()
            }),
        }
    }

    pub fn with_matching(mut self, matching: NameMatching) -> Self {
        self.matching = matching;
        self
    }

    pub fn with_category(self, name: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = state.allocate();
            state.categories.push(TaxonomyEntry {
                name: name.to_string(),
                id,
                category_id: None,
            });
        }
        self
    }

    pub fn with_model(self, name: &str, category_id: RemoteId) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = state.allocate();
            state.models.push(TaxonomyEntry {
                name: name.to_string(),
                id,
                category_id: Some(category_id),
            });
        }
        self
    }

    pub fn with_asset(self, record: AssetRecord) -> Self {
        self.state.lock().unwrap().assets.push(record);
        self
    }

    /// Answer the next `times` calls of `operation` with a rate-limit error.
    pub fn rate_limit(&self, operation: &'static str, times: u32) {
        self.state
            .lock()
            .unwrap()
            .rate_limits
            .insert(operation, times);
    }

    /// Refuse to create a taxonomy entry with this name.
    pub fn reject_name(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .rejected_names
            .insert(name.to_string());
    }

    pub fn fail_listings(&self) {
        self.state.lock().unwrap().listing_failure = true;
    }

    pub fn attempts(&self, operation: &str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .attempts
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn category_id(&self, name: &str) -> Option<RemoteId> {
        self.state
            .lock()
            .unwrap()
            .categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.id)
    }

    pub fn model(&self, name: &str) -> Option<TaxonomyEntry> {
        self.state
            .lock()
            .unwrap()
            .models
            .iter()
            .find(|m| m.name == name)
            .cloned()
    }

    pub fn assets(&self) -> Vec<AssetRecord> {
        self.state.lock().unwrap().assets.clone()
    }

    pub fn taxonomy_creates(&self, kind: TaxonomyKind) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .taxonomy_creates
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.name.clone())
            .collect()
    }

    pub fn asset_creates(&self) -> Vec<AssetFieldSet> {
        self.state.lock().unwrap().asset_creates.clone()
    }

    pub fn asset_updates(&self) -> Vec<(RemoteId, AssetFieldSet)> {
        self.state.lock().unwrap().asset_updates.clone()
    }
}

fn apply(record: &mut AssetRecord, fields: &AssetFieldSet) {
    record.asset_tag = Some(fields.asset_tag.clone());
    record.serial = Some(fields.serial.clone());
    if fields.name.is_some() {
        record.name = fields.name.clone();
    }
    record.model_id = Some(fields.model_id);
    record.status_id = Some(fields.status_id);
    record.notes = Some(fields.notes.clone());
    if fields.purchase_date.is_some() {
        record.purchase_date = fields.purchase_date;
    }
    if fields.purchase_cost.is_some() {
        record.purchase_cost = fields.purchase_cost;
    }
}

#[async_trait]
impl AssetSystem for FakeAssetSystem {
    fn name_matching(&self) -> NameMatching {
        self.matching
    }

    async fn list_taxonomy(&self, kind: TaxonomyKind) -> SyncResult<Vec<TaxonomyEntry>> {
        let mut state = self.state.lock().unwrap();
        state.attempt("list_taxonomy")?;
        if state.listing_failure {
            return Err(SyncError::RemoteOperationFailed {
                status: 500,
                body: "listing unavailable".into(),
            });
        }
        Ok(match kind {
            TaxonomyKind::Category => state.categories.clone(),
            TaxonomyKind::Model => state.models.clone(),
        })
    }

    async fn create_taxonomy(&self, entry: &NewTaxonomyEntry) -> SyncResult<RemoteId> {
        let mut state = self.state.lock().unwrap();
        state.attempt("create_taxonomy")?;
        state.taxonomy_creates.push(entry.clone());
        if state.rejected_names.contains(&entry.name) {
            return Err(SyncError::RemoteOperationFailed {
                status: 422,
                body: format!("The name {} is invalid", entry.name),
            });
        }

        let id = state.allocate();
        let created = TaxonomyEntry {
            name: entry.name.clone(),
            id,
            category_id: entry.category_id,
        };
        match entry.kind {
            TaxonomyKind::Category => state.categories.push(created),
            TaxonomyKind::Model => state.models.push(created),
        }
        Ok(id)
    }

    async fn search_assets(&self, query: &str) -> SyncResult<Vec<AssetRecord>> {
        let mut state = self.state.lock().unwrap();
        state.attempt("search_assets")?;
        let contains = |value: &Option<String>| {
            value.as_deref().is_some_and(|v| v.contains(query))
        };
        Ok(state
            .assets
            .iter()
            .filter(|a| contains(&a.serial) || contains(&a.asset_tag) || contains(&a.name))
            .cloned()
            .collect())
    }

    async fn create_asset(&self, fields: &AssetFieldSet) -> SyncResult<AssetRecord> {
        let mut state = self.state.lock().unwrap();
        state.attempt("create_asset")?;
        state.asset_creates.push(fields.clone());

        let mut record = AssetRecord {
            id: state.allocate(),
            ..Default::default()
        };
        apply(&mut record, fields);
        state.assets.push(record.clone());
        Ok(record)
    }

    async fn update_asset(&self, id: RemoteId, fields: &AssetFieldSet) -> SyncResult<AssetRecord> {
        let mut state = self.state.lock().unwrap();
        state.attempt("update_asset")?;
        state.asset_updates.push((id, fields.clone()));

        let record = state
            .assets
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| SyncError::RemoteOperationFailed {
                status: 404,
                body: format!("Asset {id} not found"),
            })?;
        apply(record, fields);
        Ok(record.clone())
    }
}
