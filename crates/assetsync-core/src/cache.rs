//! In-memory taxonomy name to id cache, rebuilt every run.

use std::collections::HashMap;

use crate::types::{NameMatching, RemoteId, TaxonomyEntry, TaxonomyKind};

/// Name → id maps for categories and models.
///
/// Keys are normalised with the asset system's [`NameMatching`] rule so two
/// names the remote considers equal share one entry. Entries are only ever
/// added; nothing is evicted during a run.
#[derive(Debug, Default)]
pub struct TaxonomyCache {
    matching: NameMatching,
    categories: HashMap<String, RemoteId>,
    models: HashMap<String, RemoteId>,
    loaded: bool,
}

impl TaxonomyCache {
    #[must_use]
    pub fn new(matching: NameMatching) -> Self {
        Self {
            matching,
            ..Self::default()
        }
    }

    /// Whether the bulk load has completed.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replace one taxonomy with a full listing.
    ///
    /// Later duplicates of a key keep the first id seen.
    pub fn load(&mut self, kind: TaxonomyKind, entries: Vec<TaxonomyEntry>) {
        let matching = self.matching;
        let map = self.map_mut(kind);
        map.clear();
        for entry in entries {
            map.entry(matching.key(&entry.name)).or_insert(entry.id);
        }
    }

    /// Mark both taxonomies as loaded.
    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    #[must_use]
    pub fn get(&self, kind: TaxonomyKind, name: &str) -> Option<RemoteId> {
        self.map(kind).get(&self.matching.key(name)).copied()
    }

    /// Record a freshly created entry. Returns `false` if the name was
    /// already present, leaving the existing id in place.
    pub fn insert(&mut self, kind: TaxonomyKind, name: &str, id: RemoteId) -> bool {
        let key = self.matching.key(name);
        let map = self.map_mut(kind);
        if map.contains_key(&key) {
            return false;
        }
        map.insert(key, id);
        true
    }

    #[must_use]
    pub fn len(&self, kind: TaxonomyKind) -> usize {
        self.map(kind).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.models.is_empty()
    }

    fn map(&self, kind: TaxonomyKind) -> &HashMap<String, RemoteId> {
        match kind {
            TaxonomyKind::Category => &self.categories,
            TaxonomyKind::Model => &self.models,
        }
    }

    fn map_mut(&mut self, kind: TaxonomyKind) -> &mut HashMap<String, RemoteId> {
        match kind {
            TaxonomyKind::Category => &mut self.categories,
            TaxonomyKind::Model => &mut self.models,
        }
    }
}
