//! In-process dictionary map, used when no external cache is configured.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;

use crate::store::Dictionary;

/// Process-wide map of `{domain}_{locale}` -> dictionary.
///
/// The map is created on first use. Entries never expire; they are only
/// replaced by a later `set`. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    store: Arc<OnceCell<DashMap<String, Dictionary>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> &DashMap<String, Dictionary> {
        self.store.get_or_init(DashMap::new)
    }

    pub fn get(&self, key: &str) -> Option<Dictionary> {
        self.store
            .get()
            .and_then(|map| map.get(key).map(|entry| Arc::clone(entry.value())))
    }

    pub fn set(&self, key: &str, value: Dictionary) {
        self.map().insert(key.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.store.get().map_or(0, |map| map.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
