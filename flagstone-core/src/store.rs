//! Live configuration set
//!
//! Readers take a snapshot (an `Arc` clone) and evaluate without holding the
//! lock; writers build a new map and swap it in.

use crate::model::Config;
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Immutable key → config map shared by evaluations
pub type ConfigMap = HashMap<String, Arc<Config>>;

/// Full configuration set as delivered by a backend
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub configs: Vec<Config>,
}

impl Snapshot {
    /// Parse a `{"configs": [...]}` document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Copy-on-write store of the active configurations
#[derive(Debug, Default)]
pub struct ConfigStore {
    current: RwLock<Arc<ConfigMap>>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `configs`
    pub fn from_configs(configs: impl IntoIterator<Item = Config>) -> Self {
        let store = Self::new();
        store.replace(configs);
        store
    }

    /// Current configuration set.
    ///
    /// Cheap: clones an `Arc`. The snapshot is unaffected by later updates.
    pub fn snapshot(&self) -> Arc<ConfigMap> {
        Arc::clone(&self.current.read())
    }

    pub fn get(&self, key: &str) -> Option<Arc<Config>> {
        self.current.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }

    /// Sorted keys of all active configs
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.current.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Highest config id seen in the active set
    pub fn highest_id(&self) -> Option<i64> {
        self.current.read().values().map(|config| config.id).max()
    }

    /// Swap in a whole new set. Deleted configs are dropped.
    pub fn replace(&self, configs: impl IntoIterator<Item = Config>) {
        let map: ConfigMap = configs
            .into_iter()
            .filter(|config| !config.is_deleted())
            .map(|config| (config.key.clone(), Arc::new(config)))
            .collect();

        debug!(configs = map.len(), "Replaced configuration set");
        *self.current.write() = Arc::new(map);
    }

    /// Merge incremental updates keyed by config key.
    ///
    /// A deleted config removes its key. An update whose id is lower than the
    /// stored config's is stale and ignored. Returns the number of keys changed.
    pub fn apply(&self, configs: impl IntoIterator<Item = Config>) -> usize {
        let mut guard = self.current.write();
        let mut map: ConfigMap = (**guard).clone();
        let mut changed = 0;

        for config in configs {
            if let Some(existing) = map.get(&config.key) {
                if config.id < existing.id {
                    debug!(
                        key = %config.key,
                        id = config.id,
                        current_id = existing.id,
                        "Ignoring stale config update"
                    );
                    continue;
                }
            }

            if config.is_deleted() {
                if map.remove(&config.key).is_some() {
                    debug!(key = %config.key, "Removed deleted config");
                    changed += 1;
                }
            } else {
                debug!(key = %config.key, id = config.id, "Applied config update");
                map.insert(config.key.clone(), Arc::new(config));
                changed += 1;
            }
        }

        *guard = Arc::new(map);
        changed
    }

    /// Load a snapshot, replacing everything
    pub fn load_snapshot(&self, snapshot: Snapshot) {
        self.replace(snapshot.configs);
    }
}
