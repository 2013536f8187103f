use std::sync::{Arc, RwLock};

use crate::{LinkConfig, LinkConfigSnapshot, LinkStore, MemoryLinkStore};

struct LinkAppInner {
    config: RwLock<LinkConfig>,
    store: Arc<dyn LinkStore>,
}

/// LinkApp is the central application container.
///
/// Framework-agnostic. Holds:
/// - config
/// - the link store
///
/// Cloning is cheap; clones share the same state.
pub struct LinkApp {
    inner: Arc<LinkAppInner>,
}

impl Clone for LinkApp {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl LinkApp {
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self {
            inner: Arc::new(LinkAppInner {
                config: RwLock::new(LinkConfig::new()),
                store,
            }),
        }
    }

    /// App backed by a fresh [`MemoryLinkStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryLinkStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn LinkStore> {
        &self.inner.store
    }

    /// `app.set(key, value)`
    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .set(key, value);
    }

    /// `app.get(key)`
    pub fn get(&self, key: &str) -> Option<String> {
        let cfg = self
            .inner
            .config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cfg.get(key).map(|v| v.to_string())
    }

    /// Merge prefixed environment variables into the config.
    pub fn load_env(&self, prefix: &str) {
        self.inner
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .load_env(prefix);
    }

    pub fn config_snapshot(&self) -> LinkConfigSnapshot {
        let cfg = self
            .inner
            .config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cfg.snapshot()
    }
}

impl Default for LinkApp {
    fn default() -> Self {
        Self::in_memory()
    }
}
