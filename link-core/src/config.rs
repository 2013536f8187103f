//! # Configuration
//!
//! A minimal configuration system based on a string key/value store,
//! mirroring `app.set()` / `app.get()`. Applications layer values from
//! defaults, the environment or anything else they like.
//!
//! ## Setting and reading values
//! ```rust
//! use link_core::LinkApp;
//! let app = LinkApp::in_memory();
//!
//! app.set("http.port", "8080");
//! app.set("upload.channel_capacity", "32");
//!
//! assert_eq!(app.get("http.port"), Some("8080".to_string()));
//! assert_eq!(app.config_snapshot().get_usize("upload.channel_capacity"), Some(32));
//! ```
//!
//! ## Environment overrides
//! [`LinkConfig::load_env`] maps prefixed variables onto dotted keys:
//!
//! ```bash
//! export LINKS__HTTP__PORT=8080   # -> http.port
//! ```

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct LinkConfig {
    values: HashMap<String, String>,
}

impl LinkConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    ///
    /// Example: config.set("http.port", "3000")
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Get a configuration value by key.
    ///
    /// Returns None if the key is not present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Load every `PREFIX...` variable from the process environment.
    ///
    /// `LINKS__UPLOAD__USER_AGENT` with prefix `LINKS__` becomes `upload.user_agent`.
    pub fn load_env(&mut self, prefix: &str) {
        self.load_vars(prefix, std::env::vars());
    }

    /// Same as [`LinkConfig::load_env`] over an explicit variable list.
    pub fn load_vars<I>(&mut self, prefix: &str, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                self.set(normalized, value);
            }
        }
    }

    pub fn snapshot(&self) -> LinkConfigSnapshot {
        LinkConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinkConfigSnapshot {
    map: HashMap<String, String>,
}

impl LinkConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse::<u64>().ok())
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse::<usize>().ok())
    }
}
