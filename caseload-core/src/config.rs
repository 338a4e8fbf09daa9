//! # Caseload Configuration
//!
//! Caseload includes a minimal, framework-agnostic configuration system
//! based on a simple string key/value store. Applications layer their own
//! loading (env, files, secrets) on top and hand the result to the data
//! gateway.
//!
//! ## Setting and reading values
//! ```rust
//! use caseload_core::Config;
//! let mut config = Config::new();
//!
//! config.set("paginate.default", "25");
//! config.set("paginate.max", "100");
//!
//! assert_eq!(config.get("paginate.default"), Some("25"));
//! ```
//!
//! ## Keys the data layer reads
//! - `scope.tenant_field`: default tenant attribute for collections that
//!   don't override it (falls back to `"tenantId"`)
//! - `paginate.default`: page size applied to scoped finds without a limit
//! - `paginate.max`: hard cap on caller-supplied limits for scoped finds
//!
//! Higher-level loaders (TOML, JSON, Consul, Vault, etc.) are intentionally
//! kept *out* of this crate so each application remains free to choose its
//! configuration strategy.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Config {
    values: HashMap<String, String>,
}

impl Config {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
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

    /// Check whether a key is present.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::new(self.values.clone())
    }
}

/// An immutable copy of the configuration, cheap to hand to request-scoped
/// values.
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    map: HashMap<String, String>,
}

impl ConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse::<usize>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.parse::<bool>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_detached_from_later_writes() {
        let mut config = Config::new();
        config.set("paginate.default", "25");

        let snapshot = config.snapshot();
        config.set("paginate.default", "50");

        assert_eq!(snapshot.get_usize("paginate.default"), Some(25));
        assert_eq!(config.get("paginate.default"), Some("50"));
    }

    #[test]
    fn typed_getters_ignore_unparsable_values() {
        let mut config = Config::new();
        config.set("paginate.max", "not-a-number");
        let snapshot = config.snapshot();

        assert_eq!(snapshot.get_usize("paginate.max"), None);
        assert!(snapshot.get("paginate.max").is_some());
    }
}
