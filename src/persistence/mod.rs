//! Key-value persistence seam
//!
//! The economy layer saves coins and owned items as JSON strings under fixed
//! keys, the way a browser's LocalStorage would hold them. Loading never
//! fails: missing or malformed values fall back to defaults with a warning.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Why a write was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store is full
    QuotaExceeded,
    /// Storage is disabled or missing
    Unavailable,
    /// The value could not be encoded
    Encode(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::QuotaExceeded => write!(f, "storage quota exceeded"),
            StoreError::Unavailable => write!(f, "storage unavailable"),
            StoreError::Encode(msg) => write!(f, "could not encode value: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// String store keyed by name
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str);
}

/// In-memory store with an optional byte quota
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse writes that would push keys plus values past `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota: Some(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn used_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota
            && self.used_without(key) + key.len() + value.len() > quota
        {
            return Err(StoreError::QuotaExceeded);
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Decode a JSON value; `None` when missing or malformed
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("ignoring malformed '{}': {}", key, err);
            None
        }
    }
}

/// Decode a JSON value, falling back to `T::default()`
pub fn load_json_or_default<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    load_json(store, key).unwrap_or_default()
}

/// Encode and store a JSON value
pub fn save_json<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string(value).map_err(|e| StoreError::Encode(e.to_string()))?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_memory_store() {
        let mut store = MemoryStore::new();
        save_json(&mut store, "coins", &125u64).unwrap();
        assert_eq!(store.get("coins").as_deref(), Some("125"));
        assert_eq!(load_json::<u64>(&store, "coins"), Some(125));
        store.remove("coins");
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_falls_back() {
        let mut store = MemoryStore::new();
        store.set("weaponsOwned", "not json").unwrap();
        let owned: Vec<String> = load_json_or_default(&store, "weaponsOwned");
        assert!(owned.is_empty());
        assert_eq!(load_json::<u64>(&store, "missing"), None);
    }

    #[test]
    fn test_quota() {
        let mut store = MemoryStore::with_quota(12);
        assert!(store.set("coins", "12345").is_ok());
        // Overwriting the same key only counts the new value
        assert!(store.set("coins", "1234567").is_ok());
        assert_eq!(store.set("other", "x"), Err(StoreError::QuotaExceeded));
        assert_eq!(StoreError::QuotaExceeded.to_string(), "storage quota exceeded");
    }
}
