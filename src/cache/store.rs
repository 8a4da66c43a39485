//! Cache storage implementation.

use anyhow::{Context, Result};
use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::entry::CacheEntry;

/// Hex of the first 16 bytes of a SHA-256 digest.
pub fn short_hash(bytes: &[u8]) -> String {
    let hash = Sha256::digest(bytes);
    hex::encode(&hash[..16])
}

/// Storage for cached resolutions.
///
/// Always keeps entries in memory. A persistent store additionally writes
/// each entry to `<root>/<hash>.json` and falls back to disk on a memory
/// miss, so separate processes share results.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Directory for persisted entries, if any.
    root: Option<PathBuf>,
    /// Entries loaded or written by this process.
    entries: HashMap<String, CacheEntry>,
}

impl CacheStore {
    /// Create a store that only lives in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Create a store backed by a directory.
    pub fn persistent(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            entries: HashMap::new(),
        }
    }

    /// Get the cache directory, if persistent.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Ensure the cache directory exists.
    fn ensure_dir(root: &Path) -> Result<()> {
        fs::create_dir_all(root)
            .with_context(|| format!("Failed to create cache directory {:?}", root))
    }

    /// Get the file path for a key in a persistent store.
    pub fn entry_path(&self, key: &str) -> Option<PathBuf> {
        let root = self.root.as_ref()?;
        Some(root.join(format!("{}.json", short_hash(key.as_bytes()))))
    }

    /// Look up a fresh value.
    ///
    /// Expired entries are evicted and reported as a miss. A value that no
    /// longer deserializes into `T` is also a miss.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let entry = self.fresh_entry(key)?;
        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("Discarding cache entry {} with unexpected shape: {}", key, e);
                None
            }
        }
    }

    /// Check whether a fresh entry exists for `key`.
    pub fn contains(&mut self, key: &str) -> bool {
        self.fresh_entry(key).is_some()
    }

    fn fresh_entry(&mut self, key: &str) -> Option<&CacheEntry> {
        if !self.entries.contains_key(key) {
            let loaded = self.load_from_disk(key)?;
            self.entries.insert(key.to_string(), loaded);
        }

        let expired = self.entries.get(key).is_some_and(CacheEntry::is_expired);
        if expired {
            if let Err(e) = self.remove(key) {
                tracing::debug!("Failed to evict expired cache entry {}: {}", key, e);
            }
            return None;
        }

        self.entries.get(key)
    }

    fn load_from_disk(&self, key: &str) -> Option<CacheEntry> {
        let path = self.entry_path(key)?;
        let json = fs::read_to_string(&path).ok()?;
        let entry: CacheEntry = serde_json::from_str(&json).ok()?;
        // Guard against hash collisions
        (entry.key == key).then_some(entry)
    }

    /// Store a value for `ttl`.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("Failed to serialize cache value for {}", key))?;
        let entry = CacheEntry::new(key, value, ttl);

        if let (Some(root), Some(path)) = (self.root.as_deref(), self.entry_path(key)) {
            Self::ensure_dir(root)?;
            let json = serde_json::to_string_pretty(&entry)?;
            fs::write(&path, json)
                .with_context(|| format!("Failed to write cache entry {:?}", path))?;
        }

        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    /// Remove an entry.
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        let mut removed = self.entries.remove(key).is_some();

        if let Some(path) = self.entry_path(key) {
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove cache entry {:?}", path))?;
                removed = true;
            }
        }

        Ok(removed)
    }

    /// List all entries, newest first, including expired ones.
    pub fn list(&self) -> Result<Vec<CacheEntry>> {
        let mut by_key: HashMap<String, CacheEntry> = self.entries.clone();

        if let Some(root) = &self.root {
            if root.is_dir() {
                for dir_entry in fs::read_dir(root)? {
                    let path = dir_entry?.path();
                    if path.extension().is_some_and(|e| e == "json") {
                        if let Ok(json) = fs::read_to_string(&path) {
                            if let Ok(entry) = serde_json::from_str::<CacheEntry>(&json) {
                                by_key.entry(entry.key.clone()).or_insert(entry);
                            }
                        }
                    }
                }
            }
        }

        let mut entries: Vec<CacheEntry> = by_key.into_values().collect();
        entries.sort_by(|a, b| b.metadata.cached_at.cmp(&a.metadata.cached_at));
        Ok(entries)
    }

    /// Clear all entries.
    pub fn clear(&mut self) -> Result<usize> {
        let entries = self.list()?;
        let count = entries.len();

        for entry in entries {
            let _ = self.remove(&entry.key);
        }

        Ok(count)
    }

    /// Remove expired entries only.
    pub fn cleanup_expired(&mut self) -> Result<usize> {
        let mut removed = 0;

        for entry in self.list()? {
            if entry.is_expired() && self.remove(&entry.key)? {
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Remove every entry whose key starts with `prefix`, except `keep`.
    pub fn remove_superseded(&mut self, prefix: &str, keep: &str) -> Result<usize> {
        let mut removed = 0;

        for entry in self.list()? {
            if entry.key != keep && entry.key.starts_with(prefix) && self.remove(&entry.key)? {
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Get total cached size in bytes.
    pub fn total_size(&self) -> Result<u64> {
        let entries = self.list()?;
        Ok(entries.iter().map(|e| e.metadata.size_bytes).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_set_and_get() {
        let mut store = CacheStore::in_memory();
        store
            .set("dns:example_com", &"93.184.216.34", Duration::hours(1))
            .unwrap();

        let value: Option<String> = store.get("dns:example_com");
        assert_eq!(value.as_deref(), Some("93.184.216.34"));
        assert!(store.root().is_none());
    }

    #[test]
    fn get_missing_returns_none() {
        let mut store = CacheStore::in_memory();
        let value: Option<String> = store.get("nope");
        assert!(value.is_none());
    }

    #[test]
    fn expired_entry_is_evicted() {
        let mut store = CacheStore::in_memory();
        store.set("k", &1u16, Duration::zero()).unwrap();

        let value: Option<u16> = store.get("k");
        assert!(value.is_none());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn huge_ttl_does_not_panic() {
        let mut store = CacheStore::in_memory();
        store
            .set("dns:x", &"1.2.3.4", Duration::days(1_000_000_000))
            .unwrap();
        let value: Option<String> = store.get("dns:x");
        assert_eq!(value.as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn remove_superseded_keeps_current() {
        let temp = TempDir::new().unwrap();
        let mut store = CacheStore::persistent(temp.path());
        store.set("manifest:abc:1", &1, Duration::hours(1)).unwrap();
        store.set("manifest:abc:2", &2, Duration::hours(1)).unwrap();
        store.set("manifest:def:1", &3, Duration::hours(1)).unwrap();

        let removed = store.remove_superseded("manifest:abc:", "manifest:abc:2").unwrap();

        assert_eq!(removed, 1);
        let keys: Vec<String> = store.list().unwrap().into_iter().map(|e| e.key).collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&"manifest:abc:2".to_string()));
        assert!(keys.contains(&"manifest:def:1".to_string()));
    }

    #[test]
    fn wrong_shape_is_a_miss() {
        let mut store = CacheStore::in_memory();
        store.set("k", &"text", Duration::hours(1)).unwrap();

        let value: Option<u16> = store.get("k");
        assert!(value.is_none());
    }

    #[test]
    fn persistent_store_survives_new_instance() {
        let temp = TempDir::new().unwrap();
        {
            let mut store = CacheStore::persistent(temp.path());
            store.set("probe:localhost", &3001u16, Duration::minutes(5)).unwrap();
        }

        let mut store = CacheStore::persistent(temp.path());
        let value: Option<u16> = store.get("probe:localhost");
        assert_eq!(value, Some(3001));
    }

    #[test]
    fn remove_entry() {
        let temp = TempDir::new().unwrap();
        let mut store = CacheStore::persistent(temp.path());
        store.set("k", &"v", Duration::hours(1)).unwrap();

        assert!(store.remove("k").unwrap());
        assert!(!store.contains("k"));
        assert!(!store.remove("k").unwrap());
    }

    #[test]
    fn list_merges_memory_and_disk() {
        let temp = TempDir::new().unwrap();
        {
            let mut store = CacheStore::persistent(temp.path());
            store.set("a", &1, Duration::hours(1)).unwrap();
        }
        let mut store = CacheStore::persistent(temp.path());
        store.set("b", &2, Duration::hours(1)).unwrap();

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn clear_cache() {
        let temp = TempDir::new().unwrap();
        let mut store = CacheStore::persistent(temp.path());
        store.set("a", &1, Duration::hours(1)).unwrap();
        store.set("b", &2, Duration::hours(1)).unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn cleanup_removes_only_expired() {
        let mut store = CacheStore::in_memory();
        store.set("fresh", &1, Duration::hours(1)).unwrap();
        store.set("stale", &2, Duration::zero()).unwrap();

        assert_eq!(store.cleanup_expired().unwrap(), 1);
        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "fresh");
    }

    #[test]
    fn total_size_calculation() {
        let mut store = CacheStore::in_memory();
        store.set("a", &"12345", Duration::hours(1)).unwrap(); // 7 bytes with quotes
        store.set("b", &12345, Duration::hours(1)).unwrap(); // 5 bytes

        assert_eq!(store.total_size().unwrap(), 12);
    }

    #[test]
    fn entry_path_is_deterministic() {
        let store = CacheStore::persistent("/tmp/assetgate-cache");
        assert_eq!(store.entry_path("k"), store.entry_path("k"));
        assert_ne!(store.entry_path("k1"), store.entry_path("k2"));
    }
}
