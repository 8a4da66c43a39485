//! Cache entry and metadata types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A cached value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Cache key (e.g., "dns:myapp_local").
    pub key: String,
    /// The cached value, stored as JSON so any serde type fits.
    pub value: serde_json::Value,
    /// Expiry bookkeeping.
    pub metadata: CacheMetadata,
}

/// Metadata for cache expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// When this entry was cached.
    pub cached_at: DateTime<Utc>,
    /// When the cached entry expires.
    pub expires_at: DateTime<Utc>,
    /// Size of the serialized value in bytes.
    pub size_bytes: u64,
}

impl CacheEntry {
    /// Create a new cache entry that expires `ttl` from now.
    ///
    /// A TTL reaching past the last representable instant never expires.
    pub fn new(key: impl Into<String>, value: serde_json::Value, ttl: Duration) -> Self {
        let now = Utc::now();
        let size_bytes = value.to_string().len() as u64;

        Self {
            key: key.into(),
            value,
            metadata: CacheMetadata {
                cached_at: now,
                expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
                size_bytes,
            },
        }
    }

    /// Check if the entry has expired.
    ///
    /// A zero TTL is expired immediately.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.metadata.expires_at
    }

    /// Get the age of this entry.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.metadata.cached_at)
    }
}

impl CacheMetadata {
    /// Calculate remaining TTL in seconds.
    pub fn remaining_ttl(&self) -> i64 {
        self.expires_at
            .signed_duration_since(Utc::now())
            .num_seconds()
            .max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cache_entry_creation() {
        let entry = CacheEntry::new("dns:example_com", json!("93.184.216.34"), Duration::hours(1));

        assert_eq!(entry.key, "dns:example_com");
        assert_eq!(entry.value, json!("93.184.216.34"));
        assert!(!entry.is_expired());
    }

    #[test]
    fn zero_ttl_is_expired() {
        let entry = CacheEntry::new("test", json!(1), Duration::zero());
        assert!(entry.is_expired());
    }

    #[test]
    fn huge_ttl_saturates() {
        let entry = CacheEntry::new("test", json!(1), Duration::days(1_000_000_000));
        assert_eq!(entry.metadata.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(!entry.is_expired());
    }

    #[test]
    fn size_is_serialized_length() {
        let entry = CacheEntry::new("test", json!("12345"), Duration::hours(1));
        // Quotes included
        assert_eq!(entry.metadata.size_bytes, 7);
    }

    #[test]
    fn remaining_ttl_calculation() {
        let entry = CacheEntry::new("test", json!(null), Duration::hours(1));

        let remaining = entry.metadata.remaining_ttl();
        assert!(remaining > 3590);
        assert!(remaining <= 3600);
    }

    #[test]
    fn expired_entry_has_zero_remaining_ttl() {
        let entry = CacheEntry::new("test", json!(null), Duration::zero());
        assert_eq!(entry.metadata.remaining_ttl(), 0);
    }

    #[test]
    fn cache_entry_age() {
        let entry = CacheEntry::new("test", json!(null), Duration::hours(1));
        assert!(entry.age().num_seconds() < 1);
    }
}
