//! Time-boxed resolution cache.
//!
//! Holds decoded manifests, DNS answers and dev-server probe outcomes so the
//! expensive I/O behind them (filesystem, resolver, TCP) is not repeated on
//! every request. The cache is an explicit object owned by the caller and
//! passed by `&mut` reference; nothing here is global.
//!
//! Entries either live in memory for the lifetime of the process, or are
//! also written to a directory so separate invocations share them.

pub mod entry;
pub mod store;
pub mod ttl;

pub use entry::{CacheEntry, CacheMetadata};
pub use store::{short_hash, CacheStore};
pub use ttl::{format_duration, parse_ttl, sanitize_key};

/// Default directory for the persistent cache, relative to a project root.
pub fn default_cache_dir(project_root: &std::path::Path) -> std::path::PathBuf {
    project_root.join(".assetgate").join("cache")
}
