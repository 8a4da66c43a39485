//! Cached manifest loading.
//!
//! The manifest is read from disk at most once per modification time:
//! the cache key embeds a hash of the canonical path and the file's mtime,
//! so a rebuild is picked up on the next call without explicit
//! invalidation.

use chrono::Duration;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use super::entry::Manifest;
use super::parse::parse_manifest;
use crate::cache::{short_hash, CacheStore};
use crate::config::Settings;
use crate::error::{AssetGateError, Result};

/// Loads the build manifest for one theme.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    theme_root: PathBuf,
    manifest_path: PathBuf,
    ttl: Duration,
    missing_ttl: Duration,
}

impl ManifestLoader {
    /// Loader for `manifest_path`, which must stay inside `theme_root`.
    pub fn new(theme_root: impl Into<PathBuf>, manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            theme_root: theme_root.into(),
            manifest_path: manifest_path.into(),
            ttl: Duration::days(1),
            missing_ttl: Duration::hours(1),
        }
    }

    /// Loader configured from resolved settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.theme_root, &settings.manifest_path)
            .with_ttl(settings.manifest_ttl())
            .with_missing_ttl(settings.ttls.missing)
    }

    /// How long a decoded manifest stays cached.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// How long "missing" and "outside root" outcomes are remembered.
    pub fn with_missing_ttl(mut self, ttl: Duration) -> Self {
        self.missing_ttl = ttl;
        self
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn theme_root(&self) -> &Path {
        &self.theme_root
    }

    /// The manifest, or `None` if it is missing, outside the theme root or
    /// invalid. Failures are logged.
    pub fn get_manifest(&self, cache: &mut CacheStore) -> Option<Manifest> {
        match self.load(cache) {
            Ok(manifest) => Some(manifest),
            // Already logged, throttled
            Err(AssetGateError::ManifestMissing { .. } | AssetGateError::PathOutsideRoot { .. }) => {
                None
            }
            Err(e) => {
                tracing::error!("{}", e);
                None
            }
        }
    }

    /// Load the manifest, reporting why it could not be loaded.
    pub fn load(&self, cache: &mut CacheStore) -> Result<Manifest> {
        let outside_key = format!("manifest-outside:{}", self.paths_hash());
        if cache.contains(&outside_key) {
            tracing::debug!(
                "Skipping manifest at {}: known to be outside the theme root",
                self.manifest_path.display()
            );
            return Err(self.outside_root());
        }

        let (real_root, real_path) = match (
            fs::canonicalize(&self.theme_root),
            fs::canonicalize(&self.manifest_path),
        ) {
            (Ok(root), Ok(path)) => (root, path),
            _ => return Err(self.missing(cache)),
        };

        if !real_path.starts_with(&real_root) {
            tracing::error!(
                "Manifest path {} resolves outside of {}",
                real_path.display(),
                real_root.display()
            );
            if let Err(e) = cache.set(&outside_key, &true, self.missing_ttl) {
                tracing::warn!("Failed to cache manifest path check: {}", e);
            }
            return Err(self.outside_root());
        }

        let mtime = match fs::metadata(&real_path).and_then(|m| m.modified()) {
            Ok(modified) => modified
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or_default(),
            Err(_) => return Err(self.missing(cache)),
        };

        let prefix = format!(
            "manifest:{}:",
            short_hash(real_path.to_string_lossy().as_bytes())
        );
        let key = format!("{}{}", prefix, mtime);
        if let Some(manifest) = cache.get::<Manifest>(&key) {
            tracing::trace!("Manifest cache hit for {}", real_path.display());
            return Ok(manifest);
        }

        let content = match fs::read_to_string(&real_path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("Failed to read {}: {}", real_path.display(), e);
                return Err(self.missing(cache));
            }
        };

        let manifest = parse_manifest(&content, &real_path)?;
        tracing::debug!(
            "Loaded manifest with {} entries from {}",
            manifest.len(),
            real_path.display()
        );

        if let Err(e) = cache.set(&key, &manifest, self.ttl) {
            tracing::warn!("Failed to cache manifest: {}", e);
        }
        // Entries for earlier builds are never read again
        match cache.remove_superseded(&prefix, &key) {
            Ok(0) => {}
            Ok(n) => tracing::debug!("Dropped {} cached manifest(s) from earlier builds", n),
            Err(e) => tracing::debug!("Failed to drop old manifest cache entries: {}", e),
        }
        Ok(manifest)
    }

    fn paths_hash(&self) -> String {
        let joined = format!(
            "{}\n{}",
            self.theme_root.display(),
            self.manifest_path.display()
        );
        short_hash(joined.as_bytes())
    }

    fn outside_root(&self) -> AssetGateError {
        AssetGateError::PathOutsideRoot {
            path: self.manifest_path.clone(),
            root: self.theme_root.clone(),
        }
    }

    // Logs once per missing TTL; the file itself is checked on every call.
    fn missing(&self, cache: &mut CacheStore) -> AssetGateError {
        let marker = format!("manifest-missing:{}", self.paths_hash());
        if cache.contains(&marker) {
            tracing::debug!("Manifest still missing at {}", self.manifest_path.display());
        } else {
            tracing::warn!(
                "Manifest not found or not readable at {}",
                self.manifest_path.display()
            );
            if let Err(e) = cache.set(&marker, &true, self.missing_ttl) {
                tracing::warn!("Failed to cache missing manifest marker: {}", e);
            }
        }

        AssetGateError::ManifestMissing {
            path: self.manifest_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{"src/js/main.js": {"file": "main.abc123.js", "isEntry": true}}"#;

    fn theme() -> (TempDir, ManifestLoader) {
        let temp = TempDir::new().unwrap();
        let loader = ManifestLoader::new(
            temp.path(),
            temp.path().join("dist/.vite/manifest.json"),
        );
        (temp, loader)
    }

    fn write_manifest(root: &Path, content: &str) -> PathBuf {
        let path = root.join("dist/.vite/manifest.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    #[test]
    fn loads_valid_manifest() {
        let (temp, loader) = theme();
        write_manifest(temp.path(), MANIFEST);

        let mut cache = CacheStore::in_memory();
        let manifest = loader.get_manifest(&mut cache).unwrap();
        assert_eq!(
            manifest.get("src/js/main.js").unwrap().file.as_deref(),
            Some("main.abc123.js")
        );
    }

    #[test]
    fn missing_manifest_is_none() {
        let (_temp, loader) = theme();
        let mut cache = CacheStore::in_memory();

        assert!(loader.get_manifest(&mut cache).is_none());
        assert!(matches!(
            loader.load(&mut cache),
            Err(AssetGateError::ManifestMissing { .. })
        ));
    }

    #[test]
    fn fresh_build_is_picked_up_after_missing() {
        let (temp, loader) = theme();
        let mut cache = CacheStore::in_memory();

        assert!(loader.get_manifest(&mut cache).is_none());
        write_manifest(temp.path(), MANIFEST);
        assert!(loader.get_manifest(&mut cache).is_some());
    }

    #[test]
    fn unchanged_file_is_served_from_cache() {
        let (temp, loader) = theme();
        let path = write_manifest(temp.path(), MANIFEST);
        let mtime = fs::metadata(&path).unwrap().modified().unwrap();

        let mut cache = CacheStore::in_memory();
        loader.load(&mut cache).unwrap();

        // Same mtime, so the broken content is never read
        fs::write(&path, "broken").unwrap();
        set_mtime(&path, mtime);

        let manifest = loader.load(&mut cache).unwrap();
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn modified_file_is_reloaded() {
        let (temp, loader) = theme();
        let path = write_manifest(temp.path(), MANIFEST);
        let mtime = fs::metadata(&path).unwrap().modified().unwrap();

        let mut cache = CacheStore::in_memory();
        loader.load(&mut cache).unwrap();

        fs::write(
            &path,
            r#"{"src/js/main.js": {"file": "main.def456.js"}, "src/css/main.css": {"file": "main.789.css"}}"#,
        )
        .unwrap();
        set_mtime(&path, mtime + std::time::Duration::from_secs(5));

        let manifest = loader.load(&mut cache).unwrap();
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn invalid_manifest_is_an_error() {
        let (temp, loader) = theme();
        write_manifest(temp.path(), "[]");

        let mut cache = CacheStore::in_memory();
        assert!(matches!(
            loader.load(&mut cache),
            Err(AssetGateError::ManifestInvalid { .. })
        ));
        assert!(loader.get_manifest(&mut cache).is_none());
    }

    #[test]
    fn path_outside_theme_is_rejected_and_remembered() {
        let temp = TempDir::new().unwrap();
        let theme_root = temp.path().join("theme");
        fs::create_dir_all(&theme_root).unwrap();
        write_manifest(temp.path(), MANIFEST);

        let loader = ManifestLoader::new(
            &theme_root,
            theme_root.join("../dist/.vite/manifest.json"),
        );
        let mut cache = CacheStore::in_memory();

        assert!(matches!(
            loader.load(&mut cache),
            Err(AssetGateError::PathOutsideRoot { .. })
        ));
        assert!(cache.contains(&format!("manifest-outside:{}", loader.paths_hash())));

        // Short-circuits even if the file changes
        fs::remove_file(temp.path().join("dist/.vite/manifest.json")).unwrap();
        assert!(matches!(
            loader.load(&mut cache),
            Err(AssetGateError::PathOutsideRoot { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escaping_theme_is_rejected() {
        let temp = TempDir::new().unwrap();
        let outside = temp.path().join("outside");
        write_manifest(&outside, MANIFEST);

        let theme_root = temp.path().join("theme");
        fs::create_dir_all(&theme_root).unwrap();
        std::os::unix::fs::symlink(outside.join("dist"), theme_root.join("dist")).unwrap();

        let loader = ManifestLoader::new(&theme_root, theme_root.join("dist/.vite/manifest.json"));
        let mut cache = CacheStore::in_memory();
        assert!(loader.get_manifest(&mut cache).is_none());
    }

    #[test]
    fn sibling_with_shared_prefix_is_outside() {
        let temp = TempDir::new().unwrap();
        let theme_root = temp.path().join("theme");
        fs::create_dir_all(&theme_root).unwrap();
        write_manifest(&temp.path().join("theme-evil"), MANIFEST);

        let loader = ManifestLoader::new(
            &theme_root,
            temp.path().join("theme-evil/dist/.vite/manifest.json"),
        );
        let mut cache = CacheStore::in_memory();
        assert!(matches!(
            loader.load(&mut cache),
            Err(AssetGateError::PathOutsideRoot { .. })
        ));
    }

    #[test]
    fn missing_marker_is_cached() {
        let (_temp, loader) = theme();
        let mut cache = CacheStore::in_memory();
        loader.get_manifest(&mut cache);
        assert!(cache.contains(&format!("manifest-missing:{}", loader.paths_hash())));
    }

    #[test]
    fn persistent_cache_is_shared_between_stores() {
        let (temp, loader) = theme();
        let path = write_manifest(temp.path(), MANIFEST);
        let mtime = fs::metadata(&path).unwrap().modified().unwrap();
        let cache_dir = temp.path().join(".assetgate/cache");

        let mut first = CacheStore::persistent(&cache_dir);
        loader.load(&mut first).unwrap();

        fs::write(&path, "broken").unwrap();
        set_mtime(&path, mtime);

        let mut second = CacheStore::persistent(&cache_dir);
        assert!(loader.load(&mut second).is_ok());
    }

    #[test]
    fn rebuild_replaces_cached_manifest() {
        let (temp, loader) = theme();
        let path = write_manifest(temp.path(), MANIFEST);
        let mtime = fs::metadata(&path).unwrap().modified().unwrap();
        let mut cache = CacheStore::persistent(temp.path().join(".assetgate/cache"));

        for build in 1..=3 {
            set_mtime(&path, mtime + std::time::Duration::from_secs(build));
            loader.load(&mut cache).unwrap();
        }

        let manifests: Vec<String> = cache
            .list()
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .filter(|k| k.starts_with("manifest:"))
            .collect();
        assert_eq!(manifests.len(), 1);
    }
}
