//! Logical name to hashed filename resolution.

use regex::Regex;
use std::sync::LazyLock;

use super::entry::Manifest;
use crate::error::{AssetGateError, Result};

// name.hash.ext
static HASHED_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.(js|mjs|css)$").unwrap());

/// Whether `file` is safe to serve: no `..` anywhere and a basename of
/// the form `name.hash.ext`.
pub fn is_safe_file(file: &str) -> bool {
    if file.contains("..") {
        return false;
    }
    let basename = file.rsplit('/').next().unwrap_or(file);
    HASHED_FILENAME.is_match(basename)
}

/// Resolve `logical` to its built file, explaining any rejection.
pub fn check_asset<'m>(manifest: &'m Manifest, logical: &str) -> Result<&'m str> {
    let file = manifest
        .get(logical)
        .and_then(|entry| entry.file.as_deref())
        .ok_or_else(|| AssetGateError::AssetNotInManifest {
            name: logical.to_string(),
        })?;

    if !is_safe_file(file) {
        return Err(AssetGateError::AssetRejected {
            name: logical.to_string(),
            file: file.to_string(),
        });
    }
    Ok(file)
}

/// Resolve `logical` to its built file.
///
/// Returns `None` when the entry is missing or its filename is rejected.
/// Rejections are logged.
pub fn resolve_asset<'m>(manifest: &'m Manifest, logical: &str) -> Option<&'m str> {
    match check_asset(manifest, logical) {
        Ok(file) => Some(file),
        Err(e @ AssetGateError::AssetRejected { .. }) => {
            tracing::warn!("{}", e);
            None
        }
        Err(e) => {
            tracing::debug!("{}", e);
            None
        }
    }
}

/// Stylesheets extracted from `logical`'s chunk.
///
/// Unsafe paths are skipped and logged.
pub fn resolve_stylesheets<'m>(manifest: &'m Manifest, logical: &str) -> Vec<&'m str> {
    let Some(css) = manifest.get(logical).and_then(|entry| entry.css.as_ref()) else {
        return Vec::new();
    };

    css.iter()
        .map(String::as_str)
        .filter(|file| {
            let safe = is_safe_file(file);
            if !safe {
                tracing::warn!("Skipping stylesheet '{}' of '{}': invalid filename", file, logical);
            }
            safe
        })
        .collect()
}
