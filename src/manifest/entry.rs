//! Build manifest types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One chunk of a Vite build manifest.
///
/// Only `file` and `css` are used for serving; the rest is kept so the
/// manifest round-trips through the cache unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Built file, relative to the dist directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Stylesheets extracted from this chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "isEntry", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_entry: bool,

    #[serde(
        rename = "isDynamicEntry",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_dynamic_entry: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,

    #[serde(rename = "dynamicImports", default, skip_serializing_if = "Vec::is_empty")]
    pub dynamic_imports: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<String>,
}

impl ManifestEntry {
    /// Entry with just a built file.
    pub fn with_file(file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            ..Default::default()
        }
    }

    /// The `file` and every `css` path, in that order.
    pub fn referenced_files(&self) -> impl Iterator<Item = &str> {
        self.file
            .as_deref()
            .into_iter()
            .chain(self.css.iter().flatten().map(String::as_str))
    }
}

/// Decoded build manifest, keyed by logical source path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new(entries: BTreeMap<String, ManifestEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, logical: &str) -> Option<&ManifestEntry> {
        self.entries.get(logical)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Logical names of the entries Vite marked as entry points.
    pub fn entry_points(&self) -> impl Iterator<Item = &str> {
        self.entries()
            .filter(|(_, entry)| entry.is_entry)
            .map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ManifestEntry)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (String, ManifestEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
