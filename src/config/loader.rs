//! Configuration file discovery and loading.
//!
//! Merge order (later overrides earlier):
//! 1. Project config (`.assetgate/config.yml`)
//! 2. Local overrides (`.assetgate/config.local.yml`)
//!
//! Both files are optional; with neither present the defaults apply.

use crate::config::schema::AssetGateConfig;
use crate::error::{AssetGateError, Result};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-project configuration directory.
pub const CONFIG_DIR: &str = ".assetgate";

/// Paths to configuration files in merge order.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project config: .assetgate/config.yml
    pub project: Option<PathBuf>,

    /// Local overrides: .assetgate/config.local.yml
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            project: existing(project_root.join(CONFIG_DIR).join("config.yml")),
            project_local: existing(project_root.join(CONFIG_DIR).join("config.local.yml")),
        }
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(self.project_local.iter()).collect()
    }

    /// Check if a project config exists.
    pub fn has_project_config(&self) -> bool {
        self.project.is_some()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

/// Find the project root by walking up from `start`.
///
/// Looks for a `.assetgate` directory first, then `.git`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CONFIG_DIR).is_dir() || current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<AssetGateConfig> {
    let value = load_config_value(path)?;
    from_value(value, path)
}

/// Parse YAML content into a config.
pub fn parse_config(content: &str, source_path: &Path) -> Result<AssetGateConfig> {
    if content.trim().is_empty() {
        return Ok(AssetGateConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| AssetGateError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a config file as a raw YAML value, for merging.
pub fn load_config_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AssetGateError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            AssetGateError::Io(e)
        }
    })?;

    if content.trim().is_empty() {
        return Ok(Value::Mapping(Default::default()));
    }

    serde_yaml::from_str(&content).map_err(|e| AssetGateError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn from_value(value: Value, path: &Path) -> Result<AssetGateConfig> {
    serde_yaml::from_value(value).map_err(|e| AssetGateError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Deep merge two YAML values.
///
/// Mappings merge recursively, anything else in `overlay` replaces `base`.
/// A null in `overlay` deletes the key.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();
            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    result.remove(key);
                } else if let Some(base_value) = base_map.get(key) {
                    result.insert(key.clone(), deep_merge(base_value, overlay_value));
                } else {
                    result.insert(key.clone(), overlay_value.clone());
                }
            }
            Value::Mapping(result)
        }
        (_, overlay) => overlay.clone(),
    }
}

/// Load and merge the project's config files.
///
/// Returns the defaults when no config file exists.
pub fn load_merged_config(project_root: &Path) -> Result<AssetGateConfig> {
    let paths = ConfigPaths::discover(project_root);

    let mut merged = Value::Mapping(Default::default());
    for path in paths.all_existing() {
        tracing::debug!("Loading config from {}", path.display());
        merged = deep_merge(&merged, &load_config_value(path)?);
    }

    let config = from_value(merged, &project_root.join(CONFIG_DIR).join("config.yml"))?;
    config.validate()?;
    Ok(config)
}

/// Load config with optional path override.
///
/// If `config_override` is provided, loads only that file without merging.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<AssetGateConfig> {
    let config = match config_override {
        Some(path) => load_config_file(path)?,
        None => return load_merged_config(project_root),
    };
    config.validate()?;
    Ok(config)
}
