//! Configuration loading and resolution.
//!
//! - Schema definitions in [`schema`]
//! - File discovery, loading and merging in [`loader`]
//! - Override hooks in [`overrides`]
//! - Final, immutable [`Settings`] in [`settings`]
//!
//! # Example
//!
//! ```
//! use assetgate::config::{load_merged_config, NoOverrides, Settings};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::create_dir_all(temp.path().join(".assetgate")).unwrap();
//! fs::write(
//!     temp.path().join(".assetgate/config.yml"),
//!     "dev_server:\n  port_range: [5173, 5174]\n",
//! )
//! .unwrap();
//!
//! let config = load_merged_config(temp.path()).unwrap();
//! let settings = Settings::resolve(&config, temp.path(), &NoOverrides, |_: &str| {
//!     Err(std::env::VarError::NotPresent)
//! })
//! .unwrap();
//! assert_eq!(settings.dev_server.port_range, vec![5173, 5174]);
//! ```

pub mod loader;
pub mod overrides;
pub mod schema;
pub mod settings;

pub use loader::{
    deep_merge, find_project_root, load_config, load_config_file, load_config_value,
    load_merged_config, parse_config, ConfigPaths, CONFIG_DIR,
};
pub use overrides::{NoOverrides, SettingsOverride};
pub use schema::{
    AssetGateConfig, CacheConfig, DevServerConfig, EntryPoints, EnvironmentConfig, Protocol,
    VerifyConfig,
};
pub use settings::{CacheTtls, DevServerSettings, SettingSource, Settings};
