//! Resolved, immutable runtime settings.
//!
//! [`Settings`] is built once at process start from the config file, the
//! override hooks and the environment constants, then passed by reference
//! to the classifier, manifest loader and dev server probe.
//!
//! Precedence for each value, lowest to highest:
//!
//! 1. Built-in default
//! 2. Config file
//! 3. [`SettingsOverride`] hook (dev server settings only)
//! 4. Environment constant, when set
//!
//! The winning layer is recorded per setting so `assetgate config` can
//! show where a value came from.

use chrono::Duration;
use serde::Serialize;
use std::collections::BTreeMap;
use std::env::VarError;
use std::fmt;
use std::path::{Path, PathBuf};

use super::overrides::SettingsOverride;
use super::schema::{AssetGateConfig, EntryPoints, Protocol, VerifyConfig};
use crate::cache::{default_cache_dir, parse_ttl};
use crate::environment::EnvironmentFlags;
use crate::error::{AssetGateError, Result};

/// Debug flag constant.
pub const WP_DEBUG: &str = "WP_DEBUG";
/// Local development flag constant.
pub const WP_LOCAL_DEV: &str = "WP_LOCAL_DEV";
/// Environment type constant.
pub const WP_ENVIRONMENT_TYPE: &str = "WP_ENVIRONMENT_TYPE";
/// Dev server host constant.
pub const VITE_DEV_SERVER_HOST: &str = "VITE_DEV_SERVER_HOST";
/// Dev server port constant.
pub const VITE_DEV_SERVER_PORT: &str = "VITE_DEV_SERVER_PORT";
/// Dev server protocol constant.
pub const VITE_DEV_SERVER_PROTOCOL: &str = "VITE_DEV_SERVER_PROTOCOL";
/// Dev server port range constant ("3000-3005" or "3000,3001").
pub const VITE_DEV_SERVER_PORT_RANGE: &str = "VITE_DEV_SERVER_PORT_RANGE";

/// Where a resolved setting came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingSource {
    /// Built-in default.
    Default,
    /// `.assetgate/config.yml` or its local override.
    ConfigFile,
    /// A [`SettingsOverride`] hook changed it.
    Override,
    /// An environment constant.
    Constant,
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Override => write!(f, "override hook"),
            Self::Constant => write!(f, "environment constant"),
        }
    }
}

/// Resolved dev server settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DevServerSettings {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    pub port_range: Vec<u16>,
    pub timeout: std::time::Duration,
}

/// Resolved cache lifetimes.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheTtls {
    pub dns: Duration,
    pub probe: Duration,
    pub probe_negative: Duration,
    pub manifest: Duration,
    pub manifest_debug: Duration,
    pub missing: Duration,
}

/// Immutable settings for one process.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_root: PathBuf,
    pub theme_root: PathBuf,
    pub manifest_path: PathBuf,
    pub dist_uri: String,
    pub asset_version: Option<String>,
    pub entries: EntryPoints,
    pub environment: EnvironmentFlags,
    pub dev_server: DevServerSettings,
    pub ttls: CacheTtls,
    pub verify: VerifyConfig,
    pub cache_dir: PathBuf,
    sources: BTreeMap<&'static str, SettingSource>,
}

impl Settings {
    /// Resolve settings using the process environment for constants.
    pub fn from_env(
        config: &AssetGateConfig,
        project_root: &Path,
        overrides: &dyn SettingsOverride,
    ) -> Result<Self> {
        Self::resolve(config, project_root, overrides, |key: &str| std::env::var(key))
    }

    /// Resolve settings with a custom constant lookup (for testing).
    pub fn resolve<F>(
        config: &AssetGateConfig,
        project_root: &Path,
        overrides: &dyn SettingsOverride,
        env_fn: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, VarError>,
    {
        let defaults = AssetGateConfig::default();
        let mut sources = BTreeMap::new();

        let debug = pick(
            &mut sources,
            "environment.debug",
            &defaults.environment.debug,
            config.environment.debug,
            |v| v,
            constant(&env_fn, WP_DEBUG, parse_bool)?,
        );
        let local_dev = pick(
            &mut sources,
            "environment.local_dev",
            &defaults.environment.local_dev,
            config.environment.local_dev,
            |v| v,
            constant(&env_fn, WP_LOCAL_DEV, parse_bool)?,
        );
        let environment_type = pick(
            &mut sources,
            "environment.environment_type",
            &defaults.environment.environment_type,
            config.environment.environment_type.clone(),
            |v| v,
            constant(&env_fn, WP_ENVIRONMENT_TYPE, |raw| Some(Some(raw.to_string())))?,
        );

        let host = pick(
            &mut sources,
            "dev_server.host",
            &defaults.dev_server.host,
            config.dev_server.host.clone(),
            |v| overrides.dev_server_host(v),
            constant(&env_fn, VITE_DEV_SERVER_HOST, parse_host)?,
        );
        let port = pick(
            &mut sources,
            "dev_server.port",
            &defaults.dev_server.port,
            config.dev_server.port,
            |v| overrides.dev_server_port(v),
            constant(&env_fn, VITE_DEV_SERVER_PORT, parse_port)?,
        );
        let protocol = pick(
            &mut sources,
            "dev_server.protocol",
            &defaults.dev_server.protocol,
            config.dev_server.protocol,
            |v| overrides.dev_server_protocol(v),
            constant(&env_fn, VITE_DEV_SERVER_PROTOCOL, |raw| {
                raw.parse::<Protocol>().ok()
            })?,
        );
        let port_range = pick(
            &mut sources,
            "dev_server.port_range",
            &defaults.dev_server.port_range,
            config.dev_server.port_range.clone(),
            |v| overrides.dev_server_port_range(v),
            constant(&env_fn, VITE_DEV_SERVER_PORT_RANGE, parse_port_range)?,
        );
        if port_range.is_empty() {
            return Err(AssetGateError::ConfigValidationError {
                message: "dev server port range resolved to no ports".to_string(),
            });
        }

        let theme_root = match &config.theme_root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => project_root.join(root),
            None => project_root.to_path_buf(),
        };
        let cache_dir = match &config.cache.dir {
            Some(dir) => project_root.join(dir),
            None => default_cache_dir(project_root),
        };

        Ok(Self {
            project_root: project_root.to_path_buf(),
            manifest_path: theme_root.join(&config.manifest_path),
            theme_root,
            dist_uri: config.dist_uri.clone(),
            asset_version: config.asset_version.clone(),
            entries: config.entries.clone(),
            environment: EnvironmentFlags {
                debug,
                local_dev,
                environment_type,
            },
            dev_server: DevServerSettings {
                host,
                port,
                protocol,
                port_range,
                timeout: std::time::Duration::from_millis(config.dev_server.timeout_ms),
            },
            ttls: CacheTtls {
                dns: ttl(&config.cache.dns_ttl)?,
                probe: ttl(&config.cache.probe_ttl)?,
                probe_negative: ttl(&config.cache.probe_negative_ttl)?,
                manifest: ttl(&config.cache.manifest_ttl)?,
                manifest_debug: ttl(&config.cache.manifest_debug_ttl)?,
                missing: ttl(&config.cache.missing_ttl)?,
            },
            verify: config.verify.clone(),
            cache_dir,
            sources,
        })
    }

    /// Where a tracked setting came from.
    pub fn source_of(&self, name: &str) -> Option<SettingSource> {
        self.sources.get(name).copied()
    }

    /// All tracked settings and their sources, sorted by name.
    pub fn sources(&self) -> impl Iterator<Item = (&'static str, SettingSource)> + '_ {
        self.sources.iter().map(|(k, v)| (*k, *v))
    }

    /// Manifest cache lifetime for the current environment flags.
    pub fn manifest_ttl(&self) -> Duration {
        if self.environment.is_debug_or_non_production() {
            self.ttls.manifest_debug
        } else {
            self.ttls.manifest
        }
    }
}

fn pick<T: PartialEq + Clone>(
    sources: &mut BTreeMap<&'static str, SettingSource>,
    name: &'static str,
    default: &T,
    configured: T,
    hook: impl FnOnce(T) -> T,
    constant: Option<T>,
) -> T {
    let mut source = if configured == *default {
        SettingSource::Default
    } else {
        SettingSource::ConfigFile
    };

    let hooked = hook(configured.clone());
    if hooked != configured {
        source = SettingSource::Override;
    }

    let value = match constant {
        Some(value) => {
            source = SettingSource::Constant;
            value
        }
        None => hooked,
    };

    sources.insert(name, source);
    value
}

fn constant<T, F>(env_fn: &F, name: &str, parse: impl Fn(&str) -> Option<T>) -> Result<Option<T>>
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    match env_fn(name) {
        Ok(raw) => parse(&raw)
            .map(Some)
            .ok_or_else(|| AssetGateError::ConfigValidationError {
                message: format!("{} has an invalid value: '{}'", name, raw),
            }),
        Err(_) => Ok(None),
    }
}

fn ttl(raw: &str) -> Result<Duration> {
    parse_ttl(raw).map_err(|e| AssetGateError::ConfigValidationError {
        message: format!("'{}' is not a TTL: {}", raw, e),
    })
}

/// Parse a boolean constant the way config files usually spell them.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_host(raw: &str) -> Option<String> {
    let host = raw.trim();
    (!host.is_empty()).then(|| host.to_string())
}

fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse::<u16>().ok().filter(|p| *p != 0)
}

/// Parse "3000-3005" or "3000,3001,3004".
pub fn parse_port_range(raw: &str) -> Option<Vec<u16>> {
    let raw = raw.trim();
    if let Some((start, end)) = raw.split_once('-') {
        let start = parse_port(start)?;
        let end = parse_port(end)?;
        return (start <= end).then(|| (start..=end).collect());
    }

    raw.split(',')
        .map(parse_port)
        .collect::<Option<Vec<u16>>>()
        .filter(|ports| !ports.is_empty())
}
