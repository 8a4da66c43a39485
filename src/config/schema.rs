//! Configuration schema definitions.
//!
//! These structs map to `.assetgate/config.yml`. Every field has a default,
//! so an empty file (or no file at all) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::parse_ttl;
use crate::error::{AssetGateError, Result};

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetGateConfig {
    /// Theme root directory. Relative paths are joined to the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_root: Option<PathBuf>,

    /// Manifest location, relative to the theme root.
    pub manifest_path: PathBuf,

    /// Public URL prefix for built files.
    pub dist_uri: String,

    /// Version appended to production asset URLs as `?ver=`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_version: Option<String>,

    /// Logical names of the page entry points.
    pub entries: EntryPoints,

    /// Environment flags.
    pub environment: EnvironmentConfig,

    /// Dev server connection settings.
    pub dev_server: DevServerConfig,

    /// Cache lifetimes.
    pub cache: CacheConfig,

    /// Build verification settings.
    pub verify: VerifyConfig,
}

impl Default for AssetGateConfig {
    fn default() -> Self {
        Self {
            theme_root: None,
            manifest_path: PathBuf::from("dist/.vite/manifest.json"),
            dist_uri: "/dist/".to_string(),
            asset_version: None,
            entries: EntryPoints::default(),
            environment: EnvironmentConfig::default(),
            dev_server: DevServerConfig::default(),
            cache: CacheConfig::default(),
            verify: VerifyConfig::default(),
        }
    }
}

/// Logical source paths used as page entry points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryPoints {
    /// Main script module.
    pub script: String,
    /// Main stylesheet, if built separately from the script.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl Default for EntryPoints {
    fn default() -> Self {
        Self {
            script: "src/js/main.js".to_string(),
            style: Some("src/css/main.css".to_string()),
        }
    }
}

/// Environment flags as written in the config file.
///
/// Each one can be overridden by its environment constant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Debug mode (`WP_DEBUG`).
    pub debug: bool,
    /// Local development marker (`WP_LOCAL_DEV`).
    pub local_dev: bool,
    /// Environment type such as "local", "staging", "production"
    /// (`WP_ENVIRONMENT_TYPE`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_type: Option<String>,
}

/// Dev server scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            _ => Err(format!("unknown protocol: {}", s)),
        }
    }
}

/// Dev server connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevServerConfig {
    /// Host the dev server listens on.
    pub host: String,
    /// Primary port, used for URLs when no probe result is available.
    pub port: u16,
    /// URL scheme.
    pub protocol: Protocol,
    /// Ports probed in order.
    pub port_range: Vec<u16>,
    /// Connection timeout per port, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3000,
            protocol: Protocol::Http,
            port_range: vec![3000, 3001, 3002, 3003, 3004, 3005],
            timeout_ms: 1000,
        }
    }
}

/// Cache lifetimes, as TTL strings ("1h", "5m", "1d").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// DNS answers.
    pub dns_ttl: String,
    /// A dev server that answered.
    pub probe_ttl: String,
    /// No dev server found. Kept short so a freshly started server shows up.
    pub probe_negative_ttl: String,
    /// Decoded manifest in production.
    pub manifest_ttl: String,
    /// Decoded manifest when debugging or outside production.
    pub manifest_debug_ttl: String,
    /// Throttle for "manifest missing" and path-check diagnostics.
    pub missing_ttl: String,
    /// Directory for the persistent cache, relative to the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dns_ttl: "1h".to_string(),
            probe_ttl: "5m".to_string(),
            probe_negative_ttl: "1m".to_string(),
            manifest_ttl: "1d".to_string(),
            manifest_debug_ttl: "1h".to_string(),
            missing_ttl: "1h".to_string(),
            dir: None,
        }
    }
}

/// Build verification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Logical entries that must be present. Empty means the entry points.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Build output directory, relative to the theme root.
    pub dist_dir: PathBuf,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            required: Vec::new(),
            dist_dir: PathBuf::from("dist"),
        }
    }
}

impl AssetGateConfig {
    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| AssetGateError::ConfigValidationError { message };

        if self.dev_server.host.trim().is_empty() {
            return Err(invalid("dev_server.host must not be empty".to_string()));
        }
        if self.dev_server.port == 0 {
            return Err(invalid("dev_server.port must be non-zero".to_string()));
        }
        if self.dev_server.port_range.is_empty() {
            return Err(invalid("dev_server.port_range must list at least one port".to_string()));
        }
        if self.dev_server.port_range.contains(&0) {
            return Err(invalid("dev_server.port_range must not contain port 0".to_string()));
        }
        if self.dev_server.timeout_ms == 0 {
            return Err(invalid("dev_server.timeout_ms must be non-zero".to_string()));
        }
        if self.entries.script.trim().is_empty() {
            return Err(invalid("entries.script must not be empty".to_string()));
        }

        let ttls = [
            ("cache.dns_ttl", &self.cache.dns_ttl),
            ("cache.probe_ttl", &self.cache.probe_ttl),
            ("cache.probe_negative_ttl", &self.cache.probe_negative_ttl),
            ("cache.manifest_ttl", &self.cache.manifest_ttl),
            ("cache.manifest_debug_ttl", &self.cache.manifest_debug_ttl),
            ("cache.missing_ttl", &self.cache.missing_ttl),
        ];
        for (field, value) in ttls {
            if let Err(e) = parse_ttl(value) {
                return Err(invalid(format!("{} '{}' is not a TTL: {}", field, value, e)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config: AssetGateConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, AssetGateConfig::default());
    }

    #[test]
    fn defaults_match_vite_layout() {
        let config = AssetGateConfig::default();
        assert_eq!(config.manifest_path, PathBuf::from("dist/.vite/manifest.json"));
        assert_eq!(config.entries.script, "src/js/main.js");
        assert_eq!(config.dev_server.port_range, vec![3000, 3001, 3002, 3003, 3004, 3005]);
        assert_eq!(config.dev_server.protocol, Protocol::Http);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = r#"
dev_server:
  host: 127.0.0.1
  protocol: https
environment:
  environment_type: staging
"#;
        let config: AssetGateConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.dev_server.host, "127.0.0.1");
        assert_eq!(config.dev_server.protocol, Protocol::Https);
        assert_eq!(config.dev_server.port, 3000);
        assert_eq!(config.environment.environment_type.as_deref(), Some("staging"));
        assert!(!config.environment.debug);
    }

    #[test]
    fn protocol_parses_case_insensitively() {
        assert_eq!("HTTPS".parse::<Protocol>().unwrap(), Protocol::Https);
        assert!("ftp".parse::<Protocol>().is_err());
        assert_eq!(Protocol::Http.to_string(), "http");
    }

    #[test]
    fn default_config_validates() {
        AssetGateConfig::default().validate().unwrap();
    }

    #[test]
    fn validate_rejects_empty_port_range() {
        let mut config = AssetGateConfig::default();
        config.dev_server.port_range.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("port_range"));
    }

    #[test]
    fn validate_rejects_bad_ttl() {
        let mut config = AssetGateConfig::default();
        config.cache.probe_ttl = "whenever".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cache.probe_ttl"));

        let mut config = AssetGateConfig::default();
        config.cache.dns_ttl = "-1h".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cache.dns_ttl"));

        let mut config = AssetGateConfig::default();
        config.cache.manifest_ttl = "999999999999d".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cache.manifest_ttl"));
    }
}
