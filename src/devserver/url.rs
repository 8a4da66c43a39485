//! Dev server URL construction.

use crate::config::{DevServerSettings, Protocol, SettingsOverride};

/// `protocol://host:port`, bracketing bare IPv6 hosts.
pub fn dev_server_url(protocol: Protocol, host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("{}://[{}]:{}", protocol, host, port)
    } else {
        format!("{}://{}:{}", protocol, host, port)
    }
}

/// URL of the dev server on `port`, or on the configured primary port.
///
/// The result passes through [`SettingsOverride::dev_server_url`].
pub fn resolve_dev_server_url(
    settings: &DevServerSettings,
    port: Option<u16>,
    overrides: &dyn SettingsOverride,
) -> String {
    let port = port.unwrap_or(settings.port);
    let url = dev_server_url(settings.protocol, &settings.host, port);
    overrides.dev_server_url(url, port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NoOverrides;
    use std::time::Duration;

    fn settings() -> DevServerSettings {
        DevServerSettings {
            host: "localhost".to_string(),
            port: 3000,
            protocol: Protocol::Http,
            port_range: vec![3000, 3001],
            timeout: Duration::from_secs(1),
        }
    }

    struct Proxy;

    impl SettingsOverride for Proxy {
        fn dev_server_url(&self, _url: String, port: u16) -> String {
            format!("https://vite.example.test/{}", port)
        }
    }

    #[test]
    fn builds_url() {
        assert_eq!(
            dev_server_url(Protocol::Https, "devbox", 5173),
            "https://devbox:5173"
        );
    }

    #[test]
    fn brackets_ipv6() {
        assert_eq!(dev_server_url(Protocol::Http, "::1", 3000), "http://[::1]:3000");
        assert_eq!(dev_server_url(Protocol::Http, "[::1]", 3000), "http://[::1]:3000");
    }

    #[test]
    fn defaults_to_primary_port() {
        assert_eq!(
            resolve_dev_server_url(&settings(), None, &NoOverrides),
            "http://localhost:3000"
        );
        assert_eq!(
            resolve_dev_server_url(&settings(), Some(3001), &NoOverrides),
            "http://localhost:3001"
        );
    }

    #[test]
    fn override_hook_sees_detected_port() {
        assert_eq!(
            resolve_dev_server_url(&settings(), Some(3001), &Proxy),
            "https://vite.example.test/3001"
        );
    }
}
