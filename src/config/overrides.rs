//! Injectable override hooks for dev server settings.
//!
//! A host application implements [`SettingsOverride`] to adjust the dev
//! server host, port, protocol, port range or final URL. Each method
//! receives the value resolved so far and returns the value to use. An
//! environment constant, when set, still wins over the hook.
//!
//! # Example
//!
//! ```
//! use assetgate::config::SettingsOverride;
//!
//! struct DockerHost;
//!
//! impl SettingsOverride for DockerHost {
//!     fn dev_server_host(&self, _host: String) -> String {
//!         "host.docker.internal".to_string()
//!     }
//! }
//!
//! assert_eq!(DockerHost.dev_server_host("localhost".into()), "host.docker.internal");
//! assert_eq!(DockerHost.dev_server_port(3000), 3000);
//! ```

use super::schema::Protocol;

/// Hooks applied while resolving dev server settings.
pub trait SettingsOverride {
    /// Adjust the dev server host.
    fn dev_server_host(&self, host: String) -> String {
        host
    }

    /// Adjust the primary dev server port.
    fn dev_server_port(&self, port: u16) -> u16 {
        port
    }

    /// Adjust the dev server protocol.
    fn dev_server_protocol(&self, protocol: Protocol) -> Protocol {
        protocol
    }

    /// Adjust the probed port range.
    fn dev_server_port_range(&self, ports: Vec<u16>) -> Vec<u16> {
        ports
    }

    /// Adjust the final dev server URL built for `port`.
    fn dev_server_url(&self, url: String, _port: u16) -> String {
        url
    }
}

/// No-op hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl SettingsOverride for NoOverrides {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_overrides_passes_values_through() {
        let hooks = NoOverrides;
        assert_eq!(hooks.dev_server_host("localhost".into()), "localhost");
        assert_eq!(hooks.dev_server_port(3000), 3000);
        assert_eq!(hooks.dev_server_protocol(Protocol::Https), Protocol::Https);
        assert_eq!(hooks.dev_server_port_range(vec![1, 2]), vec![1, 2]);
        assert_eq!(
            hooks.dev_server_url("http://localhost:3000".into(), 3000),
            "http://localhost:3000"
        );
    }
}
