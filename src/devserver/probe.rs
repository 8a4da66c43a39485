//! Dev server port probing.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::net::{TcpStream, ToSocketAddrs};

use crate::cache::{sanitize_key, CacheStore};
use crate::config::Settings;

/// Opens a connection to check that something is listening.
pub trait Connector {
    /// Connect to `host:port` within `timeout`, then close immediately.
    fn connect(&self, host: &str, port: u16, timeout: std::time::Duration) -> io::Result<()>;
}

/// Plain TCP connector.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    fn connect(&self, host: &str, port: u16, timeout: std::time::Duration) -> io::Result<()> {
        // `[::1]` is URL syntax; the resolver wants the bare address
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        let mut last_err = None;
        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    drop(stream);
                    return Ok(());
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} has no addresses", host))
        }))
    }
}

/// First port in `ports` that accepts a connection.
pub fn active_dev_server_port(
    connector: &dyn Connector,
    host: &str,
    ports: &[u16],
    timeout: std::time::Duration,
) -> Option<u16> {
    ports.iter().copied().find(|&port| {
        match connector.connect(host, port, timeout) {
            Ok(()) => {
                tracing::debug!("Dev server answered on {}:{}", host, port);
                true
            }
            Err(e) => {
                tracing::trace!("No dev server on {}:{}: {}", host, port, e);
                false
            }
        }
    })
}

/// Outcome of a dev server probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProbeResult {
    /// A server answered on `port`.
    Active { port: u16 },
    /// No port answered.
    Inactive,
    /// Not probed yet.
    Unknown,
}

impl ProbeResult {
    pub fn port(&self) -> Option<u16> {
        match self {
            Self::Active { port } => Some(*port),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active { port } => write!(f, "active on port {}", port),
            Self::Inactive => write!(f, "not running"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Cached dev server detection.
///
/// A found server is remembered for the positive TTL (5 minutes by
/// default); a miss only for the negative TTL (1 minute) so a freshly
/// started server is noticed quickly.
pub struct DevServerProbe<'a> {
    connector: &'a dyn Connector,
    host: String,
    ports: Vec<u16>,
    timeout: std::time::Duration,
    positive_ttl: Duration,
    negative_ttl: Duration,
}

impl<'a> DevServerProbe<'a> {
    pub fn new(connector: &'a dyn Connector, host: impl Into<String>, ports: Vec<u16>) -> Self {
        Self {
            connector,
            host: host.into(),
            ports,
            timeout: std::time::Duration::from_secs(1),
            positive_ttl: Duration::minutes(5),
            negative_ttl: Duration::minutes(1),
        }
    }

    pub fn from_settings(settings: &Settings, connector: &'a dyn Connector) -> Self {
        Self::new(
            connector,
            settings.dev_server.host.clone(),
            settings.dev_server.port_range.clone(),
        )
        .with_timeout(settings.dev_server.timeout)
        .with_ttls(settings.ttls.probe, settings.ttls.probe_negative)
    }

    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_ttls(mut self, positive: Duration, negative: Duration) -> Self {
        self.positive_ttl = positive;
        self.negative_ttl = negative;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    /// Cache key for this host and port list.
    pub fn cache_key(&self) -> String {
        let ports: Vec<String> = self.ports.iter().map(u16::to_string).collect();
        format!("devserver:{}:{}", sanitize_key(&self.host), ports.join("_"))
    }

    /// The cached outcome, without probing.
    pub fn cached(&self, cache: &mut CacheStore) -> ProbeResult {
        cache
            .get::<ProbeResult>(&self.cache_key())
            .unwrap_or(ProbeResult::Unknown)
    }

    /// Find the active dev server, using the cache when possible.
    pub fn probe(&self, cache: &mut CacheStore) -> ProbeResult {
        match self.cached(cache) {
            ProbeResult::Unknown => {}
            cached => {
                tracing::trace!("Dev server probe cache hit: {}", cached);
                return cached;
            }
        }

        let result = match active_dev_server_port(self.connector, &self.host, &self.ports, self.timeout)
        {
            Some(port) => ProbeResult::Active { port },
            None => ProbeResult::Inactive,
        };
        let ttl = if result.is_active() {
            self.positive_ttl
        } else {
            self.negative_ttl
        };

        if let Err(e) = cache.set(&self.cache_key(), &result, ttl) {
            tracing::warn!("Failed to cache dev server probe: {}", e);
        }
        result
    }

    /// Probe every port without the cache, for diagnostics.
    pub fn port_statuses(&self) -> Vec<(u16, bool)> {
        self.ports
            .iter()
            .map(|&port| {
                let open = self.connector.connect(&self.host, port, self.timeout).is_ok();
                (port, open)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::net::TcpListener;

    /// Answers on a fixed set of ports and records every attempt.
    struct FakeConnector {
        open: Vec<u16>,
        attempts: RefCell<Vec<u16>>,
    }

    impl FakeConnector {
        fn new(open: &[u16]) -> Self {
            Self {
                open: open.to_vec(),
                attempts: RefCell::new(Vec::new()),
            }
        }

        fn attempts(&self) -> Vec<u16> {
            self.attempts.borrow().clone()
        }
    }

    impl Connector for FakeConnector {
        fn connect(&self, _host: &str, port: u16, _timeout: std::time::Duration) -> io::Result<()> {
            self.attempts.borrow_mut().push(port);
            if self.open.contains(&port) {
                Ok(())
            } else {
                Err(io::Error::from(io::ErrorKind::ConnectionRefused))
            }
        }
    }

    const RANGE: [u16; 6] = [3000, 3001, 3002, 3003, 3004, 3005];

    #[test]
    fn finds_first_open_port_in_order() {
        let connector = FakeConnector::new(&[3002, 3004]);
        let port = active_dev_server_port(
            &connector,
            "localhost",
            &RANGE,
            std::time::Duration::from_secs(1),
        );
        assert_eq!(port, Some(3002));
        assert_eq!(connector.attempts(), vec![3000, 3001, 3002]);
    }

    #[test]
    fn no_open_port_is_none() {
        let connector = FakeConnector::new(&[]);
        let port = active_dev_server_port(
            &connector,
            "localhost",
            &RANGE,
            std::time::Duration::from_secs(1),
        );
        assert_eq!(port, None);
        assert_eq!(connector.attempts().len(), 6);
    }

    #[test]
    fn positive_result_is_cached() {
        let connector = FakeConnector::new(&[3001]);
        let probe = DevServerProbe::new(&connector, "localhost", RANGE.to_vec());
        let mut cache = CacheStore::in_memory();

        assert_eq!(probe.probe(&mut cache), ProbeResult::Active { port: 3001 });
        assert_eq!(probe.probe(&mut cache), ProbeResult::Active { port: 3001 });
        assert_eq!(connector.attempts(), vec![3000, 3001]);
    }

    #[test]
    fn negative_result_is_cached_without_reprobing() {
        let connector = FakeConnector::new(&[]);
        let probe = DevServerProbe::new(&connector, "localhost", RANGE.to_vec());
        let mut cache = CacheStore::in_memory();

        assert_eq!(probe.probe(&mut cache), ProbeResult::Inactive);
        assert_eq!(probe.probe(&mut cache), ProbeResult::Inactive);
        assert_eq!(connector.attempts().len(), 6);
    }

    #[test]
    fn expired_negative_result_probes_again() {
        let connector = FakeConnector::new(&[]);
        let probe = DevServerProbe::new(&connector, "localhost", vec![3000])
            .with_ttls(Duration::minutes(5), Duration::zero());
        let mut cache = CacheStore::in_memory();

        probe.probe(&mut cache);
        probe.probe(&mut cache);
        assert_eq!(connector.attempts(), vec![3000, 3000]);
    }

    #[test]
    fn cached_is_unknown_before_probing() {
        let connector = FakeConnector::new(&[3000]);
        let probe = DevServerProbe::new(&connector, "localhost", vec![3000]);
        let mut cache = CacheStore::in_memory();

        assert_eq!(probe.cached(&mut cache), ProbeResult::Unknown);
        probe.probe(&mut cache);
        assert_eq!(probe.cached(&mut cache).port(), Some(3000));
    }

    #[test]
    fn cache_key_includes_host_and_ports() {
        let connector = FakeConnector::new(&[]);
        let probe = DevServerProbe::new(&connector, "host.docker.internal", vec![5173, 5174]);
        assert_eq!(probe.cache_key(), "devserver:host_docker_internal:5173_5174");
    }

    #[test]
    fn port_statuses_reports_every_port() {
        let connector = FakeConnector::new(&[3001]);
        let probe = DevServerProbe::new(&connector, "localhost", vec![3000, 3001]);
        assert_eq!(probe.port_statuses(), vec![(3000, false), (3001, true)]);
    }

    #[test]
    fn probe_result_serializes_with_status_tag() {
        let json = serde_json::to_string(&ProbeResult::Active { port: 3000 }).unwrap();
        assert_eq!(json, r#"{"status":"active","port":3000}"#);
        let back: ProbeResult = serde_json::from_str(r#"{"status":"inactive"}"#).unwrap();
        assert_eq!(back, ProbeResult::Inactive);
    }

    #[test]
    fn tcp_connector_finds_real_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let open_port = listener.local_addr().unwrap().port();

        let closed_port = {
            let temp = TcpListener::bind("127.0.0.1:0").unwrap();
            temp.local_addr().unwrap().port()
        };

        let port = active_dev_server_port(
            &TcpConnector,
            "127.0.0.1",
            &[closed_port, open_port],
            std::time::Duration::from_millis(500),
        );
        assert_eq!(port, Some(open_port));
    }

    #[test]
    fn tcp_connector_accepts_bracketed_ipv6_host() {
        // Hosts without IPv6 loopback have nothing to connect to
        let Ok(listener) = TcpListener::bind("[::1]:0") else {
            return;
        };
        let port = listener.local_addr().unwrap().port();

        let timeout = std::time::Duration::from_millis(500);
        assert!(TcpConnector.connect("[::1]", port, timeout).is_ok());
        assert!(TcpConnector.connect("::1", port, timeout).is_ok());
    }
}
