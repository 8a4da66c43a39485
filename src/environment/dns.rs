//! Cached hostname resolution.
//!
//! Lookups go through a [`HostResolver`] so tests and embedding
//! applications can supply their own answers. Results, including failed
//! lookups, are cached per hostname.

use chrono::Duration;
use std::cell::Cell;
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};

use crate::cache::{sanitize_key, CacheStore};

/// Resolves a hostname to an IPv4 address.
pub trait HostResolver {
    /// First IPv4 address for `hostname`, or `None` if it does not resolve.
    fn resolve_ipv4(&self, hostname: &str) -> Option<Ipv4Addr>;
}

/// Resolver backed by the system's name service.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn resolve_ipv4(&self, hostname: &str) -> Option<Ipv4Addr> {
        let addrs = match (hostname, 0).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                tracing::debug!("Lookup of {} failed: {}", hostname, e);
                return None;
            }
        };

        addrs.into_iter().find_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(*v4.ip()),
            SocketAddr::V6(_) => None,
        })
    }
}

/// Resolver with a fixed table of answers.
///
/// Counts lookups, which lets callers check that the cache was used.
#[derive(Debug, Default)]
pub struct StaticResolver {
    answers: HashMap<String, Ipv4Addr>,
    lookups: Cell<usize>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an answer for `hostname`.
    pub fn with(mut self, hostname: &str, ip: Ipv4Addr) -> Self {
        self.answers.insert(hostname.to_string(), ip);
        self
    }

    /// Number of lookups performed so far.
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }
}

impl HostResolver for StaticResolver {
    fn resolve_ipv4(&self, hostname: &str) -> Option<Ipv4Addr> {
        self.lookups.set(self.lookups.get() + 1);
        self.answers.get(hostname).copied()
    }
}

/// Cache key for a hostname lookup.
pub fn dns_cache_key(hostname: &str) -> String {
    format!("dns:{}", sanitize_key(hostname))
}

/// Resolve `hostname`, consulting the cache first.
///
/// Returns the dotted IPv4 address, or `hostname` itself when the lookup
/// fails. Either answer is cached for `ttl`.
pub fn cached_lookup(
    resolver: &dyn HostResolver,
    cache: &mut CacheStore,
    hostname: &str,
    ttl: Duration,
) -> String {
    let key = dns_cache_key(hostname);
    if let Some(answer) = cache.get::<String>(&key) {
        tracing::trace!("DNS cache hit for {}: {}", hostname, answer);
        return answer;
    }

    let answer = resolver
        .resolve_ipv4(hostname)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| hostname.to_string());
    tracing::debug!("Resolved {} to {}", hostname, answer);

    if let Err(e) = cache.set(&key, &answer, ttl) {
        tracing::warn!("Failed to cache DNS answer for {}: {}", hostname, e);
    }
    answer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_sanitized() {
        assert_eq!(dns_cache_key("my-site.example.com"), "dns:my_site_example_com");
    }

    #[test]
    fn failed_lookup_returns_input() {
        let resolver = StaticResolver::new();
        let mut cache = CacheStore::in_memory();
        let answer = cached_lookup(&resolver, &mut cache, "nowhere.example", Duration::hours(1));
        assert_eq!(answer, "nowhere.example");
    }

    #[test]
    fn second_lookup_uses_cache() {
        let resolver = StaticResolver::new().with("wplayground", Ipv4Addr::LOCALHOST);
        let mut cache = CacheStore::in_memory();

        let first = cached_lookup(&resolver, &mut cache, "wplayground", Duration::hours(1));
        let second = cached_lookup(&resolver, &mut cache, "wplayground", Duration::hours(1));

        assert_eq!(first, "127.0.0.1");
        assert_eq!(second, "127.0.0.1");
        assert_eq!(resolver.lookups(), 1);
    }

    #[test]
    fn failures_are_cached_too() {
        let resolver = StaticResolver::new();
        let mut cache = CacheStore::in_memory();

        cached_lookup(&resolver, &mut cache, "unknown", Duration::hours(1));
        cached_lookup(&resolver, &mut cache, "unknown", Duration::hours(1));

        assert_eq!(resolver.lookups(), 1);
    }

    #[test]
    fn expired_answer_is_looked_up_again() {
        let resolver = StaticResolver::new().with("box", Ipv4Addr::new(10, 0, 0, 2));
        let mut cache = CacheStore::in_memory();

        cached_lookup(&resolver, &mut cache, "box", Duration::zero());
        cached_lookup(&resolver, &mut cache, "box", Duration::zero());

        assert_eq!(resolver.lookups(), 2);
    }

    #[test]
    fn system_resolver_handles_ip_literals() {
        let ip = SystemResolver.resolve_ipv4("127.0.0.1");
        assert_eq!(ip, Some(Ipv4Addr::LOCALHOST));
    }
}
