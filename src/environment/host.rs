//! Host header normalization and local-host patterns.

use regex::Regex;
use std::net::Ipv6Addr;
use std::sync::LazyLock;

/// Names that always mean "this machine".
pub const LOOPBACK_NAMES: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

/// Top-level domains reserved for local development.
pub const LOCAL_TLDS: [&str; 5] = [".local", ".test", ".dev", ".localhost", ".invalid"];

static BRACKETED_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(.+)\](?::\d+)?$").unwrap());

static TRAILING_PORT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":\d+$").unwrap());

// 192.168.x.x, 10.x.x.x, 172.16.x.x - 172.31.x.x
static PRIVATE_IPV4_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(192\.168\.|10\.|172\.(1[6-9]|2[0-9]|3[01])\.)").unwrap());

/// Strip the port from a `Host` header value.
///
/// - `[::1]:8080` and `[::1]` become `[::1]` when the bracket contents are
///   a valid IPv6 address
/// - a malformed bracketed value falls back to plain port stripping
/// - a bare IPv6 address is returned unchanged
/// - `localhost:8080` becomes `localhost`
pub fn normalize_host(http_host: &str) -> String {
    if http_host.is_empty() {
        return String::new();
    }

    if let Some(caps) = BRACKETED_HOST.captures(http_host) {
        let inner = &caps[1];
        if inner.parse::<Ipv6Addr>().is_ok() {
            return format!("[{}]", inner);
        }
        return strip_port(http_host);
    }

    if http_host.parse::<Ipv6Addr>().is_ok() {
        return http_host.to_string();
    }

    strip_port(http_host)
}

fn strip_port(host: &str) -> String {
    TRAILING_PORT.replace(host, "").into_owned()
}

/// `localhost`, `127.0.0.1` or `::1`.
pub fn is_loopback_name(host: &str) -> bool {
    LOOPBACK_NAMES.contains(&host)
}

/// The local TLD `host` ends with, if any.
pub fn local_tld(host: &str) -> Option<&'static str> {
    LOCAL_TLDS.iter().copied().find(|tld| host.ends_with(tld))
}

/// Whether `host` starts like an RFC 1918 IPv4 address.
///
/// Only the prefix is checked, so `10.example.com` matches too.
pub fn is_private_ipv4_prefix(host: &str) -> bool {
    PRIVATE_IPV4_PREFIX.is_match(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_port_from_domain() {
        assert_eq!(normalize_host("wplayground:8080"), "wplayground");
        assert_eq!(normalize_host("localhost"), "localhost");
        assert_eq!(normalize_host("192.168.1.20:80"), "192.168.1.20");
    }

    #[test]
    fn keeps_bracketed_ipv6() {
        assert_eq!(normalize_host("[::1]:8080"), "[::1]");
        assert_eq!(normalize_host("[::1]"), "[::1]");
        assert_eq!(normalize_host("[fe80::1]:3000"), "[fe80::1]");
    }

    #[test]
    fn malformed_brackets_fall_back_to_port_stripping() {
        assert_eq!(normalize_host("[not-an-ip]:8080"), "[not-an-ip]");
        assert_eq!(normalize_host("[zz::zz]"), "[zz::zz]");
    }

    #[test]
    fn bare_ipv6_is_untouched() {
        assert_eq!(normalize_host("::1"), "::1");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(normalize_host(""), "");
    }

    #[test]
    fn loopback_names() {
        for name in ["localhost", "127.0.0.1", "::1"] {
            assert!(is_loopback_name(name));
        }
        assert!(!is_loopback_name("[::1]"));
        assert!(!is_loopback_name("localhost.example.com"));
    }

    #[test]
    fn local_tlds_match() {
        assert_eq!(local_tld("myapp.local"), Some(".local"));
        assert_eq!(local_tld("shop.test"), Some(".test"));
        assert_eq!(local_tld("site.dev"), Some(".dev"));
        assert_eq!(local_tld("app.localhost"), Some(".localhost"));
        assert_eq!(local_tld("x.invalid"), Some(".invalid"));
        assert_eq!(local_tld("example.com"), None);
        assert_eq!(local_tld("localdev"), None);
    }

    #[test]
    fn private_ranges() {
        assert!(is_private_ipv4_prefix("192.168.0.1"));
        assert!(is_private_ipv4_prefix("10.0.0.5"));
        assert!(is_private_ipv4_prefix("172.16.0.1"));
        assert!(is_private_ipv4_prefix("172.20.0.1"));
        assert!(is_private_ipv4_prefix("172.31.255.255"));
        assert!(!is_private_ipv4_prefix("172.15.0.1"));
        assert!(!is_private_ipv4_prefix("172.32.0.1"));
        assert!(!is_private_ipv4_prefix("193.168.0.1"));
        assert!(!is_private_ipv4_prefix("100.64.0.1"));
    }
}
