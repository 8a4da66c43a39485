//! Development vs production classification.
//!
//! Rules are checked in a fixed order and the first match wins:
//!
//! 1. Debug flag
//! 2. Local development flag
//! 3. Environment type other than "production"
//! 4. Loopback host name
//! 5. Local-only TLD
//! 6. Private IPv4 prefix
//! 7. Host name that resolves to 127.0.0.1
//! 8. Override hook
//!
//! Anything else is production.

use chrono::Duration;
use serde::Serialize;
use std::fmt;

use super::dns::{cached_lookup, HostResolver};
use super::host::{is_loopback_name, is_private_ipv4_prefix, local_tld, normalize_host};
use crate::cache::CacheStore;
use crate::config::Settings;

/// Environment flags consulted before looking at the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnvironmentFlags {
    pub debug: bool,
    pub local_dev: bool,
    pub environment_type: Option<String>,
}

impl EnvironmentFlags {
    /// True when debugging or running outside production.
    pub fn is_debug_or_non_production(&self) -> bool {
        self.debug || self.is_non_production_type()
    }

    fn is_non_production_type(&self) -> bool {
        self.environment_type
            .as_deref()
            .is_some_and(|kind| kind != "production")
    }
}

/// Server variables of the incoming request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestContext {
    pub server_name: Option<String>,
    pub http_host: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    pub fn with_http_host(mut self, host: impl Into<String>) -> Self {
        self.http_host = Some(host.into());
        self
    }

    fn server_name(&self) -> &str {
        self.server_name.as_deref().unwrap_or("")
    }

    /// The `Host` header with any port removed.
    pub fn normalized_host(&self) -> String {
        normalize_host(self.http_host.as_deref().unwrap_or(""))
    }
}

/// Serving mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    Production,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// The rule that decided a classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "value", rename_all = "snake_case")]
pub enum Reason {
    DebugFlag,
    LocalDevFlag,
    EnvironmentType(String),
    LoopbackHost(String),
    LocalTld(String),
    PrivateAddress(String),
    ResolvesToLoopback(String),
    OverrideHook,
    NoLocalSignal,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DebugFlag => write!(f, "debug flag is set"),
            Self::LocalDevFlag => write!(f, "local development flag is set"),
            Self::EnvironmentType(kind) => write!(f, "environment type is '{}'", kind),
            Self::LoopbackHost(host) => write!(f, "'{}' is a loopback host", host),
            Self::LocalTld(host) => write!(f, "'{}' uses a local-only TLD", host),
            Self::PrivateAddress(host) => write!(f, "'{}' is a private network address", host),
            Self::ResolvesToLoopback(host) => write!(f, "'{}' resolves to 127.0.0.1", host),
            Self::OverrideHook => write!(f, "override hook returned true"),
            Self::NoLocalSignal => write!(f, "no local development signal"),
        }
    }
}

/// Outcome of classifying a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub mode: Mode,
    pub reason: Reason,
}

impl Classification {
    fn development(reason: Reason) -> Self {
        Self {
            mode: Mode::Development,
            reason,
        }
    }

    pub fn is_dev(&self) -> bool {
        self.mode == Mode::Development
    }
}

/// Final say for requests no built-in rule matched.
pub type OverrideHook = Box<dyn Fn(&RequestContext) -> bool>;

/// Decides whether a request is served in development mode.
///
/// # Example
///
/// ```
/// use assetgate::cache::CacheStore;
/// use assetgate::environment::{
///     EnvironmentClassifier, EnvironmentFlags, RequestContext, StaticResolver,
/// };
///
/// let resolver = StaticResolver::new();
/// let classifier = EnvironmentClassifier::new(EnvironmentFlags::default(), &resolver);
/// let mut cache = CacheStore::in_memory();
///
/// let request = RequestContext::new().with_http_host("shop.test:8080");
/// assert!(classifier.is_dev_environment(&request, &mut cache));
/// ```
pub struct EnvironmentClassifier<'a> {
    flags: EnvironmentFlags,
    resolver: &'a dyn HostResolver,
    dns_ttl: Duration,
    override_hook: Option<OverrideHook>,
}

impl<'a> EnvironmentClassifier<'a> {
    pub fn new(flags: EnvironmentFlags, resolver: &'a dyn HostResolver) -> Self {
        Self {
            flags,
            resolver,
            dns_ttl: Duration::hours(1),
            override_hook: None,
        }
    }

    /// Build a classifier from resolved settings.
    pub fn from_settings(settings: &Settings, resolver: &'a dyn HostResolver) -> Self {
        Self::new(settings.environment.clone(), resolver).with_dns_ttl(settings.ttls.dns)
    }

    pub fn with_dns_ttl(mut self, ttl: Duration) -> Self {
        self.dns_ttl = ttl;
        self
    }

    /// Consult `hook` when no built-in rule matches.
    pub fn with_override(mut self, hook: impl Fn(&RequestContext) -> bool + 'static) -> Self {
        self.override_hook = Some(Box::new(hook));
        self
    }

    /// Whether `request` should be served in development mode.
    pub fn is_dev_environment(&self, request: &RequestContext, cache: &mut CacheStore) -> bool {
        self.classify(request, cache).is_dev()
    }

    /// Classify `request` and report which rule decided it.
    pub fn classify(&self, request: &RequestContext, cache: &mut CacheStore) -> Classification {
        let classification = self.evaluate(request, cache);
        tracing::debug!(
            "Classified request as {} ({})",
            classification.mode,
            classification.reason
        );
        classification
    }

    fn evaluate(&self, request: &RequestContext, cache: &mut CacheStore) -> Classification {
        if self.flags.debug {
            return Classification::development(Reason::DebugFlag);
        }
        if self.flags.local_dev {
            return Classification::development(Reason::LocalDevFlag);
        }
        if let Some(kind) = self.flags.environment_type.as_deref() {
            if kind != "production" {
                return Classification::development(Reason::EnvironmentType(kind.to_string()));
            }
        }

        let server_name = request.server_name();
        let host = request.normalized_host();
        let candidates = [server_name, host.as_str()];

        if let Some(name) = candidates.iter().find(|c| is_loopback_name(c)) {
            return Classification::development(Reason::LoopbackHost(name.to_string()));
        }
        if let Some(name) = candidates.iter().find(|c| local_tld(c).is_some()) {
            return Classification::development(Reason::LocalTld(name.to_string()));
        }
        if let Some(name) = candidates.iter().find(|c| is_private_ipv4_prefix(c)) {
            return Classification::development(Reason::PrivateAddress(name.to_string()));
        }

        if is_lookup_candidate(server_name) && self.resolves_to_loopback(server_name, cache) {
            return Classification::development(Reason::ResolvesToLoopback(
                server_name.to_string(),
            ));
        }
        if is_lookup_candidate(&host)
            && host != server_name
            && self.resolves_to_loopback(&host, cache)
        {
            return Classification::development(Reason::ResolvesToLoopback(host));
        }

        if let Some(hook) = &self.override_hook {
            if hook(request) {
                return Classification::development(Reason::OverrideHook);
            }
        }

        Classification {
            mode: Mode::Production,
            reason: Reason::NoLocalSignal,
        }
    }

    fn resolves_to_loopback(&self, hostname: &str, cache: &mut CacheStore) -> bool {
        let resolved = cached_lookup(self.resolver, cache, hostname, self.dns_ttl);
        resolved != hostname && resolved == "127.0.0.1"
    }
}

// Empty values and anything with a colon (IPv6 literals) are never looked up.
fn is_lookup_candidate(hostname: &str) -> bool {
    !hostname.is_empty() && !hostname.contains(':')
}
