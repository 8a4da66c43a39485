//! Request environment classification.
//!
//! Decides whether a request should be served in development mode, from
//! the environment flags and the request's host names. See
//! [`EnvironmentClassifier`] for the rule order.

pub mod classifier;
pub mod dns;
pub mod host;

pub use classifier::{
    Classification, EnvironmentClassifier, EnvironmentFlags, Mode, OverrideHook, Reason,
    RequestContext,
};
pub use dns::{cached_lookup, dns_cache_key, HostResolver, StaticResolver, SystemResolver};
pub use host::normalize_host;
