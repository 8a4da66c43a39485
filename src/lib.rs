//! assetgate - Dev/production environment detection and Vite manifest
//! asset resolution for server-rendered themes.
//!
//! A page that loads Vite-built assets has to decide, per request, whether
//! to point at a running dev server (hot module replacement) or at the
//! hashed files of the last build. assetgate makes that decision and
//! resolves the build outputs safely.
//!
//! # Modules
//!
//! - [`assets`] - Script and style tag planning for a page
//! - [`cache`] - Time-boxed cache for manifests, DNS answers and probes
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, overrides and resolved settings
//! - [`devserver`] - Dev server port probing and URL construction
//! - [`environment`] - Development/production request classification
//! - [`error`] - Error types and result aliases
//! - [`manifest`] - Manifest loading, asset resolution and build verification
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use assetgate::cache::CacheStore;
//! use assetgate::environment::{
//!     EnvironmentClassifier, EnvironmentFlags, Mode, RequestContext, StaticResolver,
//! };
//!
//! let resolver = StaticResolver::new();
//! let classifier = EnvironmentClassifier::new(EnvironmentFlags::default(), &resolver);
//! let mut cache = CacheStore::in_memory();
//!
//! let request = RequestContext::new().with_http_host("shop.test:8080");
//! assert_eq!(classifier.classify(&request, &mut cache).mode, Mode::Development);
//! ```

pub mod assets;
pub mod cache;
pub mod cli;
pub mod config;
pub mod devserver;
pub mod environment;
pub mod error;
pub mod manifest;
pub mod ui;

pub use error::{AssetGateError, Result};
