//! Build manifest loading, asset resolution and verification.
//!
//! The manifest maps logical source paths (`src/js/main.js`) to the hashed
//! files a build produced (`assets/main.4f2a9c.js`). Loading checks that
//! the file stays inside the theme root and caches the decoded result;
//! resolution only hands out filenames of the form `name.hash.ext`.

pub mod entry;
pub mod loader;
pub mod parse;
pub mod resolve;
pub mod verify;

pub use entry::{Manifest, ManifestEntry};
pub use loader::ManifestLoader;
pub use parse::parse_manifest;
pub use resolve::{check_asset, is_safe_file, resolve_asset, resolve_stylesheets};
pub use verify::{ManifestVerifier, VerificationReport, VerifiedEntry, DEFAULT_REQUIRED};
