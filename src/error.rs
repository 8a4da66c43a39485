//! Error types for assetgate operations.
//!
//! This module defines [`AssetGateError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Loaders return `AssetGateError` so callers can tell a missing manifest
//!   from a malformed one
//! - Request-path entry points (`get_manifest`, `resolve_asset`,
//!   `is_dev_environment`, `probe`) log the error and return an absent value
//! - Use `anyhow::Error` (via `AssetGateError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for assetgate operations.
#[derive(Debug, Error)]
pub enum AssetGateError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Build manifest is absent or unreadable.
    #[error("Manifest not found or not readable: {path}")]
    ManifestMissing { path: PathBuf },

    /// Build manifest is not valid JSON, has the wrong shape, or contains
    /// traversal sequences.
    #[error("Invalid manifest at {path}: {message}")]
    ManifestInvalid { path: PathBuf, message: String },

    /// A configured path resolves outside the directory it must stay in.
    #[error("Path {path} resolves outside of {root}")]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    /// A logical asset name has no usable manifest entry.
    #[error("Asset '{name}' is not in the manifest")]
    AssetNotInManifest { name: String },

    /// An asset filename failed the allow-pattern.
    #[error("Asset '{name}' rejected: invalid filename '{file}'")]
    AssetRejected { name: String, file: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for assetgate operations.
pub type Result<T> = std::result::Result<T, AssetGateError>;
