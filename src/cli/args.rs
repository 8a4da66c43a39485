//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use super::commands::cache::CacheArgs;

/// assetgate - Vite asset resolution and dev server detection for themes.
#[derive(Debug, Parser)]
#[command(name = "assetgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides .assetgate/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Keep cached results in memory only, for this invocation
    #[arg(long, global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify a request as development or production
    Classify(ClassifyArgs),

    /// Look for a running dev server
    Probe(ProbeArgs),

    /// Resolve a logical asset name to its built file
    Resolve(ResolveArgs),

    /// Show the build manifest
    Manifest(ManifestArgs),

    /// Verify the build manifest
    Verify(VerifyArgs),

    /// Show the tags a page would emit
    Plan(PlanArgs),

    /// Show resolved configuration
    Config(ConfigArgs),

    /// Manage the resolution cache
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Server variables of a simulated request.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RequestArgs {
    /// Server name, as configured in the web server
    #[arg(long, value_name = "NAME")]
    pub server_name: Option<String>,

    /// Host header, optionally with a port
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,
}

/// Arguments for the `classify` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Also show host normalization, DNS answers and dev server ports
    #[arg(long)]
    pub explain: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `probe` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ProbeArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `resolve` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ResolveArgs {
    /// Logical source path, e.g. src/js/main.js
    pub name: String,

    /// Print the public URL instead of the file name
    #[arg(long)]
    pub url: bool,
}

/// Arguments for the `manifest` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ManifestArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `verify` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct VerifyArgs {
    /// Also check that every referenced file exists in the dist directory
    #[arg(long)]
    pub strict: bool,

    /// Manifest to verify (overrides the configured path)
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Output the tags as HTML
    #[arg(long, conflicts_with = "json")]
    pub html: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
