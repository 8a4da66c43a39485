//! Command dispatching.
//!
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandContext`] for the settings and cache every command shares
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cache::CacheStore;
use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, NoOverrides, Settings};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Success or exit code 1.
    pub fn from_bool(ok: bool) -> Self {
        if ok {
            Self::success()
        } else {
            Self::failure(1)
        }
    }
}

/// Where a command finds its configuration and cache.
#[derive(Debug, Clone)]
pub struct CommandContext {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    no_cache: bool,
}

impl CommandContext {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            config_path: None,
            no_cache: false,
        }
    }

    /// Load this file instead of discovering config files.
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Keep the cache in memory.
    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Load config and resolve settings against the process environment.
    pub fn settings(&self) -> Result<Settings> {
        let config = load_config(&self.project_root, self.config_path.as_deref())?;
        Settings::from_env(&config, &self.project_root, &NoOverrides)
    }

    /// The cache for this invocation.
    pub fn open_cache(&self, settings: &Settings) -> CacheStore {
        if self.no_cache {
            CacheStore::in_memory()
        } else {
            CacheStore::persistent(&settings.cache_dir)
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    context: CommandContext,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given context.
    pub fn new(context: CommandContext) -> Self {
        Self { context }
    }

    /// Build the context from the global CLI flags.
    pub fn from_cli(cli: &Cli, project_root: PathBuf) -> Self {
        Self::new(
            CommandContext::new(project_root)
                .with_config_path(cli.config.clone())
                .with_no_cache(cli.no_cache),
        )
    }

    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    /// Route the CLI subcommand to its implementation and execute it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = self.context.clone();
        match &cli.command {
            Commands::Classify(args) => {
                super::classify::ClassifyCommand::new(ctx, args.clone()).execute(ui)
            }
            Commands::Probe(args) => super::probe::ProbeCommand::new(ctx, args.clone()).execute(ui),
            Commands::Resolve(args) => {
                super::resolve::ResolveCommand::new(ctx, args.clone()).execute(ui)
            }
            Commands::Manifest(args) => {
                super::manifest::ManifestCommand::new(ctx, args.clone()).execute(ui)
            }
            Commands::Verify(args) => {
                super::verify::VerifyCommand::new(ctx, args.clone()).execute(ui)
            }
            Commands::Plan(args) => super::plan::PlanCommand::new(ctx, args.clone()).execute(ui),
            Commands::Config(args) => {
                super::config::ConfigCommand::new(ctx, args.clone()).execute(ui)
            }
            Commands::Cache(args) => super::cache::CacheCommand::new(ctx, args.clone()).execute(ui),
            Commands::Completions(args) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
        }
    }
}
