//! Command-line interface.
//!
//! - [`args`] - Argument definitions using clap's derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    ClassifyArgs, Cli, Commands, CompletionsArgs, ConfigArgs, ManifestArgs, PlanArgs, ProbeArgs,
    RequestArgs, ResolveArgs, VerifyArgs,
};
pub use commands::{Command, CommandContext, CommandDispatcher, CommandResult};
