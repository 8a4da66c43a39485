//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by
//! [`CommandDispatcher`]. Commands share a [`CommandContext`] that loads
//! settings and opens the cache the same way for all of them.

pub mod cache;
pub mod classify;
pub mod completions;
pub mod config;
pub mod dispatcher;
pub mod manifest;
pub mod plan;
pub mod probe;
pub mod resolve;
pub mod verify;

pub use dispatcher::{Command, CommandContext, CommandDispatcher, CommandResult};
