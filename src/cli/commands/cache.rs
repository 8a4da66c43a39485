//! Cache command implementation.
//!
//! Provides `assetgate cache list`, `assetgate cache clear` and
//! `assetgate cache stats` for the persistent resolution cache.

use clap::{Args, Subcommand};

use crate::cache::{default_cache_dir, format_duration, CacheStore};
use crate::error::Result;
use crate::ui::{Table, UserInterface};

use super::classify::to_json;
use super::dispatcher::{Command, CommandContext, CommandResult};

/// Arguments for the cache command.
#[derive(Debug, Clone, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

/// Cache subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CacheSubcommand {
    /// List cached entries.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Clear the cache.
    Clear {
        /// Only clear expired entries.
        #[arg(long)]
        expired: bool,
    },
    /// Show cache statistics.
    Stats,
}

/// The cache command implementation.
pub struct CacheCommand {
    ctx: CommandContext,
    args: CacheArgs,
}

impl CacheCommand {
    pub fn new(ctx: CommandContext, args: CacheArgs) -> Self {
        Self { ctx, args }
    }

    fn store(&self) -> CacheStore {
        // A broken config should not stop anyone from clearing the cache
        let dir = match self.ctx.settings() {
            Ok(settings) => settings.cache_dir,
            Err(e) => {
                tracing::debug!("Using default cache directory: {}", e);
                default_cache_dir(self.ctx.project_root())
            }
        };
        CacheStore::persistent(dir)
    }
}

impl Command for CacheCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut store = self.store();

        match &self.args.command {
            CacheSubcommand::List { json } => list_cache(&store, *json, ui)?,
            CacheSubcommand::Clear { expired } => clear_cache(&mut store, *expired, ui)?,
            CacheSubcommand::Stats => show_stats(&store, ui)?,
        }

        Ok(CommandResult::success())
    }
}

fn list_cache(store: &CacheStore, json: bool, ui: &mut dyn UserInterface) -> Result<()> {
    let entries = store.list()?;

    if json {
        ui.output(&to_json(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        ui.message("Cache is empty");
        return Ok(());
    }

    let mut table = Table::new(&["Key", "Status", "TTL", "Size"]);
    for entry in &entries {
        let (status, ttl) = if entry.is_expired() {
            ("expired", "-".to_string())
        } else {
            let remaining = chrono::Duration::seconds(entry.metadata.remaining_ttl());
            ("fresh", format_duration(remaining))
        };
        table.add_row([
            entry.key.clone(),
            status.to_string(),
            ttl,
            format!("{} B", entry.metadata.size_bytes),
        ]);
    }
    ui.message(&format!("{} cached entries", entries.len()));
    ui.output(&table.render());

    Ok(())
}

fn clear_cache(store: &mut CacheStore, expired_only: bool, ui: &mut dyn UserInterface) -> Result<()> {
    if expired_only {
        let removed = store.cleanup_expired()?;
        ui.success(&format!("Cleared {} expired entries", removed));
        return Ok(());
    }

    let cleared = store.clear()?;
    if cleared == 0 {
        ui.message("Cache is already empty");
    } else {
        ui.success(&format!("Cleared {} entries", cleared));
    }
    Ok(())
}

fn show_stats(store: &CacheStore, ui: &mut dyn UserInterface) -> Result<()> {
    let entries = store.list()?;
    let expired = entries.iter().filter(|e| e.is_expired()).count();

    ui.show_header("Cache statistics");
    ui.key_value("Total entries", &entries.len().to_string());
    ui.key_value("Fresh", &(entries.len() - expired).to_string());
    ui.key_value("Expired", &expired.to_string());
    ui.key_value("Total size", &format!("{} bytes", store.total_size()?));
    if let Some(root) = store.root() {
        ui.key_value("Location", &root.display().to_string());
    }

    Ok(())
}
