//! Resolve command implementation.
//!
//! `assetgate resolve <name>` prints the built file for a logical name.

use crate::assets::dist_url;
use crate::cli::args::ResolveArgs;
use crate::error::Result;
use crate::manifest::{check_asset, ManifestLoader};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The resolve command implementation.
pub struct ResolveCommand {
    ctx: CommandContext,
    args: ResolveArgs,
}

impl ResolveCommand {
    pub fn new(ctx: CommandContext, args: ResolveArgs) -> Self {
        Self { ctx, args }
    }
}

impl Command for ResolveCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.ctx.settings()?;
        let mut cache = self.ctx.open_cache(&settings);

        let manifest = match ManifestLoader::from_settings(&settings).load(&mut cache) {
            Ok(manifest) => manifest,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
        };

        match check_asset(&manifest, &self.args.name) {
            Ok(file) if self.args.url => {
                let url = dist_url(&settings.dist_uri, file, settings.asset_version.as_deref());
                ui.output(&url);
                Ok(CommandResult::success())
            }
            Ok(file) => {
                ui.output(file);
                Ok(CommandResult::success())
            }
            Err(e) => {
                ui.error(&e.to_string());
                Ok(CommandResult::failure(1))
            }
        }
    }
}
