//! Manifest command implementation.
//!
//! `assetgate manifest` loads the build manifest the way the page path does
//! and lists its entries.

use crate::cli::args::ManifestArgs;
use crate::error::Result;
use crate::manifest::{is_safe_file, ManifestLoader};
use crate::ui::{Table, UserInterface};

use super::classify::to_json;
use super::dispatcher::{Command, CommandContext, CommandResult};

/// The manifest command implementation.
pub struct ManifestCommand {
    ctx: CommandContext,
    args: ManifestArgs,
}

impl ManifestCommand {
    pub fn new(ctx: CommandContext, args: ManifestArgs) -> Self {
        Self { ctx, args }
    }
}

impl Command for ManifestCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.ctx.settings()?;
        let mut cache = self.ctx.open_cache(&settings);
        let loader = ManifestLoader::from_settings(&settings);

        let manifest = match loader.load(&mut cache) {
            Ok(manifest) => manifest,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
        };

        if self.args.json {
            ui.output(&to_json(&manifest)?);
            return Ok(CommandResult::success());
        }

        ui.message(&format!(
            "{} entries in {}",
            manifest.len(),
            loader.manifest_path().display()
        ));

        let mut table = Table::new(&["Entry", "File", "CSS", ""]);
        for (name, entry) in manifest.entries() {
            let file = entry.file.as_deref().unwrap_or("-");
            let css = entry
                .css
                .as_ref()
                .map(|css| css.join(", "))
                .unwrap_or_default();
            let flag = match entry.file.as_deref() {
                Some(file) if !is_safe_file(file) => "rejected",
                _ if entry.is_entry => "entry",
                _ => "",
            };
            table.add_row([name, file, css.as_str(), flag]);
        }
        ui.output(&table.render());

        Ok(CommandResult::success())
    }
}
