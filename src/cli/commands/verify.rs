//! Verify command implementation.
//!
//! `assetgate verify` checks a freshly built manifest. One line per
//! failure; exits 1 if there were any.

use crate::cli::args::VerifyArgs;
use crate::config::Settings;
use crate::error::Result;
use crate::manifest::{ManifestVerifier, VerificationReport};
use crate::ui::UserInterface;

use super::classify::to_json;
use super::dispatcher::{Command, CommandContext, CommandResult};

/// The verify command implementation.
pub struct VerifyCommand {
    ctx: CommandContext,
    args: VerifyArgs,
}

impl VerifyCommand {
    pub fn new(ctx: CommandContext, args: VerifyArgs) -> Self {
        Self { ctx, args }
    }

    fn verifier(&self, settings: &Settings) -> ManifestVerifier {
        let required = if settings.verify.required.is_empty() {
            std::iter::once(settings.entries.script.clone())
                .chain(settings.entries.style.clone())
                .collect()
        } else {
            settings.verify.required.clone()
        };

        let verifier = ManifestVerifier::new(required);
        if self.args.strict {
            verifier.strict(settings.theme_root.join(&settings.verify.dist_dir))
        } else {
            verifier
        }
    }
}

impl Command for VerifyCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.ctx.settings()?;
        let manifest_path = match &self.args.manifest {
            Some(path) if path.is_relative() => self.ctx.project_root().join(path),
            Some(path) => path.clone(),
            None => settings.manifest_path.clone(),
        };

        tracing::debug!("Verifying {}", manifest_path.display());
        let report = self.verifier(&settings).verify(&manifest_path);

        if self.args.json {
            ui.output(&to_json(&report)?);
        } else {
            show_report(&report, ui);
        }

        Ok(CommandResult::from_bool(report.is_ok()))
    }
}

fn show_report(report: &VerificationReport, ui: &mut dyn UserInterface) {
    ui.message(&format!("Verifying {}", report.manifest_path.display()));

    for entry in &report.verified {
        ui.success(&entry.name);
        ui.detail(&format!("  → {}", entry.file));
    }
    for failure in &report.failures {
        ui.error(failure);
    }
    if report.files_checked > 0 {
        ui.message(&format!("Checked {} files on disk", report.files_checked));
    }

    if report.is_ok() {
        ui.success("All required assets are present in manifest!");
    } else {
        ui.error("Build verification failed");
    }
}
