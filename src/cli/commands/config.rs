//! Config command implementation.
//!
//! `assetgate config` shows the resolved settings and where each
//! dev server and environment value came from.

use serde_json::json;

use crate::cache::format_duration;
use crate::cli::args::ConfigArgs;
use crate::config::{ConfigPaths, Settings};
use crate::error::Result;
use crate::ui::{Table, UserInterface};

use super::classify::to_json;
use super::dispatcher::{Command, CommandContext, CommandResult};

/// The config command implementation.
pub struct ConfigCommand {
    ctx: CommandContext,
    args: ConfigArgs,
}

impl ConfigCommand {
    pub fn new(ctx: CommandContext, args: ConfigArgs) -> Self {
        Self { ctx, args }
    }
}

/// Display value of a tracked setting.
fn tracked_value(settings: &Settings, name: &str) -> String {
    let dev = &settings.dev_server;
    let env = &settings.environment;
    match name {
        "environment.debug" => env.debug.to_string(),
        "environment.local_dev" => env.local_dev.to_string(),
        "environment.environment_type" => env
            .environment_type
            .clone()
            .unwrap_or_else(|| "(not set)".to_string()),
        "dev_server.host" => dev.host.clone(),
        "dev_server.port" => dev.port.to_string(),
        "dev_server.protocol" => dev.protocol.to_string(),
        "dev_server.port_range" => dev
            .port_range
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

fn paths(settings: &Settings) -> Vec<(&'static str, String)> {
    vec![
        ("theme_root", settings.theme_root.display().to_string()),
        ("manifest_path", settings.manifest_path.display().to_string()),
        ("dist_uri", settings.dist_uri.clone()),
        (
            "asset_version",
            settings.asset_version.clone().unwrap_or_else(|| "(not set)".to_string()),
        ),
        ("cache_dir", settings.cache_dir.display().to_string()),
    ]
}

fn ttls(settings: &Settings) -> Vec<(&'static str, String)> {
    let t = &settings.ttls;
    vec![
        ("dns", format_duration(t.dns)),
        ("probe", format_duration(t.probe)),
        ("probe_negative", format_duration(t.probe_negative)),
        ("manifest", format_duration(t.manifest)),
        ("manifest_debug", format_duration(t.manifest_debug)),
        ("missing", format_duration(t.missing)),
    ]
}

impl Command for ConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.ctx.settings()?;

        if self.args.json {
            let tracked: serde_json::Map<String, serde_json::Value> = settings
                .sources()
                .map(|(name, source)| {
                    (
                        name.to_string(),
                        json!({ "value": tracked_value(&settings, name), "source": source }),
                    )
                })
                .collect();
            let path_values: serde_json::Map<String, serde_json::Value> = paths(&settings)
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect();
            let ttl_values: serde_json::Map<String, serde_json::Value> = ttls(&settings)
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect();
            let output = json!({
                "settings": tracked,
                "paths": path_values,
                "ttls": ttl_values,
                "entries": settings.entries,
            });
            ui.output(&to_json(&output)?);
            return Ok(CommandResult::success());
        }

        let config_files = ConfigPaths::discover(self.ctx.project_root());
        for path in config_files.all_existing() {
            ui.message(&format!("# {}", path.display()));
        }

        let mut table = Table::new(&["Setting", "Value", "Source"]);
        for (name, source) in settings.sources() {
            table.add_row([
                name.to_string(),
                tracked_value(&settings, name),
                source.to_string(),
            ]);
        }
        ui.output(&table.render());

        ui.show_header("Paths");
        for (key, value) in paths(&settings) {
            ui.key_value(key, &value);
        }
        ui.show_header("Cache TTLs");
        for (key, value) in ttls(&settings) {
            ui.key_value(key, &value);
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn project(config: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".assetgate")).unwrap();
        fs::write(temp.path().join(".assetgate/config.yml"), config).unwrap();
        temp
    }

    #[test]
    fn table_shows_sources() {
        let temp = project("dev_server:\n  port_range: [5173]\n");
        let ctx = CommandContext::new(temp.path());
        let mut ui = MockUI::new();
        ConfigCommand::new(ctx, ConfigArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(ui.messages()[0].contains("config.yml"));
        let table = &ui.outputs()[0];
        assert!(table.contains("dev_server.port_range"));
        assert!(table.contains("config file"));
        assert_eq!(ui.value_of("dns"), Some("1h"));
    }

    #[test]
    fn json_lists_values_and_sources() {
        let temp = project("dev_server:\n  host: vite.internal\n");
        let ctx = CommandContext::new(temp.path());
        let mut ui = MockUI::new();
        ConfigCommand::new(ctx, ConfigArgs { json: true })
            .execute(&mut ui)
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&ui.outputs()[0]).unwrap();
        let host = &value["settings"]["dev_server.host"];
        assert_eq!(host["value"], "vite.internal");
        assert_eq!(host["source"], "config_file");
        assert_eq!(value["entries"]["script"], "src/js/main.js");
    }
}
