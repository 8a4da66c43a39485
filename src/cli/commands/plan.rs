//! Plan command implementation.
//!
//! `assetgate plan` shows the tags a page would emit for a simulated
//! request, either as a summary, as raw HTML or as JSON.

use crate::assets::{AssetPlan, AssetPlanner, AssetSource, Severity};
use crate::cli::args::PlanArgs;
use crate::config::NoOverrides;
use crate::devserver::{DevServerProbe, TcpConnector};
use crate::environment::{EnvironmentClassifier, SystemResolver};
use crate::error::Result;
use crate::ui::{Table, UserInterface};

use super::classify::to_json;
use super::dispatcher::{Command, CommandContext, CommandResult};

/// The plan command implementation.
pub struct PlanCommand {
    ctx: CommandContext,
    args: PlanArgs,
}

impl PlanCommand {
    pub fn new(ctx: CommandContext, args: PlanArgs) -> Self {
        Self { ctx, args }
    }
}

impl Command for PlanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.ctx.settings()?;
        let mut cache = self.ctx.open_cache(&settings);
        let resolver = SystemResolver;
        let connector = TcpConnector;

        let planner = AssetPlanner::new(
            &settings,
            EnvironmentClassifier::from_settings(&settings, &resolver),
            DevServerProbe::from_settings(&settings, &connector),
            &NoOverrides,
        );
        let plan = planner.plan(&self.args.request.to_request(), &mut cache);

        if self.args.json {
            ui.output(&to_json(&plan)?);
        } else if self.args.html {
            ui.output(&plan.render_html());
        } else {
            show_plan(&plan, ui);
        }

        // No tags means the page would render without its assets
        Ok(CommandResult::from_bool(plan.source != AssetSource::Unavailable))
    }
}

fn show_plan(plan: &AssetPlan, ui: &mut dyn UserInterface) {
    ui.show_header("Asset plan");
    ui.key_value("Mode", &plan.classification.mode.to_string());
    ui.key_value("Reason", &plan.classification.reason.to_string());
    let source = match &plan.source {
        AssetSource::DevServer { url } => format!("dev server ({})", url),
        AssetSource::Build => "build".to_string(),
        AssetSource::Unavailable => "unavailable".to_string(),
    };
    ui.key_value("Source", &source);

    if !plan.tags.is_empty() {
        let mut table = Table::new(&["Handle", "Type", "Placement", "URL"]);
        for tag in &plan.tags {
            table.add_row([
                tag.handle.clone(),
                format!("{:?}", tag.kind).to_lowercase(),
                format!("{:?}", tag.placement).to_lowercase(),
                tag.url.clone(),
            ]);
        }
        ui.output(&table.render());
    }

    for diagnostic in &plan.diagnostics {
        match diagnostic.severity {
            Severity::Info => ui.message(&diagnostic.message),
            Severity::Warning => ui.warning(&diagnostic.message),
            Severity::Error => ui.error(&diagnostic.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::RequestArgs;
    use crate::ui::MockUI;
    use std::fs;
    use std::net::TcpListener;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
        "src/js/main.js": {"file": "assets/main.4f2a.js", "css": ["assets/main.9c1e.css"]},
        "src/css/main.css": {"file": "assets/main.9c1e.css"}
    }"#;

    fn project(config: &str, manifest: Option<&str>) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".assetgate")).unwrap();
        fs::write(temp.path().join(".assetgate/config.yml"), config).unwrap();
        if let Some(manifest) = manifest {
            fs::create_dir_all(temp.path().join("dist/.vite")).unwrap();
            fs::write(temp.path().join("dist/.vite/manifest.json"), manifest).unwrap();
        }
        temp
    }

    fn run(temp: &TempDir, args: PlanArgs) -> (CommandResult, MockUI) {
        let ctx = CommandContext::new(temp.path()).with_no_cache(true);
        let mut ui = MockUI::new();
        let result = PlanCommand::new(ctx, args).execute(&mut ui).unwrap();
        (result, ui)
    }

    #[test]
    fn production_request_uses_build() {
        let temp = project("asset_version: \"1.2.0\"\n", Some(MANIFEST));
        let (result, ui) = run(&temp, PlanArgs::default());
        assert!(result.success);
        assert_eq!(ui.value_of("Mode"), Some("production"));
        assert_eq!(ui.value_of("Source"), Some("build"));
        assert!(ui.outputs()[0].contains("/dist/assets/main.4f2a.js?ver=1.2.0"));
    }

    #[test]
    fn html_output() {
        let temp = project("{}\n", Some(MANIFEST));
        let (_, ui) = run(
            &temp,
            PlanArgs {
                html: true,
                ..Default::default()
            },
        );
        let html = &ui.outputs()[0];
        assert!(html.contains(r#"<link rel="stylesheet" id="assetgate-main-css""#));
        assert!(html.contains(r#"src="/dist/assets/main.4f2a.js" defer"#));
    }

    #[test]
    fn missing_build_fails() {
        let temp = project("{}\n", None);
        let (result, ui) = run(&temp, PlanArgs::default());
        assert_eq!(result.exit_code, 1);
        assert_eq!(ui.value_of("Source"), Some("unavailable"));
        assert!(!ui.errors().is_empty());
    }

    #[test]
    fn local_request_uses_running_dev_server() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = format!(
            "dev_server:\n  host: 127.0.0.1\n  port: {port}\n  port_range: [{port}]\n"
        );
        let temp = project(&config, None);

        let (result, ui) = run(
            &temp,
            PlanArgs {
                request: RequestArgs {
                    server_name: None,
                    host: Some("shop.test".to_string()),
                },
                json: true,
                ..Default::default()
            },
        );
        assert!(result.success);
        let value: serde_json::Value = serde_json::from_str(&ui.outputs()[0]).unwrap();
        assert_eq!(value["source"]["source"], "dev_server");
        assert_eq!(
            value["tags"][0]["url"],
            format!("http://127.0.0.1:{}/@vite/client", port)
        );
    }
}
