//! Classify command implementation.
//!
//! `assetgate classify` runs the environment classifier for a simulated
//! request. With `--explain` it also shows every input the decision
//! depends on, which is what you want when a site unexpectedly serves
//! production assets.

use serde::Serialize;

use crate::cache::CacheStore;
use crate::cli::args::{ClassifyArgs, RequestArgs};
use crate::config::{NoOverrides, Settings};
use crate::devserver::{resolve_dev_server_url, DevServerProbe, TcpConnector};
use crate::environment::{
    cached_lookup, Classification, EnvironmentClassifier, EnvironmentFlags, HostResolver,
    RequestContext, SystemResolver,
};
use crate::error::{AssetGateError, Result};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The classify command implementation.
pub struct ClassifyCommand {
    ctx: CommandContext,
    args: ClassifyArgs,
}

impl ClassifyCommand {
    pub fn new(ctx: CommandContext, args: ClassifyArgs) -> Self {
        Self { ctx, args }
    }
}

impl RequestArgs {
    /// The request these flags describe.
    pub fn to_request(&self) -> RequestContext {
        RequestContext {
            server_name: self.server_name.clone(),
            http_host: self.host.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DnsAnswer {
    hostname: String,
    resolved: String,
}

#[derive(Debug, Serialize)]
struct PortStatus {
    port: u16,
    open: bool,
}

/// Everything `--explain` reports.
#[derive(Debug, Serialize)]
struct Explanation {
    request: RequestContext,
    normalized_host: String,
    flags: EnvironmentFlags,
    dns: Vec<DnsAnswer>,
    dev_server_host: String,
    dev_server_ports: Vec<PortStatus>,
    dev_server_url: String,
    classification: Classification,
}

fn explain(
    settings: &Settings,
    resolver: &dyn HostResolver,
    request: &RequestContext,
    classification: Classification,
    cache: &mut CacheStore,
) -> Explanation {
    let normalized_host = request.normalized_host();

    let mut hostnames: Vec<String> = Vec::new();
    for name in [request.server_name.clone().unwrap_or_default(), normalized_host.clone()] {
        if !name.is_empty() && !name.contains(':') && !hostnames.contains(&name) {
            hostnames.push(name);
        }
    }
    let dns = hostnames
        .into_iter()
        .map(|hostname| {
            let resolved = cached_lookup(resolver, cache, &hostname, settings.ttls.dns);
            DnsAnswer { hostname, resolved }
        })
        .collect();

    let connector = TcpConnector;
    let probe = DevServerProbe::from_settings(settings, &connector);
    let dev_server_ports = probe
        .port_statuses()
        .into_iter()
        .map(|(port, open)| PortStatus { port, open })
        .collect();

    Explanation {
        request: request.clone(),
        normalized_host,
        flags: settings.environment.clone(),
        dns,
        dev_server_host: settings.dev_server.host.clone(),
        dev_server_ports,
        dev_server_url: resolve_dev_server_url(&settings.dev_server, None, &NoOverrides),
        classification,
    }
}

fn show_explanation(explanation: &Explanation, ui: &mut dyn UserInterface) {
    let or_unset = |value: &Option<String>| value.clone().unwrap_or_else(|| "(not set)".to_string());

    ui.show_header("Request");
    ui.key_value("Server name", &or_unset(&explanation.request.server_name));
    ui.key_value("Host header", &or_unset(&explanation.request.http_host));
    ui.key_value("Normalized host", &explanation.normalized_host);

    ui.show_header("Environment flags");
    ui.key_value("Debug", &explanation.flags.debug.to_string());
    ui.key_value("Local dev", &explanation.flags.local_dev.to_string());
    ui.key_value("Environment type", &or_unset(&explanation.flags.environment_type));

    ui.show_header("DNS");
    if explanation.dns.is_empty() {
        ui.message("  No host names to resolve");
    }
    for answer in &explanation.dns {
        ui.key_value(&answer.hostname, &answer.resolved);
    }

    ui.show_header("Dev server");
    ui.key_value("Host", &explanation.dev_server_host);
    ui.key_value("URL", &explanation.dev_server_url);
    for status in &explanation.dev_server_ports {
        let state = if status.open { "open" } else { "closed" };
        ui.key_value(&format!("Port {}", status.port), state);
    }
}

impl Command for ClassifyCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.ctx.settings()?;
        let mut cache = self.ctx.open_cache(&settings);
        let resolver = SystemResolver;
        let request = self.args.request.to_request();

        let classification = EnvironmentClassifier::from_settings(&settings, &resolver)
            .classify(&request, &mut cache);

        if self.args.explain {
            let explanation = explain(&settings, &resolver, &request, classification, &mut cache);
            if self.args.json {
                ui.output(&to_json(&explanation)?);
            } else {
                show_explanation(&explanation, ui);
                show_classification(&explanation.classification, ui);
            }
        } else if self.args.json {
            ui.output(&to_json(&classification)?);
        } else {
            show_classification(&classification, ui);
        }

        Ok(CommandResult::success())
    }
}

fn show_classification(classification: &Classification, ui: &mut dyn UserInterface) {
    ui.show_header("Classification");
    ui.key_value("Mode", &classification.mode.to_string());
    ui.key_value("Reason", &classification.reason.to_string());
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| AssetGateError::Other(e.into()))
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

    fn run(temp: &TempDir, args: ClassifyArgs) -> MockUI {
        let ctx = CommandContext::new(temp.path()).with_no_cache(true);
        let mut ui = MockUI::new();
        let result = ClassifyCommand::new(ctx, args).execute(&mut ui).unwrap();
        assert!(result.success);
        ui
    }

    fn request(host: &str) -> RequestArgs {
        RequestArgs {
            server_name: None,
            host: Some(host.to_string()),
        }
    }

    #[test]
    fn local_tld_is_development() {
        let temp = project("");
        let ui = run(
            &temp,
            ClassifyArgs {
                request: request("shop.test:8080"),
                ..Default::default()
            },
        );
        assert_eq!(ui.value_of("Mode"), Some("development"));
        assert!(ui.value_of("Reason").unwrap().contains("shop.test"));
    }

    #[test]
    fn config_debug_flag_is_development() {
        let temp = project("environment:\n  debug: true\n");
        let ui = run(&temp, ClassifyArgs::default());
        assert_eq!(ui.value_of("Reason"), Some("debug flag is set"));
    }

    #[test]
    fn json_output_has_mode_and_reason() {
        let temp = project("");
        let ui = run(
            &temp,
            ClassifyArgs {
                request: request("192.168.1.20"),
                json: true,
                ..Default::default()
            },
        );
        let value: serde_json::Value = serde_json::from_str(&ui.outputs()[0]).unwrap();
        assert_eq!(value["mode"], "development");
        assert_eq!(value["reason"]["rule"], "private_address");
    }

    #[test]
    fn explain_shows_normalized_host() {
        let temp = project("dev_server:\n  port_range: [1]\n  timeout_ms: 50\n");
        let ui = run(
            &temp,
            ClassifyArgs {
                request: request("[::1]:8080"),
                explain: true,
                ..Default::default()
            },
        );
        assert_eq!(ui.value_of("Normalized host"), Some("[::1]"));
        assert!(ui.headers().contains(&"DNS".to_string()));
        assert!(ui.value_of("Port 1").is_some());
    }
}
