//! Probe command implementation.
//!
//! `assetgate probe` looks for a running dev server. Exits 1 when none
//! answers, so it can gate scripts.

use serde::Serialize;

use crate::cli::args::ProbeArgs;
use crate::config::NoOverrides;
use crate::devserver::{resolve_dev_server_url, DevServerProbe, ProbeResult, TcpConnector};
use crate::error::Result;
use crate::ui::UserInterface;

use super::classify::to_json;
use super::dispatcher::{Command, CommandContext, CommandResult};

/// The probe command implementation.
pub struct ProbeCommand {
    ctx: CommandContext,
    args: ProbeArgs,
}

impl ProbeCommand {
    pub fn new(ctx: CommandContext, args: ProbeArgs) -> Self {
        Self { ctx, args }
    }
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    #[serde(flatten)]
    result: ProbeResult,
    host: String,
    ports: Vec<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl Command for ProbeCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let settings = self.ctx.settings()?;
        let mut cache = self.ctx.open_cache(&settings);
        let connector = TcpConnector;
        let probe = DevServerProbe::from_settings(&settings, &connector);

        let result = probe.probe(&mut cache);
        let url = result
            .port()
            .map(|port| resolve_dev_server_url(&settings.dev_server, Some(port), &NoOverrides));

        if self.args.json {
            let report = ProbeReport {
                result,
                host: probe.host().to_string(),
                ports: probe.ports().to_vec(),
                url: url.clone(),
            };
            ui.output(&to_json(&report)?);
        } else {
            match &url {
                Some(url) => ui.success(&format!("Dev server detected at {}", url)),
                None => ui.warning(&format!(
                    "No dev server on {} (ports {})",
                    probe.host(),
                    format_ports(probe.ports())
                )),
            }
        }

        Ok(CommandResult::from_bool(result.is_active()))
    }
}

/// "3000-3005" for a contiguous range, "3000, 5173" otherwise.
fn format_ports(ports: &[u16]) -> String {
    let contiguous = ports.windows(2).all(|w| w[1] == w[0].wrapping_add(1));
    match (ports.first(), ports.last()) {
        (Some(first), Some(last)) if contiguous && ports.len() > 1 => {
            format!("{}-{}", first, last)
        }
        _ => ports
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    }
}
