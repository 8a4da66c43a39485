//! Page asset planning.
//!
//! Turns a request into the script and style tags a page should emit:
//! dev server URLs while a dev server is running for a development
//! request, hashed build outputs from the manifest otherwise.

use serde::Serialize;
use std::fmt;

use crate::cache::CacheStore;
use crate::config::{EntryPoints, Settings, SettingsOverride};
use crate::devserver::{resolve_dev_server_url, DevServerProbe};
use crate::environment::{Classification, EnvironmentClassifier, RequestContext};
use crate::manifest::{check_asset, resolve_stylesheets, Manifest, ManifestLoader};

/// Shown to operators in debug mode when the build is missing.
pub const MISSING_BUILD_DEBUG: &str =
    "Vite manifest not found. Run \"npm run build\" in the theme directory.";

/// Shown to operators in production when the build is missing.
pub const MISSING_BUILD: &str = "Theme assets are missing. Please contact your site administrator.";

const CLIENT_HANDLE: &str = "assetgate-vite-client";
const MAIN_HANDLE: &str = "assetgate-main";

/// Where in the page a tag goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Head,
    Footer,
}

/// Tag type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Script,
    Style,
}

/// One script or stylesheet reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetTag {
    pub handle: String,
    pub kind: AssetKind,
    pub url: String,
    /// `type="module"`
    pub module: bool,
    pub defer: bool,
    pub placement: Placement,
}

impl AssetTag {
    fn module_script(handle: &str, url: String, placement: Placement) -> Self {
        Self {
            handle: handle.to_string(),
            kind: AssetKind::Script,
            url,
            module: true,
            defer: false,
            placement,
        }
    }

    fn deferred_script(handle: &str, url: String) -> Self {
        Self {
            handle: handle.to_string(),
            kind: AssetKind::Script,
            url,
            module: false,
            defer: true,
            placement: Placement::Footer,
        }
    }

    fn stylesheet(handle: String, url: String) -> Self {
        Self {
            handle,
            kind: AssetKind::Style,
            url,
            module: false,
            defer: false,
            placement: Placement::Head,
        }
    }

    /// HTML for this tag, with attributes escaped.
    pub fn to_html(&self) -> String {
        let id = escape_attr(&self.handle);
        let url = escape_attr(&self.url);
        match self.kind {
            AssetKind::Style => {
                format!(r#"<link rel="stylesheet" id="{}-css" href="{}">"#, id, url)
            }
            AssetKind::Script => {
                let mut attrs = String::new();
                if self.module {
                    attrs.push_str(r#" type="module""#);
                }
                attrs.push_str(&format!(r#" id="{}-js" src="{}""#, id, url));
                if self.defer {
                    attrs.push_str(" defer");
                }
                format!("<script{}></script>", attrs)
            }
        }
    }
}

/// Severity of an operator diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Message for site operators, not visitors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Where the plan's assets come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AssetSource {
    DevServer { url: String },
    Build,
    Unavailable,
}

/// The tags and diagnostics for one page.
#[derive(Debug, Clone, Serialize)]
pub struct AssetPlan {
    pub classification: Classification,
    pub source: AssetSource,
    pub tags: Vec<AssetTag>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AssetPlan {
    pub fn head(&self) -> impl Iterator<Item = &AssetTag> {
        self.tags.iter().filter(|t| t.placement == Placement::Head)
    }

    pub fn footer(&self) -> impl Iterator<Item = &AssetTag> {
        self.tags.iter().filter(|t| t.placement == Placement::Footer)
    }

    /// Head tags, then footer tags, one per line.
    pub fn render_html(&self) -> String {
        self.head()
            .chain(self.footer())
            .map(AssetTag::to_html)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Tags for serving from a running dev server.
///
/// The client goes in the head so hot reload is wired up before the page
/// script runs. Styles are injected by the client.
pub fn dev_server_tags(dev_url: &str, entries: &EntryPoints) -> Vec<AssetTag> {
    let base = dev_url.trim_end_matches('/');
    vec![
        AssetTag::module_script(
            CLIENT_HANDLE,
            format!("{}/@vite/client", base),
            Placement::Head,
        ),
        AssetTag::module_script(
            MAIN_HANDLE,
            format!("{}/{}", base, entries.script.trim_start_matches('/')),
            Placement::Footer,
        ),
    ]
}

/// Tags for serving built files, plus any rejection diagnostics.
pub fn build_tags(
    manifest: &Manifest,
    entries: &EntryPoints,
    dist_uri: &str,
    version: Option<&str>,
) -> (Vec<AssetTag>, Vec<Diagnostic>) {
    let mut tags = Vec::new();
    let mut diagnostics = Vec::new();
    let url = |file: &str| dist_url(dist_uri, file, version);

    let mut styles: Vec<&str> = Vec::new();
    if let Some(style) = &entries.style {
        match check_asset(manifest, style) {
            Ok(file) => styles.push(file),
            Err(e) => {
                tracing::warn!("{}", e);
                diagnostics.push(Diagnostic::new(Severity::Warning, e.to_string()));
            }
        }
    }
    for file in resolve_stylesheets(manifest, &entries.script) {
        if !styles.contains(&file) {
            styles.push(file);
        }
    }
    for (i, file) in styles.into_iter().enumerate() {
        let handle = if i == 0 {
            MAIN_HANDLE.to_string()
        } else {
            format!("{}-{}", MAIN_HANDLE, i)
        };
        tags.push(AssetTag::stylesheet(handle, url(file)));
    }

    match check_asset(manifest, &entries.script) {
        Ok(file) => tags.push(AssetTag::deferred_script(MAIN_HANDLE, url(file))),
        Err(e) => {
            tracing::warn!("{}", e);
            diagnostics.push(Diagnostic::new(Severity::Warning, e.to_string()));
        }
    }

    (tags, diagnostics)
}

/// Public URL of a built file, with `?ver=` when a version is set.
pub fn dist_url(dist_uri: &str, file: &str, version: Option<&str>) -> String {
    let url = format!(
        "{}/{}",
        dist_uri.trim_end_matches('/'),
        file.trim_start_matches('/')
    );
    match version {
        Some(ver) => format!("{}?ver={}", url, ver),
        None => url,
    }
}

/// Operator message for a missing build.
pub fn missing_build_message(debug: bool) -> &'static str {
    if debug {
        MISSING_BUILD_DEBUG
    } else {
        MISSING_BUILD
    }
}

/// Notice naming the active dev server.
pub fn dev_server_notice(url: &str) -> String {
    format!(
        "Vite dev server detected at {}. Hot Module Replacement (HMR) is active.",
        url
    )
}

/// Builds asset plans from settings and the three resolvers.
pub struct AssetPlanner<'a> {
    settings: &'a Settings,
    classifier: EnvironmentClassifier<'a>,
    probe: DevServerProbe<'a>,
    loader: ManifestLoader,
    overrides: &'a dyn SettingsOverride,
}

impl<'a> AssetPlanner<'a> {
    pub fn new(
        settings: &'a Settings,
        classifier: EnvironmentClassifier<'a>,
        probe: DevServerProbe<'a>,
        overrides: &'a dyn SettingsOverride,
    ) -> Self {
        Self {
            settings,
            classifier,
            probe,
            loader: ManifestLoader::from_settings(settings),
            overrides,
        }
    }

    /// Plan the assets for `request`.
    ///
    /// A development request only uses the dev server when one answers;
    /// otherwise it falls back to the build like production does.
    pub fn plan(&self, request: &RequestContext, cache: &mut CacheStore) -> AssetPlan {
        let classification = self.classifier.classify(request, cache);

        if classification.is_dev() {
            if let Some(port) = self.probe.probe(cache).port() {
                let url = resolve_dev_server_url(&self.settings.dev_server, Some(port), self.overrides);
                tracing::debug!("Serving assets from dev server at {}", url);
                return AssetPlan {
                    classification,
                    tags: dev_server_tags(&url, &self.settings.entries),
                    diagnostics: vec![Diagnostic::new(Severity::Info, dev_server_notice(&url))],
                    source: AssetSource::DevServer { url },
                };
            }
        }

        let Some(manifest) = self.loader.get_manifest(cache) else {
            let message = missing_build_message(self.settings.environment.debug);
            tracing::error!("{}", message);
            return AssetPlan {
                classification,
                source: AssetSource::Unavailable,
                tags: Vec::new(),
                diagnostics: vec![Diagnostic::new(Severity::Error, message)],
            };
        };

        let (tags, diagnostics) = build_tags(
            &manifest,
            &self.settings.entries,
            &self.settings.dist_uri,
            self.settings.asset_version.as_deref(),
        );
        AssetPlan {
            classification,
            source: AssetSource::Build,
            tags,
            diagnostics,
        }
    }
}

fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
