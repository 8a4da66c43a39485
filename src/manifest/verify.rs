//! Post-build manifest verification.
//!
//! Unlike [`ManifestLoader`](super::ManifestLoader), which stops at the
//! first problem, the verifier collects every failure so a build log shows
//! all of them at once.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Logical entries checked when none are configured.
pub const DEFAULT_REQUIRED: [&str; 2] = ["src/js/main.js", "src/css/main.css"];

/// A required entry that was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedEntry {
    pub name: String,
    pub file: String,
}

/// Outcome of verifying a manifest.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    pub manifest_path: PathBuf,
    /// Required entries that resolved to a file.
    pub verified: Vec<VerifiedEntry>,
    /// One line per failure.
    pub failures: Vec<String>,
    /// Number of file references checked on disk (strict mode).
    pub files_checked: usize,
}

impl VerificationReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_ok() {
            0
        } else {
            1
        }
    }
}

/// Checks a built manifest.
#[derive(Debug, Clone)]
pub struct ManifestVerifier {
    required: Vec<String>,
    dist_dir: Option<PathBuf>,
}

impl Default for ManifestVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRED.iter().map(|s| s.to_string()).collect())
    }
}

impl ManifestVerifier {
    pub fn new(required: Vec<String>) -> Self {
        Self {
            required,
            dist_dir: None,
        }
    }

    /// Also require every referenced file to exist under `dist_dir`.
    pub fn strict(mut self, dist_dir: impl Into<PathBuf>) -> Self {
        self.dist_dir = Some(dist_dir.into());
        self
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Verify the manifest at `manifest_path`.
    pub fn verify(&self, manifest_path: &Path) -> VerificationReport {
        let mut report = VerificationReport {
            manifest_path: manifest_path.to_path_buf(),
            ..Default::default()
        };

        let content = match fs::read_to_string(manifest_path) {
            Ok(content) => content,
            Err(_) => {
                report.failures.push(format!(
                    "Manifest file not found at {}. Run \"npm run build\" first.",
                    manifest_path.display()
                ));
                return report;
            }
        };

        let object = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(object)) => object,
            Ok(_) => {
                report
                    .failures
                    .push("Failed to parse manifest.json: not a JSON object".to_string());
                return report;
            }
            Err(e) => {
                report
                    .failures
                    .push(format!("Failed to parse manifest.json: {}", e));
                return report;
            }
        };

        self.check_required(&object, &mut report);
        self.check_paths(&object, &mut report);
        report
    }

    fn check_required(&self, object: &Map<String, Value>, report: &mut VerificationReport) {
        for name in &self.required {
            match object
                .get(name)
                .and_then(|entry| entry.get("file"))
                .and_then(Value::as_str)
            {
                Some(file) => report.verified.push(VerifiedEntry {
                    name: name.clone(),
                    file: file.to_string(),
                }),
                None => report
                    .failures
                    .push(format!("Missing asset in manifest: {}", name)),
            }
        }
    }

    fn check_paths(&self, object: &Map<String, Value>, report: &mut VerificationReport) {
        for (name, entry) in object {
            for file in referenced_paths(entry) {
                if let Some(problem) = path_problem(file) {
                    report
                        .failures
                        .push(format!("Entry '{}' references '{}': {}", name, file, problem));
                    continue;
                }

                if let Some(dist_dir) = &self.dist_dir {
                    report.files_checked += 1;
                    if !dist_dir.join(file).is_file() {
                        report.failures.push(format!(
                            "Entry '{}' references '{}', which does not exist in {}",
                            name,
                            file,
                            dist_dir.display()
                        ));
                    }
                }
            }
        }
    }
}

fn referenced_paths(entry: &Value) -> impl Iterator<Item = &str> {
    let file = entry.get("file").and_then(Value::as_str);
    let css = entry
        .get("css")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str);
    file.into_iter().chain(css)
}

fn path_problem(file: &str) -> Option<&'static str> {
    if file.contains("..") {
        Some("path traversal sequence")
    } else if file.starts_with("./") {
        Some("relative prefix './'")
    } else if file.starts_with('/') {
        Some("absolute path")
    } else {
        None
    }
}
