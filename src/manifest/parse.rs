//! Manifest decoding and structural validation.

use serde_json::Value;
use std::path::Path;

use super::entry::{Manifest, ManifestEntry};
use crate::error::{AssetGateError, Result};

/// Decode and validate manifest JSON.
///
/// The document must be a non-empty object whose values are all objects.
/// A `file` containing `..` rejects the whole manifest.
pub fn parse_manifest(content: &str, source_path: &Path) -> Result<Manifest> {
    let invalid = |message: String| AssetGateError::ManifestInvalid {
        path: source_path.to_path_buf(),
        message,
    };

    let value: Value =
        serde_json::from_str(content).map_err(|e| invalid(format!("not valid JSON: {}", e)))?;

    let object = match value {
        Value::Object(object) if !object.is_empty() => object,
        Value::Object(_) => return Err(invalid("manifest is empty".to_string())),
        _ => return Err(invalid("manifest is not a JSON object".to_string())),
    };

    let mut entries = Vec::with_capacity(object.len());
    for (logical, raw) in object {
        if !raw.is_object() {
            return Err(invalid(format!("entry '{}' is not an object", logical)));
        }
        if let Some(file) = raw.get("file").and_then(Value::as_str) {
            if file.contains("..") {
                return Err(invalid(format!(
                    "entry '{}' contains a path traversal sequence: {}",
                    logical, file
                )));
            }
        }

        let entry: ManifestEntry = serde_json::from_value(raw)
            .map_err(|e| invalid(format!("entry '{}' is malformed: {}", logical, e)))?;
        entries.push((logical, entry));
    }

    Ok(entries.into_iter().collect())
}
