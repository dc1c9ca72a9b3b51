//! Structural validation of a raw manifest.
//!
//! Validation runs on the untyped [`serde_json::Value`] so that it can report
//! *every* problem at once, including fields serde would never get to because
//! an earlier field failed. It never panics on unknown, missing or mistyped
//! fields; unknown fields are ignored.

use serde_json::{Map, Value};

use crate::utils::path_validation::has_traversal_segment;

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    /// `true` iff `errors` is empty
    pub valid: bool,
    /// One human-readable message per violation
    pub errors: Vec<String>,
}

/// Validates a raw manifest.
///
/// Checked:
/// - `manifestVersion` is an integer, `kilnVersion` and `installedAt` strings;
/// - `files` is an array of objects with string `path` and `checksum`;
/// - no `files[].path` contains a `..` segment (reported as path traversal);
/// - `protocolMarkers` is an object with non-blank string `begin` and `end`;
/// - the optional `claudeMdPath`, `projectPath` and `installTarget` fields, if
///   present and not null, have the right shape.
///
/// # Examples
///
/// ```rust
/// use kilntwo::manifest::validation::validate;
/// use serde_json::json;
///
/// let raw = json!({
///     "manifestVersion": 1,
///     "kilnVersion": "0.1.0",
///     "installedAt": "2026-01-01T00:00:00Z",
///     "files": [{"path": "../../.ssh/config", "checksum": "sha256:00"}],
///     "protocolMarkers": {"begin": "<!-- b -->", "end": "<!-- e -->"}
/// });
/// let result = validate(&raw);
/// assert!(!result.valid);
/// assert!(result.errors[0].contains("path traversal"));
/// ```
#[must_use]
pub fn validate(raw: &Value) -> Validation {
    let mut errors = Vec::new();

    let Some(object) = raw.as_object() else {
        return Validation {
            valid: false,
            errors: vec!["manifest must be a JSON object".to_string()],
        };
    };

    match object.get("manifestVersion") {
        None => errors.push(missing("manifestVersion")),
        Some(v) if !(v.is_u64() || v.is_i64()) => {
            errors.push("manifestVersion must be an integer".to_string());
        }
        Some(_) => {}
    }

    require_string(object, "kilnVersion", &mut errors);
    require_string(object, "installedAt", &mut errors);

    match object.get("files") {
        None => errors.push(missing("files")),
        Some(Value::Array(files)) => {
            for (index, file) in files.iter().enumerate() {
                validate_file_entry(index, file, &mut errors);
            }
        }
        Some(_) => errors.push("files must be an array".to_string()),
    }

    match object.get("protocolMarkers") {
        None => errors.push(missing("protocolMarkers")),
        Some(Value::Object(markers)) => {
            for key in ["begin", "end"] {
                match markers.get(key) {
                    Some(Value::String(marker)) if marker.trim().is_empty() => {
                        errors.push(format!("protocolMarkers.{key} must not be empty"));
                    }
                    Some(Value::String(_)) => {}
                    _ => errors.push(format!("protocolMarkers.{key} must be a string")),
                }
            }
        }
        Some(_) => errors.push("protocolMarkers must be an object".to_string()),
    }

    optional_string(object, "claudeMdPath", "claudeMdPath", &mut errors);
    optional_string(object, "projectPath", "projectPath", &mut errors);
    match object.get("installTarget") {
        None | Some(Value::Null) => {}
        Some(Value::Object(target)) => {
            optional_string(target, "claudeMdPath", "installTarget.claudeMdPath", &mut errors);
            optional_string(target, "projectPath", "installTarget.projectPath", &mut errors);
        }
        Some(_) => errors.push("installTarget must be an object".to_string()),
    }

    Validation {
        valid: errors.is_empty(),
        errors,
    }
}

fn validate_file_entry(index: usize, file: &Value, errors: &mut Vec<String>) {
    let Some(entry) = file.as_object() else {
        errors.push(format!("files[{index}] must be an object"));
        return;
    };

    match entry.get("path") {
        Some(Value::String(path)) => {
            if has_traversal_segment(path) {
                errors.push(format!("files[{index}].path contains path traversal: {path}"));
            }
        }
        _ => errors.push(format!("files[{index}].path must be a string")),
    }

    if !entry.get("checksum").is_some_and(Value::is_string) {
        errors.push(format!("files[{index}].checksum must be a string"));
    }
}

fn missing(field: &str) -> String {
    format!("missing required field: {field}")
}

fn require_string(object: &Map<String, Value>, field: &str, errors: &mut Vec<String>) {
    match object.get(field) {
        None => errors.push(missing(field)),
        Some(Value::String(_)) => {}
        Some(_) => errors.push(format!("{field} must be a string")),
    }
}

fn optional_string(object: &Map<String, Value>, field: &str, label: &str, errors: &mut Vec<String>) {
    match object.get(field) {
        None | Some(Value::Null | Value::String(_)) => {}
        Some(_) => errors.push(format!("{label} must be a string")),
    }
}
