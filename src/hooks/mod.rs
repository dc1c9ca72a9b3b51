//! Hooks document handling
//!
//! The host reads hook registrations from `<root>/hooks/hooks.json`. The
//! operator may already have their own hooks there, so kilntwo merges its
//! bundled hooks into the file instead of replacing it (see [`merge`]).
//!
//! Two shapes of the document are accepted on input:
//!
//! ```json
//! { "hooks": [ { "event": "Stop", "command": "..." } ] }
//! { "hooks": { "Stop": [ { "command": "..." } ] } }
//! ```
//!
//! Both normalize to the by-event mapping ([`HooksByEvent`]), which is also the
//! only shape ever written back.

pub mod merge;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

use crate::utils::fs::write_json_file;

pub use merge::{canonical_key, merge_hooks};

/// Hook entries grouped by event name, events sorted.
pub type HooksByEvent = BTreeMap<String, Vec<Value>>;

/// A hooks document in one of its accepted input shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum HooksDocument {
    /// `hooks` is an array of entries each carrying its own `event` field
    Tagged(Vec<Value>),
    /// `hooks` maps event names to entry arrays
    ByEvent(Map<String, Value>),
    /// No usable `hooks` field
    Empty,
}

impl HooksDocument {
    /// Classifies a raw document by the type of its `hooks` field.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value.get("hooks") {
            Some(Value::Array(entries)) => Self::Tagged(entries.clone()),
            Some(Value::Object(map)) => Self::ByEvent(map.clone()),
            _ => Self::Empty,
        }
    }

    /// Normalizes to the by-event mapping.
    ///
    /// - array form: non-object entries and entries without a non-empty string
    ///   `event` are dropped; `event` is removed from the kept entries;
    /// - mapping form: values that are not arrays are dropped, as are
    ///   non-object entries inside them.
    #[must_use]
    pub fn into_by_event(self) -> HooksByEvent {
        let mut by_event = HooksByEvent::new();

        match self {
            Self::Tagged(entries) => {
                for entry in entries {
                    let Value::Object(mut object) = entry else {
                        continue;
                    };
                    let event = match object.remove("event") {
                        Some(Value::String(event)) if !event.is_empty() => event,
                        _ => continue,
                    };
                    by_event.entry(event).or_default().push(Value::Object(object));
                }
            }
            Self::ByEvent(map) => {
                for (event, entries) in map {
                    let Value::Array(entries) = entries else {
                        continue;
                    };
                    let kept: Vec<Value> = entries.into_iter().filter(Value::is_object).collect();
                    by_event.insert(event, kept);
                }
            }
            Self::Empty => {}
        }

        by_event
    }
}

/// What happened to the destination hooks document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HookMergeStatus {
    /// No destination existed; it was written from the bundle
    Created,
    /// The bundle's hooks were merged into the existing destination
    Merged,
    /// Nothing was written
    Skipped,
}

impl fmt::Display for HookMergeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Merged => write!(f, "merged"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Outcome of [`install_hooks_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookMergeOutcome {
    /// What happened to the destination
    pub status: HookMergeStatus,
    /// Non-fatal problems encountered
    pub warnings: Vec<String>,
}

enum JsonFile {
    Missing,
    Parsed(Value),
    Unparseable(String),
}

fn read_json_document(path: &Path) -> Result<JsonFile> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(JsonFile::Missing),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };
    Ok(match serde_json::from_str(&content) {
        Ok(value) => JsonFile::Parsed(value),
        Err(e) => JsonFile::Unparseable(e.to_string()),
    })
}

/// Merges the bundle's hooks document at `source` into `dest`.
///
/// | source        | destination   | result                                    |
/// |---------------|---------------|-------------------------------------------|
/// | missing       | any           | `skipped` + warning                       |
/// | unparseable   | any           | warning; source treated as empty          |
/// | ok            | missing       | `created`                                 |
/// | ok            | ok            | `merged`                                  |
/// | ok            | unparseable   | `skipped` + warning, destination untouched|
///
/// # Errors
///
/// Only I/O failures (other than a missing file) are errors.
pub fn install_hooks_document(source: &Path, dest: &Path) -> Result<HookMergeOutcome> {
    let mut warnings = Vec::new();

    let incoming = match read_json_document(source)? {
        JsonFile::Missing => {
            let warning = format!("Missing source hooks document: {}", source.display());
            warn!("{}", warning);
            return Ok(HookMergeOutcome {
                status: HookMergeStatus::Skipped,
                warnings: vec![warning],
            });
        }
        JsonFile::Parsed(value) => value,
        JsonFile::Unparseable(reason) => {
            let warning = format!("Could not parse source hooks document {}: {}", source.display(), reason);
            warn!("{}", warning);
            warnings.push(warning);
            Value::Null
        }
    };

    let (existing, status) = match read_json_document(dest)? {
        JsonFile::Missing => (Value::Null, HookMergeStatus::Created),
        JsonFile::Parsed(value) => (value, HookMergeStatus::Merged),
        JsonFile::Unparseable(reason) => {
            let warning = format!(
                "Could not parse existing hooks document {}, left unchanged: {}",
                dest.display(),
                reason
            );
            warn!("{}", warning);
            warnings.push(warning);
            return Ok(HookMergeOutcome {
                status: HookMergeStatus::Skipped,
                warnings,
            });
        }
    };

    let merged = merge_hooks(&existing, &incoming);
    write_json_file(dest, &merged)?;
    debug!("Hooks document {}: {}", dest.display(), status);

    Ok(HookMergeOutcome {
        status,
        warnings,
    })
}
