//! Structural merge of two hooks documents.
//!
//! The operator's hooks document is never replaced. For every event the
//! merged entry list is the existing entries followed by the incoming ones,
//! with later duplicates dropped. Two entries are duplicates when they are
//! deeply equal regardless of object key order, which [`canonical_key`]
//! captures as a string.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

use super::{HooksByEvent, HooksDocument};

/// Serializes `value` with object keys sorted at every depth.
///
/// Two values produce the same key iff they are deeply equal ignoring key
/// order. Array order is significant.
///
/// # Examples
///
/// ```rust
/// use kilntwo::hooks::merge::canonical_key;
/// use serde_json::json;
///
/// assert_eq!(
///     canonical_key(&json!({"b": 1, "a": {"d": 2, "c": 3}})),
///     canonical_key(&json!({"a": {"c": 3, "d": 2}, "b": 1})),
/// );
/// ```
#[must_use]
pub fn canonical_key(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(canonical_key).collect();
            format!("[{}]", parts.join(","))
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let parts: Vec<String> = keys
                .into_iter()
                .map(|key| format!("{}:{}", Value::String(key.clone()), canonical_key(&map[key])))
                .collect();
            format!("{{{}}}", parts.join(","))
        }
        scalar => scalar.to_string(),
    }
}

/// Merges two normalized hook mappings.
///
/// Events from both sides appear in the result (sorted by name). Within an
/// event the first occurrence of each entry wins.
#[must_use]
pub fn merge_by_event(existing: HooksByEvent, incoming: HooksByEvent) -> HooksByEvent {
    let mut combined: BTreeMap<String, Vec<Value>> = existing;
    for (event, entries) in incoming {
        combined.entry(event).or_default().extend(entries);
    }

    combined
        .into_iter()
        .map(|(event, entries)| {
            let mut seen = HashSet::new();
            let deduped: Vec<Value> = entries.into_iter().filter(|entry| seen.insert(canonical_key(entry))).collect();
            (event, deduped)
        })
        .collect()
}

/// Merges two raw hooks documents into the canonical `{ "hooks": { ... } }`
/// form.
///
/// Either input may use the array form or the by-event form; malformed parts
/// are dropped during normalization.
///
/// # Examples
///
/// ```rust
/// use kilntwo::hooks::merge::merge_hooks;
/// use serde_json::json;
///
/// let existing = json!({"hooks": {"Stop": [{"command": "user.sh"}]}});
/// let incoming = json!({"hooks": [{"event": "Stop", "command": "kiln.sh"}]});
///
/// assert_eq!(
///     merge_hooks(&existing, &incoming),
///     json!({"hooks": {"Stop": [{"command": "user.sh"}, {"command": "kiln.sh"}]}})
/// );
/// ```
#[must_use]
pub fn merge_hooks(existing: &Value, incoming: &Value) -> Value {
    let merged = merge_by_event(
        HooksDocument::from_value(existing).into_by_event(),
        HooksDocument::from_value(incoming).into_by_event(),
    );
    to_document(merged)
}

/// Wraps a mapping as `{ "hooks": { event: [entries] } }`.
#[must_use]
pub fn to_document(by_event: HooksByEvent) -> Value {
    let hooks: Map<String, Value> =
        by_event.into_iter().map(|(event, entries)| (event, Value::Array(entries))).collect();
    let mut document = Map::new();
    document.insert("hooks".to_string(), Value::Object(hooks));
    Value::Object(document)
}
