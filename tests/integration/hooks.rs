//! Hooks document merging.

use kilntwo::hooks::{HookMergeStatus, install_hooks_document, merge_hooks};
use serde_json::{Value, json};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_duplicate_entries_collapse_in_order() {
    let a = json!({"type": "command", "command": "lint.sh"});
    let b = json!({"type": "command", "command": "test.sh"});

    let merged = merge_hooks(&json!({"hooks": {"pre-commit": [a]}}), &json!({"hooks": {"pre-commit": [a, b]}}));

    assert_eq!(merged, json!({"hooks": {"pre-commit": [a, b]}}));
}

#[test]
fn test_key_order_does_not_defeat_dedup() {
    let existing = json!({"hooks": {"Stop": [{"type": "command", "command": "x"}]}});
    let incoming = json!({"hooks": [{"command": "x", "event": "Stop", "type": "command"}]});

    let merged = merge_hooks(&existing, &incoming);

    assert_eq!(merged["hooks"]["Stop"].as_array().unwrap().len(), 1);
}

#[test]
fn test_merge_on_disk_twice_is_stable() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("bundle-hooks.json");
    let dest = dir.path().join("claude/hooks/hooks.json");
    fs::write(&source, r#"{"hooks":{"Stop":[{"type":"command","command":"kiln-stop.sh"}]}}"#).unwrap();

    let first = install_hooks_document(&source, &dest).unwrap();
    let after_first = fs::read_to_string(&dest).unwrap();
    let second = install_hooks_document(&source, &dest).unwrap();

    assert_eq!(first.status, HookMergeStatus::Created);
    assert_eq!(second.status, HookMergeStatus::Merged);
    assert_eq!(fs::read_to_string(&dest).unwrap(), after_first);

    let doc: Value = serde_json::from_str(&after_first).unwrap();
    assert_eq!(doc["hooks"]["Stop"].as_array().unwrap().len(), 1);
}
