//! Delimited protocol block inside a host-owned document.
//!
//! The host document (a project's `CLAUDE.md`) belongs to the operator.
//! kilntwo owns exactly one region of it, bounded by the begin/end markers
//! recorded in the manifest:
//!
//! ```text
//! # My project notes            <- operator text, never touched
//!
//! <!-- kiln:protocol:begin -->
//! ...protocol body...
//! <!-- kiln:protocol:end -->
//! ```
//!
//! - inserting twice is the same as inserting once;
//! - removing when no block is present leaves the file untouched;
//! - removing after inserting restores the original text (up to trailing
//!   blank lines).

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use crate::manifest::ProtocolMarkers;
use crate::utils::fs::safe_write;

/// What [`inject_block`] did to the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectOutcome {
    /// The document did not exist and was created holding only the block
    Created,
    /// The block was added after the existing text
    Appended,
    /// An existing block with different content was replaced in place
    Replaced,
    /// The block was already present with identical content
    Unchanged,
}

/// Renders the full block, markers included, without a trailing newline.
#[must_use]
pub fn render_block(markers: &ProtocolMarkers, body: &str) -> String {
    format!("{}\n{}\n{}", markers.begin, body.trim_end_matches('\n'), markers.end)
}

/// Byte range of the first complete block in `text`.
fn find_block(text: &str, markers: &ProtocolMarkers) -> Option<(usize, usize)> {
    let start = text.find(&markers.begin)?;
    let after_begin = start + markers.begin.len();
    let end = text[after_begin..].find(&markers.end)? + after_begin + markers.end.len();
    Some((start, end))
}

/// Inserts or refreshes `block` in `existing` (`None` when the document does
/// not exist).
#[must_use]
pub fn inject_into_text(existing: Option<&str>, block: &str, markers: &ProtocolMarkers) -> (String, InjectOutcome) {
    let Some(text) = existing else {
        return (format!("{block}\n"), InjectOutcome::Created);
    };

    if let Some((start, end)) = find_block(text, markers) {
        if &text[start..end] == block {
            return (text.to_string(), InjectOutcome::Unchanged);
        }
        let replaced = format!("{}{}{}", &text[..start], block, &text[end..]);
        return (replaced, InjectOutcome::Replaced);
    }

    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        (format!("{block}\n"), InjectOutcome::Appended)
    } else {
        (format!("{trimmed}\n\n{block}\n"), InjectOutcome::Appended)
    }
}

/// Removes the block from `text`.
///
/// Returns `None` when `text` holds no complete block.
#[must_use]
pub fn remove_from_text(text: &str, markers: &ProtocolMarkers) -> Option<String> {
    let (start, end) = find_block(text, markers)?;
    let before = text[..start].trim_end_matches('\n');
    let after = text[end..].trim_start_matches('\n');

    let result = match (before.is_empty(), after.is_empty()) {
        (true, true) => String::new(),
        (false, true) => format!("{before}\n"),
        (true, false) => after.to_string(),
        (false, false) => format!("{before}\n\n{after}"),
    };
    Some(result)
}

/// Inserts the protocol block into the document at `path`.
///
/// The document is created (with parent directories) if it does not exist,
/// and left unwritten when the block is already up to date.
///
/// # Errors
///
/// Returns an error if the document cannot be read or written.
pub fn inject_block(path: &Path, markers: &ProtocolMarkers, body: &str) -> Result<InjectOutcome> {
    let existing = match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read host document: {}", path.display()));
        }
    };

    let block = render_block(markers, body);
    let (updated, outcome) = inject_into_text(existing.as_deref(), &block, markers);

    if outcome != InjectOutcome::Unchanged {
        safe_write(path, &updated)
            .with_context(|| format!("Failed to write host document: {}", path.display()))?;
    }
    debug!("Protocol block in {}: {:?}", path.display(), outcome);

    Ok(outcome)
}

/// Removes the protocol block from the document at `path`.
///
/// Returns `true` when a block was removed. A missing document or a document
/// without a block is left alone and returns `false`.
///
/// # Errors
///
/// Returns an error if the document exists but cannot be read or written.
pub fn remove_block(path: &Path, markers: &ProtocolMarkers) -> Result<bool> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read host document: {}", path.display()));
        }
    };

    let Some(updated) = remove_from_text(&text, markers) else {
        return Ok(false);
    };

    safe_write(path, &updated)
        .with_context(|| format!("Failed to write host document: {}", path.display()))?;
    debug!("Removed protocol block from {}", path.display());
    Ok(true)
}
