//! Global constants used throughout the kilntwo codebase.
//!
//! Directory names, marker strings and version floors live here so that the
//! on-disk contract (manifest schema, injected block delimiters) is defined in
//! exactly one place.

/// Current manifest schema version written by install.
pub const MANIFEST_VERSION: u64 = 1;

/// Name of the managed root directory under the base directory.
pub const MANAGED_ROOT_NAME: &str = ".claude";

/// Namespaced sub-root inside the managed root.
pub const NAMESPACE_DIR: &str = "kilntwo";

/// Host document that receives the protocol block.
pub const HOST_DOCUMENT_NAME: &str = "CLAUDE.md";

/// Project-local state directory created on first install.
pub const STATE_DIR_NAME: &str = ".kiln";

/// Begin delimiter of the injected protocol block.
pub const PROTOCOL_BEGIN: &str = "<!-- kiln:protocol:begin -->";

/// End delimiter of the injected protocol block.
pub const PROTOCOL_END: &str = "<!-- kiln:protocol:end -->";

/// File inside the asset bundle holding the protocol block body.
pub const PROTOCOL_ASSET: &str = "protocol.md";

/// Oldest tool version doctor accepts without failing.
pub const MINIMUM_TOOL_VERSION: &str = "0.1.0";

/// Command-line tools doctor looks for when the config does not override them.
pub const DEFAULT_REQUIRED_CLIS: &[&str] = &["claude", "codex", "git"];

/// Living documents created empty under `.kiln/docs/` on first install.
pub const LIVING_DOCS: &[&str] = &["TECH_STACK.md", "PATTERNS.md", "DECISIONS.md", "PITFALLS.md"];

/// Version of the asset bundle shipped with this binary.
#[must_use]
pub fn bundle_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
