//! Error handling for kilntwo
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`KilnError`]) for every failure a caller may
//!    want to match on, most importantly the two path-safety violations.
//! 2. **User-friendly messages** ([`ErrorContext`]) with a suggestion attached,
//!    rendered by `main.rs` before the process exits with status 1.
//!
//! Expected outcomes are *not* errors. "Not installed" is a sentinel result of
//! the update and uninstall orchestrators, and a sync conflict is a reported
//! condition inside a successful install.
//!
//! # Examples
//!
//! ```rust,no_run
//! use kilntwo::core::{KilnError, user_friendly_error};
//!
//! let err = anyhow::Error::from(KilnError::PathTraversal {
//!     path: "../../.ssh/config".to_string(),
//! });
//! let ctx = user_friendly_error(err);
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for kilntwo operations.
///
/// [`PathTraversal`](KilnError::PathTraversal) and
/// [`PathEscape`](KilnError::PathEscape) are separate from
/// [`InvalidManifest`](KilnError::InvalidManifest); see
/// [`KilnError::is_path_violation`].
#[derive(Error, Debug, Clone)]
pub enum KilnError {
    /// A required location could not be determined (for example the home
    /// directory when no override was given).
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem
        message: String,
    },

    /// The manifest failed structural validation.
    ///
    /// The message lists every violation found, joined with `"; "`.
    #[error("Invalid manifest: {}", errors.join("; "))]
    InvalidManifest {
        /// Every violation reported by validation
        errors: Vec<String>,
    },

    /// A manifest entry contains a `..` path segment.
    #[error("Manifest entry contains path traversal: {path}")]
    PathTraversal {
        /// The offending manifest path
        path: String,
    },

    /// A manifest entry resolves outside the managed root.
    #[error("Refusing to operate outside managed root: {path}")]
    PathEscape {
        /// The offending manifest path
        path: String,
    },

    /// A file that must exist (for checksumming) is missing.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Absolute path of the missing file
        path: String,
    },

    /// The operating system refused access to a path.
    #[error("Permission denied while trying to {operation}: {path}")]
    PermissionDenied {
        /// What was being attempted
        operation: String,
        /// The path involved
        path: String,
    },

    /// The asset bundle directory could not be located.
    #[error("Asset bundle not found: {path}")]
    AssetsNotFound {
        /// The last location that was tried
        path: String,
    },
}

impl KilnError {
    /// Whether this error is one of the two path-safety violations.
    #[must_use]
    pub const fn is_path_violation(&self) -> bool {
        matches!(self, Self::PathTraversal { .. } | Self::PathEscape { .. })
    }
}

/// A [`KilnError`] decorated with an optional suggestion and details, for
/// display on the terminal.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: KilnError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wraps an error without suggestion or details.
    #[must_use]
    pub const fn new(error: KilnError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attaches a suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attaches details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prints the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

fn create_error_context(error: KilnError) -> ErrorContext {
    match &error {
        KilnError::ConfigurationError { .. } => ErrorContext::new(error)
            .with_suggestion("Pass --home <DIR> or set KILNTWO_HOME to choose a base directory"),
        KilnError::InvalidManifest { .. } => ErrorContext::new(error)
            .with_suggestion("Inspect .claude/kilntwo/manifest.json or reinstall with `kilntwo install --force`")
            .with_details("The manifest is validated before any file it lists is touched"),
        KilnError::PathTraversal { .. } | KilnError::PathEscape { .. } => ErrorContext::new(error)
            .with_suggestion("Do not edit manifest paths by hand; delete the manifest and reinstall")
            .with_details("Manifest entries must stay inside the managed .claude directory"),
        KilnError::FileNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Run `kilntwo update` to restore missing managed files"),
        KilnError::PermissionDenied { .. } => ErrorContext::new(error)
            .with_suggestion("Check ownership and permissions of the target directory"),
        KilnError::AssetsNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Pass --assets <DIR>, set KILNTWO_ASSETS, or set assets_dir in the config file"),
    }
}

/// Converts any error into a displayable [`ErrorContext`].
///
/// Typed [`KilnError`]s anywhere in the chain get their tailored suggestion;
/// I/O permission errors become [`KilnError::PermissionDenied`]; everything
/// else is reported as a configuration error carrying the full chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(kiln_error) = cause.downcast_ref::<KilnError>() {
            return create_error_context(kiln_error.clone());
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::PermissionDenied
    {
        return ErrorContext::new(KilnError::PermissionDenied {
            operation: "access a file".to_string(),
            path: "unknown".to_string(),
        })
        .with_details(error.to_string())
        .with_suggestion("Try a different --home/--project or fix directory ownership");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(KilnError::ConfigurationError {
        message,
    })
}
