//! # Error Handling
//!
//! This module defines the centralized error type for `coretree`. It uses the
//! `thiserror` library to build one `Error` enum covering every failure the
//! composition engine can hit, each variant carrying enough context to tell
//! the operator what went wrong and where.
//!
//! The variants fall into five families:
//!
//! - **Precondition violations**: the project is in the wrong lifecycle state
//!   (already initialized, not initialized, working copy has local
//!   modifications). These are detected before any mutation.
//! - **External process failures**: a `git` invocation could not be spawned
//!   or exited non-zero. The captured diagnostic output is kept verbatim.
//! - **Template failures**: a template referenced a variable that was not
//!   supplied, or could not be parsed.
//! - **Link conflicts**: an overlay destination is occupied by something that
//!   is not a link to the expected target.
//! - **Configuration errors**: the persisted `coretree.ini` is unreadable or
//!   describes an extension the engine cannot handle.
//!
//! All failures abort the current top-level operation. Nothing is rolled
//! back; the operations are written to be safely re-run instead.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for coretree operations
#[derive(Error, Debug)]
pub enum Error {
    /// `init` or `clone` was invoked on a project that already exists.
    #[error("Project already initialized at {}", path.display())]
    AlreadyInitialized { path: PathBuf },

    /// An operation that needs an existing project found none.
    #[error("No coretree project at {} (missing {})", root.display(), config.display())]
    NotInitialized { root: PathBuf, config: PathBuf },

    /// A working copy has uncommitted changes and refreshing it would lose them.
    #[error("Cannot update {repo}: working tree at {} has local modifications", dir.display())]
    LocalModifications { repo: String, dir: PathBuf },

    /// The `git` binary could not be started.
    #[error("Failed to run git {command}: {message}")]
    GitSpawn { command: String, message: String },

    /// A `git` invocation exited with a non-zero status.
    ///
    /// `stderr` holds the captured diagnostic output unchanged.
    #[error("Git command failed in {}: git {command}\n{stderr}", dir.display())]
    GitCommand {
        command: String,
        dir: PathBuf,
        stderr: String,
    },

    /// A template could not be rendered.
    ///
    /// May include the name of the problematic variable when applicable.
    #[error("Template error in '{template}': {message}{}", variable.as_ref().map(|v| format!(" (variable: {})", v)).unwrap_or_default())]
    Template {
        template: String,
        message: String,
        /// The template variable that caused the error, if known
        variable: Option<String>,
    },

    /// An overlay destination already holds something other than the expected link.
    #[error("Link conflict at {}: found {found}, expected link to {}", dest.display(), expected.display())]
    LinkConflict {
        dest: PathBuf,
        found: String,
        expected: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A required option is absent from a configuration section.
    #[error("Missing option '{option}' in section [{section}]")]
    MissingOption { section: String, option: String },

    /// A `%(key)s` reference could not be resolved.
    #[error("Cannot interpolate '%({key})s' in [{section}] {option}")]
    Interpolation {
        section: String,
        option: String,
        key: String,
    },

    /// An extension is declared without an attribute it needs.
    #[error("Extension '{extension}' is missing required attribute '{attribute}'")]
    MissingAttribute { extension: String, attribute: String },

    /// An extension declares an attribute no extension kind understands.
    #[error("Extension '{extension}' has unknown attribute '{attribute}'")]
    UnknownAttribute { extension: String, attribute: String },

    /// An extension name contains characters outside `[A-Za-z0-9_-]`.
    #[error("Invalid extension name '{name}': only letters, digits, '_' and '-' are allowed")]
    InvalidExtensionName { name: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A directory traversal error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    /// Whether this error reports a lifecycle or cleanliness precondition.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::AlreadyInitialized { .. }
                | Error::NotInitialized { .. }
                | Error::LocalModifications { .. }
        )
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
