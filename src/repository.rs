//! # Repository Client
//!
//! This module defines the seam between the composition engine and version
//! control. The engine never shells out directly; it talks to a
//! [`GitOperations`] implementation handed to it at construction time.
//!
//! In the main application [`DefaultGitOperations`] is used, which wraps the
//! system `git` command (see [`crate::git`]). In tests it is replaced with
//! mock implementations that record calls and fake working copies, so the
//! engine's sequencing and safety checks can be verified without real
//! repositories.
//!
//! Every call is blocking and reports a non-zero exit as
//! [`crate::error::Error::GitCommand`] with the captured diagnostics.

use crate::error::Result;
use std::path::Path;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations {
    /// Clones `location` into `dest_dir`.
    ///
    /// `location` may contain whitespace-separated clone flags before the URL.
    fn clone_repo(&self, location: &str, dest_dir: &Path) -> Result<()>;

    /// Pulls the upstream branch into the working copy at `dir`.
    fn pull(&self, dir: &Path) -> Result<()>;

    /// Returns the porcelain status text of the working copy at `dir`.
    fn status(&self, dir: &Path) -> Result<String>;

    /// Removes untracked and ignored files from the working copy at `dir`.
    fn clean(&self, dir: &Path) -> Result<()>;

    /// Stages `paths` in the working copy at `dir`.
    fn add(&self, dir: &Path, paths: &[&str]) -> Result<()>;

    /// Commits the staged changes at `dir`.
    fn commit(&self, dir: &Path, message: &str) -> Result<()>;

    /// Initializes a new repository at `dir`.
    fn init(&self, dir: &Path) -> Result<()>;

    /// Whether the working copy at `dir` has local modifications.
    fn is_modified(&self, dir: &Path) -> Result<bool> {
        Ok(status_reports_changes(&self.status(dir)?))
    }
}

/// Whether porcelain status output lists any change.
pub fn status_reports_changes(status: &str) -> bool {
    status.lines().any(|line| !line.trim().is_empty())
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_repo(&self, location: &str, dest_dir: &Path) -> Result<()> {
        crate::git::clone(location, dest_dir)
    }

    fn pull(&self, dir: &Path) -> Result<()> {
        crate::git::pull(dir)
    }

    fn status(&self, dir: &Path) -> Result<String> {
        crate::git::status(dir)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        crate::git::clean(dir)
    }

    fn add(&self, dir: &Path, paths: &[&str]) -> Result<()> {
        crate::git::add(dir, paths)
    }

    fn commit(&self, dir: &Path, message: &str) -> Result<()> {
        crate::git::commit(dir, message)
    }

    fn init(&self, dir: &Path) -> Result<()> {
        crate::git::init(dir)
    }
}
