//! Filesystem layout of a composed project
//!
//! ```text
//! <root>/
//!   core/                      managed core working copy
//!     .coretree/coretree.ini   persisted configuration
//!     .coretree/ignore/        ignore fragments, one file per producer
//!     .coretree/unignore/      unignore fragments, one file per producer
//!     .gitignore               generated manifest
//!   extensions/<name>/         one working copy per extension
//! ```

use std::path::{Path, PathBuf};

use crate::config::ProjectConfig;
use crate::error::{Error, Result};
use crate::ignore_set::{FragmentKind, IgnoreSet, MANIFEST_FILE};
use crate::reconcile::SymlinkReconciler;

/// Name of the core working copy below the project root
pub const CORE_DIR: &str = "core";
/// Name of the directory holding extension working copies
pub const EXTENSIONS_DIR: &str = "extensions";
/// Name of the metadata directory inside the core tree
pub const META_DIR: &str = ".coretree";
/// Name of the configuration file inside the metadata directory
pub const CONFIG_FILE: &str = "coretree.ini";

/// Fragment producer name used by the core refresh
pub const CORE_PRODUCER: &str = "core";

/// Fragment producer name used by an extension.
pub fn extension_producer(name: &str) -> String {
    format!("extension.{name}")
}

/// Paths of one project rooted at `root`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn core_dir(&self) -> PathBuf {
        self.root.join(CORE_DIR)
    }

    pub fn extensions_dir(&self) -> PathBuf {
        self.root.join(EXTENSIONS_DIR)
    }

    /// Working copy of the extension `name`.
    pub fn extension_dir(&self, name: &str) -> PathBuf {
        self.extensions_dir().join(name)
    }

    pub fn meta_dir(&self) -> PathBuf {
        self.core_dir().join(META_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.meta_dir().join(CONFIG_FILE)
    }

    pub fn fragment_dir(&self, kind: FragmentKind) -> PathBuf {
        self.meta_dir().join(kind.dir_name())
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.core_dir().join(MANIFEST_FILE)
    }

    /// A project exists once its configuration file is in place.
    pub fn exists(&self) -> bool {
        self.config_path().is_file()
    }

    /// Fail with [`Error::AlreadyInitialized`] if the project exists.
    pub fn ensure_absent(&self) -> Result<()> {
        if self.exists() {
            return Err(Error::AlreadyInitialized {
                path: self.root.clone(),
            });
        }
        Ok(())
    }

    /// Fail with [`Error::NotInitialized`] unless the project exists.
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.exists() {
            return Err(Error::NotInitialized {
                root: self.root.clone(),
                config: self.config_path(),
            });
        }
        Ok(())
    }

    /// Read the persisted configuration, fresh from disk.
    pub fn config(&self) -> Result<ProjectConfig> {
        self.ensure_exists()?;
        ProjectConfig::from_file(&self.config_path(), &self.root)
    }

    pub fn ignore_set(&self) -> IgnoreSet {
        IgnoreSet::new(self.meta_dir(), self.manifest_path())
    }

    pub fn reconciler(&self) -> SymlinkReconciler {
        SymlinkReconciler::new(self.core_dir(), self.extensions_dir())
    }
}
