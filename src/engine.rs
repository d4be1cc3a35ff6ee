//! # Composition Engine
//!
//! Orchestrates the lifecycle of a composed project:
//!
//! 1. [`CompositionEngine::initialize`] renders the metadata scaffold,
//!    commits it, pulls in the core source and the extensions.
//! 2. [`CompositionEngine::clone_into`] attaches to a project that already
//!    lives in a remote repository.
//! 3. [`CompositionEngine::refresh_core`] and
//!    [`CompositionEngine::refresh_extensions`] bring an existing project up
//!    to date with its sources.
//!
//! A working copy with local modifications is never refreshed: the
//! operation stops with [`Error::LocalModifications`] before cleaning,
//! fetching or copying anything.
//!
//! The configuration is read fresh from disk by every operation. Git,
//! template rendering and progress reporting are injected so each can be
//! replaced in tests.
//!
//! There is no locking. Run at most one engine per project at a time;
//! concurrent runs race on the manifest and on repository state.

use std::fs;
use std::path::{Path, PathBuf};

use crate::defaults::BUNDLED_SCAFFOLD;
use crate::error::{Error, Result};
use crate::filesystem::copy_tree;
use crate::ignore_set::FragmentKind;
use crate::path::is_git_metadata;
use crate::project::{extension_producer, Project, CORE_DIR, CORE_PRODUCER};
use crate::reporter::{LogReporter, Reporter};
use crate::repository::{DefaultGitOperations, GitOperations};
use crate::templates::{
    render_bundled, render_tree, write_scaffold, JinjaRenderer, TemplateRenderer, TemplateVars,
};

/// Commit message for the rendered scaffold
pub const BASE_COMMIT_MESSAGE: &str = "Base coretree project";
/// Commit message for the first core import
pub const CORE_COMMIT_MESSAGE: &str = "Added core";

/// How an extension working copy was brought up to date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchAction {
    Cloned,
    Pulled,
}

/// Result of refreshing the core tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreRefresh {
    /// Number of files copied from the fetched core source
    pub files_copied: usize,
    /// Patterns recorded in the core fragment
    pub owned: Vec<String>,
}

/// Result of refreshing one extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRefresh {
    pub name: String,
    pub action: FetchAction,
    /// Paths overlaid into the core tree, relative to its root
    pub owned: Vec<PathBuf>,
}

/// Sequences repository, template, overlay and manifest operations
pub struct CompositionEngine {
    project: Project,
    git: Box<dyn GitOperations>,
    renderer: Box<dyn TemplateRenderer>,
    reporter: Box<dyn Reporter>,
    template_root: Option<PathBuf>,
}

impl CompositionEngine {
    /// Engine for the project at `root` using the system git, the Jinja
    /// renderer and the log reporter.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            project: Project::new(root),
            git: Box::new(DefaultGitOperations),
            renderer: Box::new(JinjaRenderer),
            reporter: Box::new(LogReporter),
            template_root: None,
        }
    }

    pub fn with_git(mut self, git: impl GitOperations + 'static) -> Self {
        self.git = Box::new(git);
        self
    }

    pub fn with_renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Directory the scaffold templates are read from instead of the
    /// bundled scaffold.
    pub fn with_template_root(mut self, template_root: impl Into<PathBuf>) -> Self {
        self.template_root = Some(template_root.into());
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Create a new project from the scaffold templates.
    ///
    /// The scaffold is rendered completely before anything is written, so a
    /// template referencing a variable missing from `variables` fails with
    /// [`Error::Template`] and leaves no trace. Afterwards the scaffold and
    /// the first core import are committed separately; the extension
    /// overlay is left uncommitted.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyInitialized`] if the project exists.
    /// - Any error of [`CompositionEngine::refresh_all`].
    pub fn initialize(&self, variables: &TemplateVars) -> Result<()> {
        self.project.ensure_absent()?;

        let scaffold = match &self.template_root {
            Some(root) => render_tree(self.renderer.as_ref(), root, variables)?,
            None => render_bundled(self.renderer.as_ref(), BUNDLED_SCAFFOLD, variables)?,
        };

        let core = self.project.core_dir();
        let meta = self.project.meta_dir();
        fs::create_dir_all(&core)?;
        fs::create_dir_all(self.project.extensions_dir())?;
        fs::create_dir_all(&meta)?;

        self.reporter
            .info(&format!("Writing project scaffold to {}", meta.display()));
        write_scaffold(&meta, &scaffold)?;
        fs::create_dir_all(self.project.fragment_dir(FragmentKind::Ignore))?;
        fs::create_dir_all(self.project.fragment_dir(FragmentKind::Unignore))?;
        self.project.ignore_set().regenerate_manifest()?;

        self.reporter
            .debug(&format!("Committing scaffold in {}", core.display()));
        self.git.init(&core)?;
        self.git.add(&core, &["."])?;
        self.git.commit(&core, BASE_COMMIT_MESSAGE)?;

        self.refresh_core()?;
        self.reporter
            .debug(&format!("Committing core import in {}", core.display()));
        self.git.add(&core, &["."])?;
        self.git.commit(&core, CORE_COMMIT_MESSAGE)?;

        self.refresh_extensions()?;
        Ok(())
    }

    /// Clone an existing project's core tree from `location`.
    ///
    /// No scaffold is rendered; the cloned tree carries its own.
    pub fn clone_into(&self, location: &str) -> Result<()> {
        self.project.ensure_absent()?;

        fs::create_dir_all(self.project.root())?;
        self.reporter.info(&format!("Cloning project from {location}"));
        self.git.clone_repo(location, &self.project.core_dir())
    }

    /// Replace the core tree's files with a fresh copy of the core source.
    ///
    /// Untracked and ignored files are removed first. The copy is additive:
    /// files deleted upstream stay in place. The top-level entries of the
    /// fetched source become the core fragment.
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`] if the project does not exist.
    /// - [`Error::LocalModifications`] if the core tree has changes.
    pub fn refresh_core(&self) -> Result<CoreRefresh> {
        let config = self.project.config()?;
        let source = config.core_source()?;
        let core = self.project.core_dir();

        if self.git.is_modified(&core)? {
            return Err(Error::LocalModifications {
                repo: CORE_DIR.to_string(),
                dir: core,
            });
        }
        self.reporter
            .debug(&format!("Removing untracked files from {}", core.display()));
        self.git.clean(&core)?;

        self.reporter.info(&format!("Updating core from {source}"));
        // Removed on drop, whichever way this function returns
        let staging = tempfile::Builder::new().prefix("coretree").tempdir()?;
        let checkout = staging.path().join(CORE_DIR);
        self.git.clone_repo(&source, &checkout)?;

        let files_copied = copy_tree(&checkout, &core, is_git_metadata)?;
        self.reporter
            .debug(&format!("Copied {files_copied} files into {}", core.display()));

        let owned: Vec<String> = top_level_entries(&checkout)?
            .into_iter()
            .map(|name| format!("/{name}"))
            .collect();

        let ignore_set = self.project.ignore_set();
        ignore_set.write_fragment(CORE_PRODUCER, FragmentKind::Ignore, &owned)?;
        ignore_set.regenerate_manifest()?;

        Ok(CoreRefresh {
            files_copied,
            owned,
        })
    }

    /// Clone or pull every configured extension and overlay it onto the core.
    ///
    /// Extensions are processed one after another in declaration order. The
    /// whole extension table is validated before the first git call.
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`] if the project does not exist.
    /// - Configuration errors for invalid extension declarations.
    /// - [`Error::LocalModifications`] if an extension copy has changes.
    /// - [`Error::LinkConflict`] if an overlay destination is occupied.
    pub fn refresh_extensions(&self) -> Result<Vec<ExtensionRefresh>> {
        let config = self.project.config()?;
        let extensions = config.extensions()?;

        fs::create_dir_all(self.project.extensions_dir())?;

        let ignore_set = self.project.ignore_set();
        let reconciler = self.project.reconciler();
        let mut refreshed = Vec::with_capacity(extensions.len());

        for extension in &extensions {
            let dir = self.project.extension_dir(&extension.name);

            let action = if dir.exists() {
                if self.git.is_modified(&dir)? {
                    return Err(Error::LocalModifications {
                        repo: format!("extension {}", extension.name),
                        dir,
                    });
                }
                self.reporter
                    .info(&format!("Pulling extension {}", extension.name));
                self.git.pull(&dir)?;
                FetchAction::Pulled
            } else {
                self.reporter.info(&format!(
                    "Cloning extension {} from {}",
                    extension.name,
                    extension.source()
                ));
                self.git.clone_repo(extension.source(), &dir)?;
                FetchAction::Cloned
            };

            let owned = reconciler.reconcile(&extension.name, self.reporter.as_ref())?;
            if owned.is_empty() {
                self.reporter.warn(&format!(
                    "Extension {} has nothing to overlay",
                    extension.name
                ));
            }

            ignore_set.write_fragment(
                &extension_producer(&extension.name),
                FragmentKind::Ignore,
                owned.iter().map(|path| anchored(path)),
            )?;
            ignore_set.regenerate_manifest()?;

            refreshed.push(ExtensionRefresh {
                name: extension.name.clone(),
                action,
                owned,
            });
        }

        if !refreshed.is_empty() {
            self.reporter
                .info("Ignore manifest updated; the core tree may show local modifications");
        }
        Ok(refreshed)
    }

    /// [`CompositionEngine::refresh_core`] followed by
    /// [`CompositionEngine::refresh_extensions`].
    pub fn refresh_all(&self) -> Result<(CoreRefresh, Vec<ExtensionRefresh>)> {
        let core = self.refresh_core()?;
        let extensions = self.refresh_extensions()?;
        Ok((core, extensions))
    }

    /// Rebuild the manifest from the fragments on disk.
    pub fn regenerate_manifest(&self) -> Result<()> {
        self.project.ensure_exists()?;
        self.project.ignore_set().regenerate_manifest()
    }
}

/// Names directly inside `dir`, excluding git metadata, sorted.
fn top_level_entries(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if !is_git_metadata(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Ignore pattern matching `relative` only at the core root.
fn anchored(relative: &Path) -> String {
    let parts: Vec<_> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect();
    format!("/{}", parts.join("/"))
}
