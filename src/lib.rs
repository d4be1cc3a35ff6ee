//! # coretree
//!
//! Composes a working tree from one core repository and any number of
//! extension repositories. The core source is copied into a managed git
//! working copy; every extension is cloned next to it and overlaid onto the
//! core tree with relative symbolic links. A generated `.gitignore` keeps
//! everything that came from elsewhere out of the project's own history,
//! so only first-party files are committed.
//!
//! ## Quick Example
//!
//! ```no_run
//! use coretree::engine::CompositionEngine;
//! use coretree::templates::TemplateVars;
//!
//! let engine = CompositionEngine::new("/srv/shop");
//!
//! let mut vars = TemplateVars::new();
//! vars.insert("core_source".into(), "https://example.com/core.git".into());
//! engine.initialize(&vars)?;
//!
//! // Later: bring core and extensions up to date
//! engine.refresh_all()?;
//! # Ok::<(), coretree::error::Error>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Project layout (`project`)**: where the core tree, extension copies,
//!   configuration and fragments live below the project root.
//! - **Configuration (`config`)**: the persisted `coretree.ini` naming the
//!   core source and the extensions.
//! - **Repository access (`repository`, `git`)**: a mockable seam over the
//!   system `git` command.
//! - **Templates (`templates`)**: renders the metadata scaffold at init time.
//! - **Ignore fragments (`ignore_set`)**: per-producer ignore lists merged
//!   into the generated manifest.
//! - **Overlay (`reconcile`)**: idempotent symlinking of extension files into
//!   the core tree.
//! - **Engine (`engine`)**: sequences all of the above and refuses to touch
//!   working copies with local modifications.
//!
//! ## Concurrency
//!
//! Every operation is synchronous and blocking, including the external git
//! processes, which have no timeout. Nothing guards a project against two
//! simultaneous runs: run at most one instance per project.

pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod ignore_set;
pub mod output;
pub mod path;
pub mod project;
pub mod reconcile;
pub mod reporter;
pub mod repository;
pub mod templates;

#[cfg(test)]
mod path_proptest;
