//! # Regenerate Command Implementation
//!
//! Rebuilds `core/.gitignore` from the fragments under `.coretree/ignore`
//! and `.coretree/unignore`. Use it after adding or editing a fragment by
//! hand; no repository is touched.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use coretree::engine::CompositionEngine;
use coretree::output::{marker, OutputConfig, Status};

/// Rebuild the generated .gitignore
#[derive(Args, Debug)]
pub struct RegenerateArgs {}

/// Execute the `regenerate` command.
pub fn execute(_args: RegenerateArgs, root: &Path, out: &OutputConfig) -> Result<()> {
    let engine = CompositionEngine::new(root);
    engine.regenerate_manifest()?;

    println!(
        "{} Regenerated {}",
        marker(out, Status::Done),
        engine.project().manifest_path().display()
    );
    Ok(())
}
