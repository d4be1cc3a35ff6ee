//! # Update Command Implementation
//!
//! This module implements the `update` subcommand, which refreshes an
//! existing project from its sources.
//!
//! ## Functionality
//!
//! - **Core**: cleans the core tree, fetches the core source and copies it
//!   over. Files removed upstream are kept.
//! - **Extensions**: pulls existing extension working copies, clones new
//!   ones and overlays them onto the core tree.
//!
//! Both steps run by default; `--core-only` and `--extensions-only` select
//! one. A working copy with local modifications stops the update before
//! anything in it is touched.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use coretree::engine::{CompositionEngine, ExtensionRefresh, FetchAction};
use coretree::output::{highlight, marker, OutputConfig, Status};

/// Refresh the core tree and the extensions
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Only refresh the core tree.
    #[arg(long, conflicts_with = "extensions_only")]
    pub core_only: bool,

    /// Only refresh the extensions.
    #[arg(long)]
    pub extensions_only: bool,
}

/// Execute the `update` command.
pub fn execute(args: UpdateArgs, root: &Path, out: &OutputConfig) -> Result<()> {
    let engine = CompositionEngine::new(root);

    if !args.extensions_only {
        println!("{} Updating core", marker(out, Status::Working));
        let core = engine.refresh_core()?;
        println!(
            "{} Core updated: {} files copied, {} top-level entries",
            marker(out, Status::Done),
            core.files_copied,
            core.owned.len()
        );
    }

    if !args.core_only {
        println!("{} Updating extensions", marker(out, Status::Working));
        let extensions = engine.refresh_extensions()?;
        report_extensions(&extensions, out);
    }

    Ok(())
}

fn report_extensions(extensions: &[ExtensionRefresh], out: &OutputConfig) {
    if extensions.is_empty() {
        println!("{} No extensions configured", marker(out, Status::Info));
        return;
    }

    for extension in extensions {
        let action = match extension.action {
            FetchAction::Cloned => "cloned",
            FetchAction::Pulled => "pulled",
        };
        println!(
            "{} {} {}, {} paths overlaid",
            marker(out, Status::Done),
            highlight(out, &extension.name),
            action,
            extension.owned.len()
        );
    }
    println!(
        "{} .gitignore regenerated; the core tree may show local modifications",
        marker(out, Status::Warning)
    );
}
