//! # Clone Command Implementation
//!
//! Attaches to a project that already lives in a remote repository by
//! cloning it as the core tree. No scaffold is rendered and no extension is
//! fetched; run `coretree update --extensions-only` afterwards.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use coretree::engine::CompositionEngine;
use coretree::output::{highlight, marker, OutputConfig, Status};

/// Clone an existing project
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Repository location, optionally preceded by clone flags.
    #[arg(
        value_name = "LOCATION",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub location: Vec<String>,
}

impl CloneArgs {
    /// The location tokens as one whitespace-separated string.
    pub fn location(&self) -> String {
        self.location.join(" ")
    }
}

/// Execute the `clone` command.
pub fn execute(args: CloneArgs, root: &Path, out: &OutputConfig) -> Result<()> {
    let location = args.location();
    println!(
        "{} Cloning {} into {}",
        marker(out, Status::Working),
        location,
        highlight(out, root.display())
    );

    CompositionEngine::new(root).clone_into(&location)?;

    println!("{} Project cloned", marker(out, Status::Done));
    Ok(())
}
