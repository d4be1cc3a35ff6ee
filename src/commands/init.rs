//! # Init Command Implementation
//!
//! This module implements the `init` subcommand, which creates a new project
//! at the project root.
//!
//! ## Functionality
//!
//! - **Scaffold**: Renders the bundled scaffold, or the `--templates`
//!   directory, into `core/.coretree`.
//!   Variables come from `--var KEY=VALUE`; `--source` is shorthand for the
//!   `core_source` variable used by the bundled configuration template.
//! - **History**: Commits the scaffold, imports the core source and commits
//!   it, then clones and overlays the configured extensions.
//!
//! Nothing is written when a template needs a variable that was not given.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::Args;

use coretree::engine::CompositionEngine;
use coretree::output::{highlight, marker, OutputConfig, Status};
use coretree::templates::TemplateVars;

/// Template variable holding the core source location
pub const CORE_SOURCE_VAR: &str = "core_source";

/// Create a new project from the scaffold templates
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Location of the core source (sets the `core_source` variable).
    ///
    /// Clone flags may precede the URL, e.g. "--depth=1 https://...".
    #[arg(long, value_name = "LOCATION", allow_hyphen_values = true)]
    pub source: Option<String>,

    /// Template variable, may be repeated.
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Directory holding the scaffold templates [default: bundled scaffold]
    #[arg(long, value_name = "DIR", env = "CORETREE_TEMPLATES")]
    pub templates: Option<PathBuf>,
}

impl InitArgs {
    /// Variables handed to the templates; `--source` wins over `--var core_source=`.
    pub fn variables(&self) -> TemplateVars {
        let mut vars: TemplateVars = self.vars.iter().cloned().collect();
        if let Some(source) = &self.source {
            vars.insert(CORE_SOURCE_VAR.to_string(), source.clone());
        }
        vars
    }
}

fn parse_var(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("variable name is empty in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Execute the `init` command.
pub fn execute(args: InitArgs, root: &Path, out: &OutputConfig) -> Result<()> {
    let variables = args.variables();

    println!(
        "{} Initializing project at {}",
        marker(out, Status::Working),
        highlight(out, root.display())
    );

    let mut engine = CompositionEngine::new(root);
    if let Some(templates) = args.templates {
        engine = engine.with_template_root(templates);
    }
    engine.initialize(&variables)?;

    println!(
        "{} Project ready; extension overlays are left uncommitted",
        marker(out, Status::Done)
    );
    Ok(())
}
