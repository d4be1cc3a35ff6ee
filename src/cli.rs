//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use coretree::output::OutputConfig;

use crate::commands;

/// coretree - Compose a core repository and its extensions into one tree
#[derive(Parser, Debug)]
#[command(name = "coretree")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Project root directory (defaults to the current directory)
    #[arg(
        short = 'C',
        long,
        global = true,
        value_name = "DIR",
        env = "CORETREE_ROOT"
    )]
    root: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new project from the scaffold templates
    Init(commands::init::InitArgs),

    /// Attach to an existing project by cloning its core tree
    Clone(commands::clone::CloneArgs),

    /// Refresh the core tree and the extensions from their sources
    Update(commands::update::UpdateArgs),

    /// List the configured extensions
    Ls(commands::ls::LsArgs),

    /// Rebuild the generated .gitignore from the ignore fragments
    Regenerate(commands::regenerate::RegenerateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let out = OutputConfig::from_env_and_flag(&self.color);
        let root = project_root(self.root)?;

        match self.command {
            Commands::Init(args) => commands::init::execute(args, &root, &out),
            Commands::Clone(args) => commands::clone::execute(args, &root, &out),
            Commands::Update(args) => commands::update::execute(args, &root, &out),
            Commands::Ls(args) => commands::ls::execute(args, &root, &out),
            Commands::Regenerate(args) => commands::regenerate::execute(args, &root, &out),
        }
    }
}

/// Install `env_logger` with `level` unless `RUST_LOG` says otherwise.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when running under a test harness
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

/// Absolute project root from `--root`, falling back to the current directory.
fn project_root(root: Option<PathBuf>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    std::path::absolute(&root)
        .with_context(|| format!("Failed to resolve project root {}", root.display()))
}
