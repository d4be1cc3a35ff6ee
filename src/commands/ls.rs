//! # Ls Command Implementation
//!
//! Lists the configured extensions with their source, whether a working
//! copy is present and how many overlay paths their fragment records.
//!
//! This command is read-only.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use coretree::config::Extension;
use coretree::ignore_set::FragmentKind;
use coretree::output::{highlight, marker, OutputConfig, Status};
use coretree::project::{extension_producer, Project};

/// List the configured extensions
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Print only the extension names.
    #[arg(short, long)]
    pub quiet: bool,
}

/// One row of the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRow {
    pub name: String,
    pub source: String,
    pub present: bool,
    pub overlaid: Option<usize>,
}

/// Collect the listing rows for `extensions` of `project`.
pub fn rows(project: &Project, extensions: &[Extension]) -> Result<Vec<ExtensionRow>> {
    let ignore_set = project.ignore_set();
    extensions
        .iter()
        .map(|extension| {
            let fragment = ignore_set
                .read_fragment(&extension_producer(&extension.name), FragmentKind::Ignore)?;
            Ok(ExtensionRow {
                name: extension.name.clone(),
                source: extension.source().to_string(),
                present: project.extension_dir(&extension.name).is_dir(),
                overlaid: fragment.map(|fragment| fragment.patterns.len()),
            })
        })
        .collect()
}

/// Execute the `ls` command.
pub fn execute(args: LsArgs, root: &Path, out: &OutputConfig) -> Result<()> {
    let project = Project::new(root);
    let config = project.config()?;
    let extensions = config.extensions()?;
    let rows = rows(&project, &extensions)?;

    if args.quiet {
        for row in &rows {
            println!("{}", row.name);
        }
        return Ok(());
    }

    println!(
        "{} core: {}",
        marker(out, Status::Info),
        config.core_source().unwrap_or_else(|_| "(no source)".to_string())
    );

    if rows.is_empty() {
        println!("No extensions configured");
        return Ok(());
    }

    let width = rows.iter().map(|row| row.name.len()).max().unwrap_or(0);
    for row in &rows {
        let state = match (row.present, row.overlaid) {
            (false, _) => "not cloned".to_string(),
            (true, None) => "cloned, not overlaid".to_string(),
            (true, Some(count)) => format!("{count} paths overlaid"),
        };
        println!(
            "{}  {}  ({})",
            highlight(out, format!("{:width$}", row.name)),
            row.source,
            state
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coretree::config::ProjectConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_rows_report_presence_and_overlay_counts() {
        let temp = TempDir::new().unwrap();
        let project = Project::new(temp.path());
        let config = ProjectConfig::parse(
            "[extensions]\npayments.source = payments-repo\nsearch.source = search-repo\n",
            temp.path(),
        )
        .unwrap();

        fs::create_dir_all(project.extension_dir("payments")).unwrap();
        project
            .ignore_set()
            .write_fragment("extension.payments", FragmentKind::Ignore, ["/A", "/B"])
            .unwrap();

        let rows = rows(&project, &config.extensions().unwrap()).unwrap();
        assert_eq!(
            rows,
            vec![
                ExtensionRow {
                    name: "payments".to_string(),
                    source: "payments-repo".to_string(),
                    present: true,
                    overlaid: Some(2),
                },
                ExtensionRow {
                    name: "search".to_string(),
                    source: "search-repo".to_string(),
                    present: false,
                    overlaid: None,
                },
            ]
        );
    }
}
