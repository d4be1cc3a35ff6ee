//! # Ignore Fragments and the Generated Manifest
//!
//! Several independent producers decide which paths of the core tree are
//! not first-party content: the core refresh owns the files copied from the
//! core source, and every extension owns the overlay links it placed.
//! Each producer writes exactly one fragment per set, a plain list of
//! patterns stored at `<meta>/ignore/<producer>` (or `unignore/<producer>`
//! for patterns that must be negated). Writing a fragment replaces it.
//!
//! The `.gitignore` at the core root is derived from the fragment set and
//! nothing else. It is regenerated after any fragment changes and must
//! never be edited by hand: ignore fragments come first, each introduced by
//! a comment naming its producer, followed by the unignore fragments with
//! every pattern negated. Fragments are visited in file-name order, so the
//! manifest is reproducible byte-for-byte.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File name of the generated manifest inside the core tree
pub const MANIFEST_FILE: &str = ".gitignore";

/// One of the two fragment sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Ignore,
    Unignore,
}

impl FragmentKind {
    /// Directory name of the set inside the metadata directory.
    pub fn dir_name(&self) -> &'static str {
        match self {
            FragmentKind::Ignore => "ignore",
            FragmentKind::Unignore => "unignore",
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A producer's patterns as read back from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub producer: String,
    pub patterns: Vec<String>,
}

/// Reads and writes fragments and regenerates the manifest
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    meta_dir: PathBuf,
    manifest_path: PathBuf,
    meta_label: String,
}

impl IgnoreSet {
    /// Fragments live under `meta_dir`; the manifest is written to `manifest_path`.
    pub fn new(meta_dir: impl Into<PathBuf>, manifest_path: impl Into<PathBuf>) -> Self {
        let meta_dir = meta_dir.into();
        let meta_label = meta_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            meta_dir,
            manifest_path: manifest_path.into(),
            meta_label,
        }
    }

    /// Directory holding the fragments of `kind`.
    pub fn fragment_dir(&self, kind: FragmentKind) -> PathBuf {
        self.meta_dir.join(kind.dir_name())
    }

    /// Path of the generated manifest.
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Replace `producer`'s fragment in `kind` with `patterns`.
    pub fn write_fragment<I, S>(&self, producer: &str, kind: FragmentKind, patterns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dir = self.fragment_dir(kind);
        fs::create_dir_all(&dir)?;

        let mut contents = String::new();
        for pattern in patterns {
            contents.push_str(pattern.as_ref());
            contents.push('\n');
        }
        fs::write(dir.join(producer), contents)?;
        Ok(())
    }

    /// Read `producer`'s fragment, or `None` if it has never been written.
    pub fn read_fragment(&self, producer: &str, kind: FragmentKind) -> Result<Option<Fragment>> {
        let path = self.fragment_dir(kind).join(producer);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(Fragment {
            producer: producer.to_string(),
            patterns: parse_patterns(&fs::read_to_string(path)?),
        }))
    }

    /// Every fragment of `kind`, sorted by producer name.
    ///
    /// A missing set directory yields no fragments.
    pub fn fragments(&self, kind: FragmentKind) -> Result<Vec<Fragment>> {
        let dir = self.fragment_dir(kind);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut producers = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                producers.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        producers.sort();

        let mut fragments = Vec::with_capacity(producers.len());
        for producer in producers {
            fragments.push(Fragment {
                patterns: parse_patterns(&fs::read_to_string(dir.join(&producer))?),
                producer,
            });
        }
        Ok(fragments)
    }

    /// Build the manifest text from the current fragment set.
    pub fn render_manifest(&self) -> Result<String> {
        let label = &self.meta_label;
        let mut out = format!(
            "# Autogenerated by coretree. Do not edit by hand\n\
             # Add files to ignore in {label}/ignore\n\
             # Add files to un-ignore in {label}/unignore\n"
        );

        out.push_str("\n# Ignore files\n\n");
        let ignores = self.fragment_lines(FragmentKind::Ignore, "")?;
        out.push_str(&ignores.join("\n"));

        out.push_str("\n\n# Unignore files\n\n");
        let unignores = self.fragment_lines(FragmentKind::Unignore, "!")?;
        out.push_str(&unignores.join("\n"));
        out.push('\n');

        Ok(out)
    }

    /// Rewrite the manifest from the current fragment set.
    pub fn regenerate_manifest(&self) -> Result<()> {
        let manifest = self.render_manifest()?;
        fs::write(&self.manifest_path, manifest)?;
        Ok(())
    }

    fn fragment_lines(&self, kind: FragmentKind, prefix: &str) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for fragment in self.fragments(kind)? {
            lines.push(format!("# {}/{}/{}", self.meta_label, kind, fragment.producer));
            lines.extend(
                fragment
                    .patterns
                    .iter()
                    .map(|pattern| format!("{prefix}{pattern}")),
            );
        }
        Ok(lines)
    }
}

/// Patterns of a fragment file: comment and blank lines are dropped.
fn parse_patterns(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
