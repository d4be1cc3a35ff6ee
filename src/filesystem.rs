//! Directory traversal and copy helpers
//!
//! The composition engine needs three things from the host filesystem: a
//! recursive walk that yields `(relative path, kind)` pairs, a shallow
//! listing of the visible entries of one directory, and an additive tree
//! copy. All three are built on `walkdir` and never follow symlinks.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;
use crate::path::is_hidden;

/// What a directory entry is, without following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
}

impl EntryKind {
    fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        }
    }

    /// Human readable description, used in conflict messages.
    pub fn describe(&self) -> &'static str {
        match self {
            EntryKind::File => "regular file",
            EntryKind::Dir => "directory",
            EntryKind::Symlink => "symlink",
        }
    }
}

/// One entry found under a walk root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path relative to the walk root
    pub relative: PathBuf,
    pub kind: EntryKind,
}

impl TreeEntry {
    /// Final component of the relative path as UTF-8 (lossy).
    pub fn name(&self) -> String {
        self.relative
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Recursively walk `root`, yielding every entry below it in file-name order.
///
/// Entries whose file name satisfies `skip` are omitted together with their
/// whole subtree. The root itself is never yielded.
pub fn walk_tree<'a, F>(root: &'a Path, skip: F) -> impl Iterator<Item = Result<TreeEntry>> + 'a
where
    F: Fn(&str) -> bool + 'a,
{
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| !skip(&entry.file_name().to_string_lossy()))
        .map(move |entry| {
            let entry = entry?;
            // Every yielded entry sits below root because of min_depth(1)
            let relative = entry
                .path()
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| entry.path().to_path_buf());
            Ok(TreeEntry {
                relative,
                kind: EntryKind::from_file_type(entry.file_type()),
            })
        })
}

/// List the direct, non-hidden entries of `dir` sorted by name.
pub fn visible_entries(dir: &Path) -> Result<Vec<TreeEntry>> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(&entry.file_name().to_string_lossy()))
        .map(|entry| {
            let entry = entry?;
            Ok(TreeEntry {
                relative: PathBuf::from(entry.file_name()),
                kind: EntryKind::from_file_type(entry.file_type()),
            })
        })
        .collect()
}

/// Kind of whatever sits at `path`, without following a final symlink.
///
/// Returns `None` when nothing exists there (a dangling link still counts).
pub fn entry_kind(path: &Path) -> Result<Option<EntryKind>> {
    match fs::symlink_metadata(path) {
        Ok(metadata) => Ok(Some(EntryKind::from_file_type(metadata.file_type()))),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Copy every entry under `src` into `dest`, skipping names matching `skip`.
///
/// The copy is additive: existing files are overwritten, existing
/// directories are kept, and nothing that is absent from `src` is removed.
/// Newly created directories take the permissions of their source.
/// Returns the number of files copied.
pub fn copy_tree<F>(src: &Path, dest: &Path, skip: F) -> Result<usize>
where
    F: Fn(&str) -> bool,
{
    let mut copied = 0;

    for entry in walk_tree(src, skip) {
        let entry = entry?;
        let from = src.join(&entry.relative);
        let to = dest.join(&entry.relative);

        match entry.kind {
            EntryKind::Dir => {
                if !to.is_dir() {
                    fs::create_dir_all(&to)?;
                    fs::set_permissions(&to, fs::metadata(&from)?.permissions())?;
                }
            }
            EntryKind::File => {
                if entry_kind(&to)? == Some(EntryKind::Symlink) {
                    fs::remove_file(&to)?;
                }
                fs::copy(&from, &to)?;
                copied += 1;
            }
            EntryKind::Symlink => match entry_kind(&to)? {
                Some(EntryKind::Dir) => {}
                Some(_) => {
                    fs::remove_file(&to)?;
                    create_symlink(&fs::read_link(&from)?, &to)?;
                }
                None => create_symlink(&fs::read_link(&from)?, &to)?,
            },
        }
    }

    Ok(copied)
}

/// Create a symbolic link at `link` storing `target` verbatim.
#[cfg(unix)]
pub fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}

/// Create a symbolic link at `link` storing `target` verbatim.
#[cfg(windows)]
pub fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    let resolved = link.parent().unwrap_or_else(|| Path::new(".")).join(target);
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)?;
    } else {
        std::os::windows::fs::symlink_file(target, link)?;
    }
    Ok(())
}
