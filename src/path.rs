//! Path manipulation utilities for coretree
//!
//! Overlay links are relative so a project tree keeps working after it is
//! moved or mounted elsewhere. The helpers here compute those relative
//! targets from two absolute paths and resolve existing link targets back
//! into comparable absolute paths. Everything is lexical; nothing here
//! touches the filesystem.

use std::path::{Component, Path, PathBuf};

/// Collapse `.` and `..` components without consulting the filesystem.
///
/// `..` at the root of an absolute path stays at the root. Leading `..`
/// components of a relative path are preserved.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Compute the target to store in a symlink placed inside `link_dir` so that
/// it resolves to `target`.
///
/// Both paths must be absolute (or both relative to the same base). The
/// result never starts with `./`; when `target` is `link_dir` itself the
/// result is `.`.
pub fn relative_link_target(link_dir: &Path, target: &Path) -> PathBuf {
    let from = normalize_lexically(link_dir);
    let to = normalize_lexically(target);

    let from_parts: Vec<Component<'_>> = from.components().collect();
    let to_parts: Vec<Component<'_>> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for part in &from_parts[common..] {
        // A CurDir only survives normalization as the lone "." of an empty path
        if !matches!(part, Component::CurDir) {
            result.push("..");
        }
    }
    for part in &to_parts[common..] {
        result.push(part.as_os_str());
    }

    if result.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        result
    }
}

/// Resolve a symlink's stored target against the directory holding the link.
///
/// Absolute targets are returned normalized; relative ones are joined onto
/// `link_dir` first.
pub fn resolve_link_target(link_dir: &Path, stored: &Path) -> PathBuf {
    if stored.is_absolute() {
        normalize_lexically(stored)
    } else {
        normalize_lexically(&link_dir.join(stored))
    }
}

/// Whether a file name is hidden (starts with `.`).
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Whether a file name is git metadata (`.git`, `.gitignore`, `.gitmodules`, ...).
pub fn is_git_metadata(name: &str) -> bool {
    name.starts_with(".git")
}
