use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Split a location string into the arguments handed to `git clone`.
///
/// Locations may carry clone flags in front of the URL, e.g.
/// `--depth=1 --branch 1.9 https://example.com/core.git`. Tokens are
/// separated by any whitespace and empty tokens are dropped.
pub fn split_location(location: &str) -> Vec<String> {
    location.split_whitespace().map(str::to_string).collect()
}

/// Run `git` with `args`, optionally inside `cwd`, and return its stdout.
///
/// This uses the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - Any authentication configured in ~/.gitconfig
///
/// A non-zero exit is reported as [`Error::GitCommand`] carrying the
/// captured stderr (or stdout when stderr is empty) unchanged.
pub fn run(args: &[OsString], cwd: Option<&Path>) -> Result<String> {
    let command = args
        .iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ");

    let mut git = Command::new("git");
    git.args(args);
    if let Some(dir) = cwd {
        git.current_dir(dir);
    }

    let output = git.output().map_err(|e| Error::GitSpawn {
        command: command.clone(),
        message: e.to_string(),
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostics = if stderr.trim().is_empty() {
            stdout
        } else {
            stderr.into_owned()
        };

        return Err(Error::GitCommand {
            command,
            dir: cwd.map(Path::to_path_buf).unwrap_or_default(),
            stderr: diagnostics,
        });
    }

    Ok(stdout)
}

fn os_args<I, S>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    args.into_iter().map(Into::into).collect()
}

/// Clone `location` into `dest_dir`.
///
/// The location is split with [`split_location`] so flags pass through.
pub fn clone(location: &str, dest_dir: &Path) -> Result<()> {
    if let Some(parent) = dest_dir.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut args = os_args(["clone"]);
    args.extend(os_args(split_location(location)));
    args.push(dest_dir.as_os_str().to_os_string());
    run(&args, None)?;
    Ok(())
}

/// Pull the tracked upstream branch of the working copy at `dir`.
pub fn pull(dir: &Path) -> Result<()> {
    run(&os_args(["pull"]), Some(dir))?;
    Ok(())
}

/// Machine readable status of the working copy at `dir`.
///
/// Empty output means the working tree is clean.
pub fn status(dir: &Path) -> Result<String> {
    run(&os_args(["status", "--porcelain"]), Some(dir))
}

/// Remove untracked and ignored files, including directories.
pub fn clean(dir: &Path) -> Result<()> {
    run(&os_args(["clean", "-f", "-d", "-x"]), Some(dir))?;
    Ok(())
}

/// Stage `paths` in the working copy at `dir`.
pub fn add(dir: &Path, paths: &[&str]) -> Result<()> {
    let mut args = os_args(["add", "--"]);
    args.extend(os_args(paths.iter().copied()));
    run(&args, Some(dir))?;
    Ok(())
}

/// Record the staged changes at `dir` with `message`.
pub fn commit(dir: &Path, message: &str) -> Result<()> {
    run(&os_args(["commit", "-m", message]), Some(dir))?;
    Ok(())
}

/// Create an empty repository at `dir`.
pub fn init(dir: &Path) -> Result<()> {
    run(&os_args(["init"]), Some(dir))?;
    Ok(())
}
