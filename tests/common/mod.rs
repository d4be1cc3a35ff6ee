//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then `use common::prelude::*;`.
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_config(configs::CORE_ONLY);
//!     fixture.command().arg("ls").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    #[allow(unused_imports)]
    pub use super::{git, git_repo};
    pub use super::TestFixture;
}

/// Configuration snippets for `core/.coretree/coretree.ini`.
#[allow(dead_code)]
pub mod configs {
    /// Only a core source.
    pub const CORE_ONLY: &str = "[core]\nsource = https://example.com/core.git\n";

    /// Core source plus two extensions.
    pub const WITH_EXTENSIONS: &str = r#"[core]
source = https://example.com/core.git

[extensions]
payments.source = https://example.com/payments.git
search.source = --branch stable https://example.com/search.git
"#;

    /// An extension declaring an attribute no kind understands.
    pub const UNKNOWN_ATTRIBUTE: &str = r#"[core]
source = https://example.com/core.git

[extensions]
payments.branch = main
"#;
}

/// Identity used for commits made by tests
const GIT_IDENTITY: [(&str, &str); 4] = [
    ("GIT_AUTHOR_NAME", "coretree tests"),
    ("GIT_AUTHOR_EMAIL", "tests@example.com"),
    ("GIT_COMMITTER_NAME", "coretree tests"),
    ("GIT_COMMITTER_EMAIL", "tests@example.com"),
];

/// Run `git` in `dir` with a fixed identity and return stdout.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .envs(GIT_IDENTITY)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Create a committed repository at `dir` containing `files`.
#[allow(dead_code)]
pub fn git_repo(dir: &Path, files: &[(&str, &str)]) {
    std::fs::create_dir_all(dir).expect("Failed to create repository dir");
    git(dir, &["init", "--quiet"]);
    for (path, contents) in files {
        let target = dir.join(path);
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(target, contents).unwrap();
    }
    git(dir, &["add", "."]);
    git(dir, &["commit", "--quiet", "-m", "Initial import"]);
}

/// A temporary directory holding a project root at `<temp>/shop`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write the project configuration, making the project exist.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("shop/core/.coretree/coretree.ini")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Add a file with the given path (relative to the temp dir) and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// The temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The project root.
    pub fn root(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("shop")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A `coretree` command targeting this fixture's project root.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("coretree");
        cmd.current_dir(self.path())
            .arg("--root")
            .arg(self.root())
            .arg("--color")
            .arg("never")
            .env_remove("CORETREE_ROOT")
            .env_remove("CORETREE_TEMPLATES")
            .envs(GIT_IDENTITY);
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_config() {
        let fixture = TestFixture::new().with_config(configs::CORE_ONLY);
        assert!(fixture.root().join("core/.coretree/coretree.ini").is_file());
    }
}
