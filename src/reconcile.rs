//! # Symlink Reconciler
//!
//! Makes the files of an extension's working copy visible inside the core
//! tree by placing relative symbolic links at the matching core paths.
//!
//! Only a fixed set of directories is eligible:
//!
//! - the extension root itself (direct entries only),
//! - [`CONFIG_MODULE_DIR`],
//! - every vendor directory below [`COMMUNITY_CODE_DIR`].
//!
//! Hidden entries are never linked. Root entries that merely lead to the
//! nested eligible directories (`app`) are descended into instead of being
//! linked, because the core tree always owns them.
//!
//! Reconciliation runs in two passes. The first pass plans every link and
//! checks what already sits at each destination; a destination holding a
//! link to the same target is accepted as reconciled, anything else aborts
//! with [`Error::LinkConflict`] before the filesystem is touched. The second
//! pass creates missing vendor directories and links. Running it again is a
//! no-op that reports the same owned paths.
//!
//! Links that an earlier pass created but whose source has since vanished
//! are left in place.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::filesystem::{entry_kind, visible_entries, EntryKind};
use crate::path::{normalize_lexically, relative_link_target, resolve_link_target};
use crate::reporter::Reporter;

/// Directory holding module activation files
pub const CONFIG_MODULE_DIR: &str = "app/etc/modules";

/// Directory holding one subdirectory per third-party vendor
pub const COMMUNITY_CODE_DIR: &str = "app/code/community";

/// One link the reconciler wants to exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLink {
    /// Path relative to both the core tree and the extension copy
    pub relative: PathBuf,
    /// Target stored in the link
    pub target: PathBuf,
    /// Whether the link is already in place
    pub present: bool,
}

/// Overlays extension working copies onto the core tree
#[derive(Debug, Clone)]
pub struct SymlinkReconciler {
    core_dir: PathBuf,
    extensions_dir: PathBuf,
}

impl SymlinkReconciler {
    pub fn new(core_dir: impl Into<PathBuf>, extensions_dir: impl Into<PathBuf>) -> Self {
        Self {
            core_dir: core_dir.into(),
            extensions_dir: extensions_dir.into(),
        }
    }

    /// Working copy of `extension`.
    pub fn extension_dir(&self, extension: &str) -> PathBuf {
        self.extensions_dir.join(extension)
    }

    /// Relative directories of `extension` whose entries get linked.
    ///
    /// The root comes first as an empty path. Directories missing from the
    /// working copy are left out.
    pub fn eligible_dirs(&self, extension: &str) -> Result<Vec<PathBuf>> {
        let source = self.extension_dir(extension);
        let mut dirs = vec![PathBuf::new()];

        if source.join(CONFIG_MODULE_DIR).is_dir() {
            dirs.push(PathBuf::from(CONFIG_MODULE_DIR));
        }

        let community = source.join(COMMUNITY_CODE_DIR);
        if community.is_dir() {
            for vendor in visible_entries(&community)? {
                if vendor.kind == EntryKind::Dir {
                    dirs.push(Path::new(COMMUNITY_CODE_DIR).join(&vendor.relative));
                }
            }
        }

        Ok(dirs)
    }

    /// Plan every link of `extension` and validate existing destinations.
    ///
    /// # Errors
    ///
    /// - [`Error::LinkConflict`] for the first destination that holds
    ///   anything other than a link to the planned target.
    pub fn plan(&self, extension: &str) -> Result<Vec<PlannedLink>> {
        let source = self.extension_dir(extension);
        let mut plan = Vec::new();

        for dir in self.eligible_dirs(extension)? {
            let link_dir = self.core_dir.join(&dir);

            for entry in visible_entries(&source.join(&dir))? {
                if dir.as_os_str().is_empty() && leads_to_eligible_dir(&entry.name()) {
                    continue;
                }

                let relative = dir.join(&entry.relative);
                let expected = source.join(&relative);
                let dest = self.core_dir.join(&relative);

                let present = match entry_kind(&dest)? {
                    None => false,
                    Some(EntryKind::Symlink) => {
                        let stored = fs::read_link(&dest)?;
                        if resolve_link_target(&link_dir, &stored) != normalize_lexically(&expected)
                        {
                            return Err(Error::LinkConflict {
                                dest,
                                found: format!("symlink to {}", stored.display()),
                                expected,
                            });
                        }
                        true
                    }
                    Some(kind) => {
                        return Err(Error::LinkConflict {
                            dest,
                            found: kind.describe().to_string(),
                            expected,
                        });
                    }
                };

                plan.push(PlannedLink {
                    target: relative_link_target(&link_dir, &expected),
                    relative,
                    present,
                });
            }
        }

        Ok(plan)
    }

    /// Ensure every link of `extension` exists and return the owned paths, sorted.
    ///
    /// Each link is announced on `reporter`. Nothing is created when any
    /// destination conflicts.
    pub fn reconcile(&self, extension: &str, reporter: &dyn Reporter) -> Result<Vec<PathBuf>> {
        let plan = self.plan(extension)?;

        let mut owned = Vec::with_capacity(plan.len());
        for link in plan {
            let dest = self.core_dir.join(&link.relative);
            if link.present {
                reporter.info(&format!("Symlink already exists at {}", dest.display()));
            } else {
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                reporter.info(&format!(
                    "Symlinking {} -> {}",
                    dest.display(),
                    link.target.display()
                ));
                crate::filesystem::create_symlink(&link.target, &dest)?;
            }
            owned.push(link.relative);
        }

        owned.sort();
        Ok(owned)
    }
}

/// Whether a root entry is an ancestor of one of the nested eligible directories.
fn leads_to_eligible_dir(name: &str) -> bool {
    [CONFIG_MODULE_DIR, COMMUNITY_CODE_DIR]
        .iter()
        .any(|dir| dir.split('/').next() == Some(name))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::reporter::RecordingReporter;
    use log::Level;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        core: PathBuf,
        extensions: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let core = temp.path().join("core");
            let extensions = temp.path().join("extensions");

            fs::create_dir_all(core.join("app/etc/modules")).unwrap();
            fs::create_dir_all(core.join("app/code/community")).unwrap();
            fs::write(core.join("index.php"), "<?php").unwrap();

            let foo = extensions.join("foo");
            fs::create_dir_all(foo.join("app/etc/modules")).unwrap();
            fs::create_dir_all(foo.join("app/code/community/Vendor/C")).unwrap();
            fs::create_dir_all(foo.join(".git")).unwrap();
            fs::write(foo.join("A"), "a").unwrap();
            fs::write(foo.join(".hidden"), "h").unwrap();
            fs::write(foo.join("app/etc/modules/B"), "b").unwrap();
            fs::write(foo.join("app/code/community/Vendor/C/Model.php"), "c").unwrap();

            Self {
                _temp: temp,
                core,
                extensions,
            }
        }

        fn reconciler(&self) -> SymlinkReconciler {
            SymlinkReconciler::new(&self.core, &self.extensions)
        }
    }

    fn owned(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_reconcile_links_exactly_the_eligible_entries() {
        let fixture = Fixture::new();
        let paths = fixture
            .reconciler()
            .reconcile("foo", &RecordingReporter::default())
            .unwrap();

        assert_eq!(
            paths,
            owned(&["A", "app/code/community/Vendor/C", "app/etc/modules/B"])
        );
        assert!(!fixture.core.join(".hidden").exists());
        assert_eq!(
            fs::read_link(fixture.core.join("app/etc/modules/B")).unwrap(),
            PathBuf::from("../../../../extensions/foo/app/etc/modules/B")
        );
        assert_eq!(
            fs::read_link(fixture.core.join("A")).unwrap(),
            PathBuf::from("../extensions/foo/A")
        );
        assert_eq!(
            fs::read_to_string(fixture.core.join("app/code/community/Vendor/C/Model.php"))
                .unwrap(),
            "c"
        );
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let fixture = Fixture::new();
        let reconciler = fixture.reconciler();
        let first = reconciler
            .reconcile("foo", &RecordingReporter::default())
            .unwrap();

        let plan = reconciler.plan("foo").unwrap();
        assert!(plan.iter().all(|link| link.present));

        let second = reconciler
            .reconcile("foo", &RecordingReporter::default())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reconcile_reports_each_link() {
        let fixture = Fixture::new();
        let reconciler = fixture.reconciler();

        let created = RecordingReporter::default();
        reconciler.reconcile("foo", &created).unwrap();
        let link_a = fixture.core.join("A");
        assert_eq!(created.events().len(), 3);
        assert!(created.events().contains(&(
            Level::Info,
            format!("Symlinking {} -> ../extensions/foo/A", link_a.display())
        )));

        let existing = RecordingReporter::default();
        reconciler.reconcile("foo", &existing).unwrap();
        assert!(existing.events().contains(&(
            Level::Info,
            format!("Symlink already exists at {}", link_a.display())
        )));
        assert!(existing
            .events()
            .iter()
            .all(|(_, message)| message.starts_with("Symlink already exists")));
    }

    #[test]
    fn test_non_link_destination_conflicts_without_writing() {
        let fixture = Fixture::new();
        fs::write(fixture.core.join("app/etc/modules/B"), "core owned").unwrap();

        let err = fixture
            .reconciler()
            .reconcile("foo", &RecordingReporter::default())
            .unwrap_err();
        match err {
            Error::LinkConflict { dest, found, .. } => {
                assert_eq!(dest, fixture.core.join("app/etc/modules/B"));
                assert_eq!(found, "regular file");
            }
            other => panic!("expected LinkConflict, got {:?}", other),
        }

        // Entries planned before the conflict were not linked either
        assert!(entry_kind(&fixture.core.join("A")).unwrap().is_none());
        assert!(!fixture.core.join("app/code/community/Vendor").exists());
    }

    #[test]
    fn test_link_to_other_target_conflicts() {
        let fixture = Fixture::new();
        std::os::unix::fs::symlink("../extensions/bar/A", fixture.core.join("A")).unwrap();

        let err = fixture
            .reconciler()
            .reconcile("foo", &RecordingReporter::default())
            .unwrap_err();
        match err {
            Error::LinkConflict { found, expected, .. } => {
                assert_eq!(found, "symlink to ../extensions/bar/A");
                assert_eq!(expected, fixture.extensions.join("foo/A"));
            }
            other => panic!("expected LinkConflict, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_nested_dirs_are_skipped() {
        let fixture = Fixture::new();
        let bare = fixture.extensions.join("bare");
        fs::create_dir_all(&bare).unwrap();
        fs::write(bare.join("README"), "r").unwrap();

        let reconciler = fixture.reconciler();
        assert_eq!(reconciler.eligible_dirs("bare").unwrap(), vec![PathBuf::new()]);
        assert_eq!(
            reconciler
                .reconcile("bare", &RecordingReporter::default())
                .unwrap(),
            owned(&["README"])
        );
    }

    #[test]
    fn test_leads_to_eligible_dir() {
        assert!(leads_to_eligible_dir("app"));
        assert!(!leads_to_eligible_dir("lib"));
        assert!(!leads_to_eligible_dir("application"));
    }
}
