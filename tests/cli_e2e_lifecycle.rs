//! End-to-end tests driving real git repositories.
//!
//! Sources are local repositories created inside the temp directory, so no
//! network access is needed, but a `git` binary is.

mod common;
use common::prelude::*;

use std::fs;
use std::path::Path;

const CORE_FILES: &[(&str, &str)] = &[
    ("index.php", "<?php // core"),
    (".htaccess", "Options -Indexes"),
    ("app/Mage.php", "<?php class Mage {}"),
    ("app/etc/modules/Mage_All.xml", "<config/>"),
    ("app/code/community/.keep", ""),
];

const PAYMENTS_FILES: &[(&str, &str)] = &[
    ("modman", "# payments"),
    ("app/etc/modules/Acme_Pay.xml", "<config/>"),
    ("app/code/community/Acme/Pay/Model.php", "<?php class Pay {}"),
];

const TEMPLATE: &str = "[core]\nsource = {{ core_source }}\n\n[extensions]\npayments.source = {{ payments }}\n";

/// Fixture with core and payments source repositories and a template dir.
fn sources() -> TestFixture {
    let fixture = TestFixture::new().with_file("templates/coretree.ini.jinja2", TEMPLATE);
    git_repo(&fixture.path().join("sources/core"), CORE_FILES);
    git_repo(&fixture.path().join("sources/payments"), PAYMENTS_FILES);
    fixture
}

fn init(fixture: &TestFixture) {
    let sources = fixture.path().join("sources");
    fixture
        .command()
        .arg("init")
        .arg("--source")
        .arg(sources.join("core"))
        .arg("--var")
        .arg(format!("payments={}", sources.join("payments").display()))
        .arg("--templates")
        .arg(fixture.path().join("templates"))
        .assert()
        .success();
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|metadata| metadata.file_type().is_symlink())
        .unwrap_or(false)
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_init_composes_core_and_extensions() {
    let fixture = sources();
    init(&fixture);

    let core = fixture.root().join("core");
    assert!(core.join("index.php").is_file());
    assert!(core.join(".htaccess").is_file());
    assert!(core.join("app/Mage.php").is_file());

    assert!(is_symlink(&core.join("modman")));
    assert!(is_symlink(&core.join("app/etc/modules/Acme_Pay.xml")));
    assert!(is_symlink(&core.join("app/code/community/Acme/Pay")));
    assert_eq!(
        fs::read_to_string(core.join("app/code/community/Acme/Pay/Model.php")).unwrap(),
        "<?php class Pay {}"
    );

    let log = git(&core, &["log", "--format=%s"]);
    assert_eq!(log, "Added core\nBase coretree project\n");

    fixture.child("shop/core/.gitignore").assert(predicate::str::contains(
        "# .coretree/ignore/core\n/.htaccess\n/app\n/index.php\n",
    ));
    fixture.child("shop/core/.gitignore").assert(predicate::str::contains(
        "# .coretree/ignore/extension.payments\n\
         /app/code/community/Acme/Pay\n\
         /app/etc/modules/Acme_Pay.xml\n\
         /modman\n",
    ));

    // Core files are ignored; only the overlay bookkeeping is pending
    let status = git(&core, &["status", "--porcelain"]);
    assert!(!status.contains("index.php"));
    assert!(status.contains(".gitignore"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_update_refuses_uncommitted_overlay_then_succeeds() {
    let fixture = sources();
    init(&fixture);
    let core = fixture.root().join("core");

    fixture
        .command()
        .arg("update")
        .assert()
        .failure()
        .stderr(predicate::str::contains("local modifications"));

    git(&core, &["add", "."]);
    git(&core, &["commit", "--quiet", "-m", "Overlay payments"]);

    fixture
        .command()
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("payments pulled, 3 paths overlaid"));

    assert!(is_symlink(&core.join("modman")));
    assert!(core.join("index.php").is_file());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_update_extensions_only_picks_up_upstream_changes() {
    let fixture = sources();
    init(&fixture);

    let payments_source = fixture.path().join("sources/payments");
    fs::write(payments_source.join("README"), "payments").unwrap();
    git(&payments_source, &["add", "."]);
    git(&payments_source, &["commit", "--quiet", "-m", "Add readme"]);

    fixture
        .command()
        .args(["update", "--extensions-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("payments pulled, 4 paths overlaid"));

    assert!(is_symlink(&fixture.root().join("core/README")));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_modified_extension_is_not_pulled() {
    let fixture = sources();
    init(&fixture);

    fs::write(fixture.root().join("extensions/payments/modman"), "# local edit").unwrap();

    fixture
        .command()
        .args(["update", "--extensions-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("extension payments"))
        .stderr(predicate::str::contains("local modifications"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_link_conflict_is_reported() {
    let fixture = sources();
    init(&fixture);
    let core = fixture.root().join("core");

    fs::remove_file(core.join("modman")).unwrap();
    fs::write(core.join("modman"), "# not a link").unwrap();

    fixture
        .command()
        .args(["update", "--extensions-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Link conflict"))
        .stderr(predicate::str::contains("regular file"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_clone_attaches_to_existing_project() {
    let fixture = sources();
    init(&fixture);
    let core = fixture.root().join("core");
    git(&core, &["add", "."]);
    git(&core, &["commit", "--quiet", "-m", "Overlay payments"]);

    let mut cmd = cargo_bin_cmd!("coretree");
    cmd.arg("--root")
        .arg(fixture.path().join("second"))
        .arg("clone")
        .arg(&core)
        .assert()
        .success();

    fixture
        .child("second/core/.coretree/coretree.ini")
        .assert(predicate::path::is_file());
    fixture
        .child("second/core/index.php")
        .assert(predicate::path::missing());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_init_with_bundled_scaffold_tracks_unignored_entries() {
    let fixture = sources();
    fixture
        .command()
        .arg("init")
        .arg("--source")
        .arg(fixture.path().join("sources/core"))
        .assert()
        .success();

    let core = fixture.root().join("core");
    let tracked = git(&core, &["ls-files"]);
    assert!(tracked.lines().any(|line| line == ".htaccess"));
    assert!(!tracked.lines().any(|line| line == "index.php"));
    assert!(tracked.lines().any(|line| line == ".coretree/ignore/local"));
}
