//! Default values for coretree configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

/// Scaffold rendered into `core/.coretree` when no template directory is given.
///
/// The files live under `data/` in the source tree and are compiled into the
/// binary, so an installed `coretree` does not depend on the build directory.
/// Paths are relative to the metadata directory.
///
/// This can be overridden by the `--templates` CLI flag or the
/// `CORETREE_TEMPLATES` environment variable.
pub const BUNDLED_SCAFFOLD: &[(&str, &str)] = &[
    (
        "coretree.ini.jinja2",
        include_str!("../data/coretree.ini.jinja2"),
    ),
    ("ignore/local", include_str!("../data/ignore/local")),
    ("unignore/local", include_str!("../data/unignore/local")),
];
