//! Template rendering for the project scaffold
//!
//! `init` stamps the metadata directory out of a template source tree.
//! Files ending in [`TEMPLATE_SUFFIX`] are rendered with the supplied
//! variables and written without the suffix; every other file is copied
//! byte-for-byte. Rendering is strict: a template that references a variable
//! the caller did not supply fails and names both the template and the
//! variable.
//!
//! Templates come either from a directory on disk ([`render_tree`]) or from
//! the scaffold compiled into the binary ([`render_bundled`]). Both render
//! the whole scaffold into memory before anything is written, so a failure
//! leaves the destination untouched.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{Environment, ErrorKind, UndefinedBehavior, Value};

use crate::error::{Error, Result};
use crate::filesystem::{walk_tree, EntryKind};

/// Suffix marking a file as a template
pub const TEMPLATE_SUFFIX: &str = ".jinja2";

/// Variables available to templates
pub type TemplateVars = BTreeMap<String, String>;

/// Renders a single template
pub trait TemplateRenderer {
    /// Render the template `source`, known as `name`, with `variables`.
    ///
    /// # Errors
    ///
    /// - [`Error::Template`] naming the template (and the variable, when one
    ///   is undefined).
    fn render(&self, name: &str, source: &str, variables: &TemplateVars) -> Result<String>;
}

/// Jinja-compatible renderer backed by `minijinja`
#[derive(Debug, Default, Clone, Copy)]
pub struct JinjaRenderer;

impl TemplateRenderer for JinjaRenderer {
    fn render(&self, name: &str, source: &str, variables: &TemplateVars) -> Result<String> {
        let template_error = |message: String, variable: Option<String>| Error::Template {
            template: name.to_string(),
            message,
            variable,
        };

        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);

        let template = env
            .template_from_named_str(name, source)
            .map_err(|e| template_error(e.to_string(), None))?;

        match template.render(Value::from_serialize(variables)) {
            Ok(rendered) => Ok(rendered),
            Err(e) if e.kind() == ErrorKind::UndefinedError => {
                // Globals such as `range` show up as undeclared too
                let globals: HashSet<&str> = env.globals().map(|(global, _)| global).collect();
                let variable = template
                    .undeclared_variables(false)
                    .into_iter()
                    .filter(|v| !variables.contains_key(v) && !globals.contains(v.as_str()))
                    .min();
                Err(template_error("undefined variable".to_string(), variable))
            }
            Err(e) => Err(template_error(e.to_string(), None)),
        }
    }
}

/// A file produced from the template source tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaffoldEntry {
    Dir(PathBuf),
    File { path: PathBuf, contents: Vec<u8> },
}

/// Render or copy every entry under `template_root` into memory.
///
/// Returned paths are relative to the destination root, with the template
/// suffix stripped. Directories precede their contents.
pub fn render_tree(
    renderer: &dyn TemplateRenderer,
    template_root: &Path,
    variables: &TemplateVars,
) -> Result<Vec<ScaffoldEntry>> {
    let mut entries = Vec::new();

    for entry in walk_tree(template_root, |_| false) {
        let entry = entry?;
        match entry.kind {
            EntryKind::Dir => entries.push(ScaffoldEntry::Dir(entry.relative)),
            EntryKind::File | EntryKind::Symlink => {
                let contents = fs::read(template_root.join(&entry.relative))?;
                entries.push(scaffold_file(renderer, &entry.relative, contents, variables)?);
            }
        }
    }

    Ok(entries)
}

/// Like [`render_tree`] for a scaffold held in memory as `(path, contents)`
/// pairs with `/`-separated relative paths.
pub fn render_bundled(
    renderer: &dyn TemplateRenderer,
    files: &[(&str, &str)],
    variables: &TemplateVars,
) -> Result<Vec<ScaffoldEntry>> {
    let mut entries = Vec::new();
    let mut dirs: Vec<PathBuf> = Vec::new();

    for (path, contents) in files {
        let relative = PathBuf::from(path);
        let mut parents: Vec<PathBuf> = relative
            .ancestors()
            .skip(1)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .collect();
        parents.reverse();
        for dir in parents {
            if !dirs.contains(&dir) {
                dirs.push(dir.clone());
                entries.push(ScaffoldEntry::Dir(dir));
            }
        }

        entries.push(scaffold_file(
            renderer,
            &relative,
            contents.as_bytes().to_vec(),
            variables,
        )?);
    }

    Ok(entries)
}

fn scaffold_file(
    renderer: &dyn TemplateRenderer,
    relative: &Path,
    contents: Vec<u8>,
    variables: &TemplateVars,
) -> Result<ScaffoldEntry> {
    let name = relative.to_string_lossy().into_owned();
    let Some(stem) = name.strip_suffix(TEMPLATE_SUFFIX) else {
        return Ok(ScaffoldEntry::File {
            path: relative.to_path_buf(),
            contents,
        });
    };

    let source = String::from_utf8(contents).map_err(|e| Error::Template {
        template: name.clone(),
        message: e.to_string(),
        variable: None,
    })?;
    let rendered = renderer.render(&name, &source, variables)?;
    Ok(ScaffoldEntry::File {
        path: PathBuf::from(stem),
        contents: rendered.into_bytes(),
    })
}

/// Write rendered scaffold entries below `dest`.
pub fn write_scaffold(dest: &Path, entries: &[ScaffoldEntry]) -> Result<()> {
    for entry in entries {
        match entry {
            ScaffoldEntry::Dir(path) => fs::create_dir_all(dest.join(path))?,
            ScaffoldEntry::File { path, contents } => {
                let target = dest.join(path);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(target, contents)?;
            }
        }
    }
    Ok(())
}
