//! # Project Configuration
//!
//! This module reads the persisted `coretree.ini` that lives in the metadata
//! directory of every project. The file uses the INI sections format and is
//! read fresh on every operation; nothing is cached across invocations.
//!
//! ## Layout
//!
//! ```ini
//! [DEFAULT]
//! mirror = %(here)s/mirror
//!
//! [core]
//! source = --depth=1 %(mirror)s/core.git
//!
//! [extensions]
//! payments.source = https://example.com/payments.git
//! search.source = --branch stable https://example.com/search.git
//! ```
//!
//! - **`[DEFAULT]`** holds fallback values visible from every section. The
//!   builtin default `here` always resolves to the absolute project root.
//! - **`[core]`** names the location of the core source.
//! - **`[extensions]`** declares extensions with two-segment dotted keys,
//!   `<extension>.<attribute>`. Keys with fewer or more segments are ignored.
//!
//! Values may reference other options of the same section or defaults with
//! `%(name)s`; `%%` produces a literal percent sign.
//!
//! ## Validation
//!
//! [`ProjectConfig::read_extensions`] exposes the raw attribute table exactly
//! as declared. [`ProjectConfig::extensions`] turns it into typed
//! [`Extension`] values, rejecting invalid names, unknown attributes and
//! missing `source` attributes up front rather than at clone time.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use ini::{Ini, ParseOption};
use regex::Regex;

use crate::error::{Error, Result};

/// Section holding values visible from every other section
pub const DEFAULT_SECTION: &str = "DEFAULT";
/// Section describing the core source
pub const CORE_SECTION: &str = "core";
/// Section declaring extensions
pub const EXTENSIONS_SECTION: &str = "extensions";
/// Attribute naming where an extension or the core is cloned from
pub const SOURCE_ATTRIBUTE: &str = "source";

const MAX_INTERPOLATION_DEPTH: usize = 10;

static EXTENSION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("extension name pattern is valid"));

/// Raw attributes of one extension, in declaration order of the extension
pub type ExtensionAttributes = (String, BTreeMap<String, String>);

/// How an extension is fetched and overlaid onto the core tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionKind {
    /// A git working copy whose files are symlinked into the core tree.
    GitSymlink {
        /// Clone location, optionally prefixed with clone flags
        source: String,
    },
}

/// A validated extension declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub name: String,
    pub kind: ExtensionKind,
}

impl Extension {
    /// Build a typed extension from its raw attribute table.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidExtensionName`] if the name is outside `[A-Za-z0-9_-]`.
    /// - [`Error::UnknownAttribute`] for any attribute other than `source`.
    /// - [`Error::MissingAttribute`] if `source` is absent or blank.
    pub fn from_attributes(name: &str, attributes: &BTreeMap<String, String>) -> Result<Self> {
        if !EXTENSION_NAME.is_match(name) {
            return Err(Error::InvalidExtensionName {
                name: name.to_string(),
            });
        }

        if let Some(unknown) = attributes.keys().find(|key| *key != SOURCE_ATTRIBUTE) {
            return Err(Error::UnknownAttribute {
                extension: name.to_string(),
                attribute: unknown.clone(),
            });
        }

        let source = attributes
            .get(SOURCE_ATTRIBUTE)
            .filter(|source| !source.trim().is_empty())
            .ok_or_else(|| Error::MissingAttribute {
                extension: name.to_string(),
                attribute: SOURCE_ATTRIBUTE.to_string(),
            })?;

        Ok(Self {
            name: name.to_string(),
            kind: ExtensionKind::GitSymlink {
                source: source.clone(),
            },
        })
    }

    /// Clone location of the extension.
    pub fn source(&self) -> &str {
        match &self.kind {
            ExtensionKind::GitSymlink { source } => source,
        }
    }
}

/// Parsed `coretree.ini` together with its default table
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    ini: Ini,
    defaults: BTreeMap<String, String>,
}

impl ProjectConfig {
    /// Parse configuration text for the project rooted at `here`.
    pub fn parse(content: &str, here: &Path) -> Result<Self> {
        let options = ParseOption {
            enabled_escape: false,
            enabled_quote: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(content, options).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            hint: Some("Each line must be a [section] header or a 'key = value' pair".to_string()),
        })?;

        let mut defaults = BTreeMap::new();
        defaults.insert("here".to_string(), here.to_string_lossy().into_owned());
        if let Some(section) = ini.section(Some(DEFAULT_SECTION)) {
            for (key, value) in section.iter() {
                defaults.insert(key.to_string(), value.to_string());
            }
        }

        Ok(Self { ini, defaults })
    }

    /// Read and parse the configuration file at `path`.
    pub fn from_file(path: &Path, here: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, here)
    }

    /// Look up `option` in `section`, falling back to the defaults.
    ///
    /// The returned value has `%(name)s` references expanded.
    pub fn get(&self, section: &str, option: &str) -> Result<Option<String>> {
        match self.raw(section, option) {
            Some(raw) => self.interpolate(section, option, &raw, 0).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`ProjectConfig::get`] but a missing option is an error.
    pub fn require(&self, section: &str, option: &str) -> Result<String> {
        self.get(section, option)?.ok_or_else(|| Error::MissingOption {
            section: section.to_string(),
            option: option.to_string(),
        })
    }

    /// Location the core source is cloned from.
    pub fn core_source(&self) -> Result<String> {
        self.require(CORE_SECTION, SOURCE_ATTRIBUTE)
    }

    /// Raw extension table from the `[extensions]` section.
    ///
    /// Only exact `<extension>.<attribute>` keys are recognized. Extensions
    /// appear in the order they are first mentioned; a repeated attribute
    /// keeps its last value.
    pub fn read_extensions(&self) -> Result<Vec<ExtensionAttributes>> {
        let mut extensions: Vec<ExtensionAttributes> = Vec::new();

        let Some(section) = self.ini.section(Some(EXTENSIONS_SECTION)) else {
            return Ok(extensions);
        };

        for (key, raw) in section.iter() {
            let parts: Vec<&str> = key.split('.').collect();
            if parts.len() != 2 {
                continue;
            }
            let (name, attribute) = (parts[0], parts[1]);
            let value = self.interpolate(EXTENSIONS_SECTION, key, raw, 0)?;

            match extensions.iter_mut().find(|(known, _)| known == name) {
                Some((_, attributes)) => {
                    attributes.insert(attribute.to_string(), value);
                }
                None => {
                    let mut attributes = BTreeMap::new();
                    attributes.insert(attribute.to_string(), value);
                    extensions.push((name.to_string(), attributes));
                }
            }
        }

        Ok(extensions)
    }

    /// Validated extensions in declaration order.
    pub fn extensions(&self) -> Result<Vec<Extension>> {
        self.read_extensions()?
            .iter()
            .map(|(name, attributes)| Extension::from_attributes(name, attributes))
            .collect()
    }

    fn raw(&self, section: &str, option: &str) -> Option<String> {
        self.ini
            .section(Some(section))
            .and_then(|properties| properties.get_all(option).last())
            .map(str::to_string)
            .or_else(|| self.defaults.get(option).cloned())
    }

    fn interpolate(&self, section: &str, option: &str, value: &str, depth: usize) -> Result<String> {
        if !value.contains('%') {
            return Ok(value.to_string());
        }

        let failure = |key: &str| Error::Interpolation {
            section: section.to_string(),
            option: option.to_string(),
            key: key.to_string(),
        };
        if depth >= MAX_INTERPOLATION_DEPTH {
            return Err(failure(value));
        }

        let mut out = String::with_capacity(value.len());
        let mut rest = value;
        while let Some(at) = rest.find('%') {
            out.push_str(&rest[..at]);
            rest = &rest[at..];

            if let Some(after) = rest.strip_prefix("%%") {
                out.push('%');
                rest = after;
                continue;
            }

            let Some(reference) = rest.strip_prefix("%(") else {
                return Err(failure(rest));
            };
            let Some(close) = reference.find(")s") else {
                return Err(failure(reference));
            };
            let key = &reference[..close];
            let raw = self.raw(section, key).ok_or_else(|| failure(key))?;
            out.push_str(&self.interpolate(section, option, &raw, depth + 1)?);
            rest = &reference[close + 2..];
        }
        out.push_str(rest);

        Ok(out)
    }
}
