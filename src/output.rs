//! # Output Configuration
//!
//! Controls how the CLI decorates its status lines. Markers and colors are
//! only used when the terminal supports them and the user has not opted out.
//!
//! The following are honoured, in this order:
//! - `--color=always|never` on the command line
//! - `NO_COLOR` (any value, per https://no-color.org/)
//! - `CLICOLOR=0` and `CLICOLOR_FORCE=1`
//! - `TERM=dumb`
//! - whether stdout is a color-capable terminal
//!
//! ```rust,ignore
//! use coretree::output::{marker, OutputConfig, Status};
//!
//! let out = OutputConfig::from_env_and_flag("auto");
//! println!("{} Updating core", marker(&out, Status::Working));
//! ```

use std::env;
use std::fmt::Display;

use console::style;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `color_flag` is the value of `--color`: `always`, `never` or `auto`.
    /// `always` wins over `NO_COLOR`; `auto` inspects the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Kind of status line printed by a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Working,
    Done,
    Warning,
    Info,
}

/// Leading marker for a status line: an emoji with color, bracketed text without.
pub fn marker(config: &OutputConfig, status: Status) -> &'static str {
    let (fancy, plain) = match status {
        Status::Working => ("🔄", "[..]"),
        Status::Done => ("✅", "[OK]"),
        Status::Warning => ("⚠️", "[WARN]"),
        Status::Info => ("📦", "[INFO]"),
    };
    emoji(config, fancy, plain)
}

/// Returns `emoji_str` when colors are enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Render `value` in bold when colors are enabled.
pub fn highlight(config: &OutputConfig, value: impl Display) -> String {
    if config.use_color {
        style(value).bold().to_string()
    } else {
        value.to_string()
    }
}
