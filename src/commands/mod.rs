//! # CLI Command Implementations
//!
//! One module per `coretree` subcommand. Each module contains:
//! - An `Args` struct with the command-specific options, derived using `clap`.
//! - An `execute` function taking the parsed `Args`, the absolute project
//!   root and the output configuration.
//!
//! The commands only parse, print and map errors; the work itself is done
//! by `coretree::engine`.

pub mod clone;
pub mod init;
pub mod ls;
pub mod regenerate;
pub mod update;
