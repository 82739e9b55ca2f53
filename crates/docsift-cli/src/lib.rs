//! docsift CLI library.
//!
//! Argument parsing, configuration resolution, logging setup and the
//! command implementations behind the `docsift` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

pub use cli::{Cli, Command};
pub use error::{CliError, Result};
pub use output::Formatter;
