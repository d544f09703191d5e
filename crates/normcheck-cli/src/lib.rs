//! Normcheck CLI - command-line entry points for document analysis and
//! reference-corpus ingestion.

#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod output;
pub mod settings;

pub use cli::{Cli, Command};
pub use error::{CliError, Result};
pub use settings::Settings;
