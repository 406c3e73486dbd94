//! CLI command implementations for frontier.

pub(crate) mod generate;
pub(crate) mod inspect;
pub(crate) mod tune;

mod output;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;
use std::path::Path;

use frontier::{ConfigError, GameConfig, SnapshotError};

/// Output format for `generate` and `tune`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<SnapshotError> for CliError {
    fn from(e: SnapshotError) -> Self {
        Self::new(e.to_string())
    }
}

/// Load a configuration file, or the defaults when none is given.
fn load_config(path: Option<&Path>) -> Result<GameConfig, CliError> {
    match path {
        Some(path) => GameConfig::load(path).map_err(|e| {
            CliError::new(format!("Failed to load config {}: {e}", path.display()))
        }),
        None => Ok(GameConfig::default()),
    }
}
