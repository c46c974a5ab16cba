//! CLI error type.

use std::fmt;

use antipode::app::AppError;
use antipode::config::ConfigError;
use antipode::coord::CoordError;
use antipode::logging::LoggingError;

/// Errors surfaced by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Bad configuration key or value given on the command line.
    Config(String),
    /// Configuration file could not be read or written.
    ConfigFile(ConfigError),
    /// Logging could not be initialized.
    Logging(LoggingError),
    /// Input is not a valid coordinate or viewport.
    Transform(CoordError),
    /// The simulated application failed to start.
    App(AppError),
    /// JSON output failed.
    Output(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "{}", e),
            CliError::Transform(e) => write!(f, "Invalid input: {}", e),
            CliError::App(e) => write!(f, "Failed to start: {}", e),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(_) => None,
            CliError::ConfigFile(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Transform(e) => Some(e),
            CliError::App(e) => Some(e),
            CliError::Output(e) => Some(e),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Transform(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e)
    }
}
