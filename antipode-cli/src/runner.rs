//! Shared command setup: configuration loading and logging.

use std::path::{Path, PathBuf};

use antipode::config::{config_file_path, ConfigFile};
use antipode::logging::{init_logging, LoggingConfig, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// Loaded configuration plus the logging guard for one CLI invocation.
pub struct CliRunner {
    config: ConfigFile,
    config_path: PathBuf,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Load the configuration (from `config_path` or the default location)
    /// and install logging. `log_level` overrides the configured level.
    pub fn new(config_path: Option<&Path>, log_level: Option<&str>) -> Result<Self, CliError> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(config_file_path);
        let config = ConfigFile::load_from(&config_path)?;

        let mut logging = LoggingConfig::from(&config.logging);
        if let Some(level) = log_level {
            logging = logging.with_level(level);
        }
        let guard = init_logging(&logging)?;

        Ok(Self {
            config,
            config_path,
            _logging: guard,
        })
    }

    /// The loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log the command being run.
    pub fn log_startup(&self, command: &str) {
        info!(
            command,
            version = env!("CARGO_PKG_VERSION"),
            config = %self.config_path.display(),
            "antipode starting"
        );
    }
}
