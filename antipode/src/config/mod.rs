//! Configuration file.
//!
//! Settings live in an INI file, by default
//! `<config dir>/antipode/config.ini`:
//!
//! ```ini
//! [view]
//! latitude = -33.42651995258547
//! longitude = -70.66558906755355
//! zoom = 12
//! style = roadmap
//! fit_padding = 0
//!
//! [logging]
//! level = info
//! file = /var/log/antipode.log
//! ```
//!
//! A missing file yields defaults. Every setting is addressable as
//! `section.key` through [`ConfigKey`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use crate::app::{DEFAULT_FIT_PADDING, DEFAULT_ZOOM, INITIAL_COORDINATES};
use crate::coord::{MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
use crate::viewer::ImageryStyle;

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "antipode";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors from loading, saving or editing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read or parsed.
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// The file could not be written.
    #[error("Failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be parsed or is out of range.
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    /// No such `section.key`.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Directory holding the configuration file.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Default configuration file path.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// `[view]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSettings {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
    pub style: ImageryStyle,
    pub fit_padding: u32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            latitude: INITIAL_COORDINATES.lat(),
            longitude: INITIAL_COORDINATES.lon(),
            zoom: DEFAULT_ZOOM,
            style: ImageryStyle::default(),
            fit_padding: DEFAULT_FIT_PADDING,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// `tracing` filter directive (overridden by `RUST_LOG`).
    pub level: String,
    /// Log file; logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub view: ViewSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from `path`, returning defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Build from parsed INI data. Unknown sections and keys are ignored.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Render as INI data. Unset values are omitted.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }
}

/// A single `section.key` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ViewLatitude,
    ViewLongitude,
    ViewZoom,
    ViewStyle,
    ViewFitPadding,
    LoggingLevel,
    LoggingFile,
}

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ViewLatitude,
            ConfigKey::ViewLongitude,
            ConfigKey::ViewZoom,
            ConfigKey::ViewStyle,
            ConfigKey::ViewFitPadding,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingFile,
        ]
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::ViewLatitude
            | ConfigKey::ViewLongitude
            | ConfigKey::ViewZoom
            | ConfigKey::ViewStyle
            | ConfigKey::ViewFitPadding => "view",
            ConfigKey::LoggingLevel | ConfigKey::LoggingFile => "logging",
        }
    }

    /// Key name within the section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::ViewLatitude => "latitude",
            ConfigKey::ViewLongitude => "longitude",
            ConfigKey::ViewZoom => "zoom",
            ConfigKey::ViewStyle => "style",
            ConfigKey::ViewFitPadding => "fit_padding",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingFile => "file",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as a string (empty when unset).
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ViewLatitude => config.view.latitude.to_string(),
            ConfigKey::ViewLongitude => config.view.longitude.to_string(),
            ConfigKey::ViewZoom => config.view.zoom.to_string(),
            ConfigKey::ViewStyle => config.view.style.to_string(),
            ConfigKey::ViewFitPadding => config.view.fit_padding.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingFile => config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse `value` and store it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `value` does not parse or is
    /// out of range; `config` is left unchanged.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = || ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
        };
        match self {
            ConfigKey::ViewLatitude => {
                config.view.latitude =
                    parse_in_range(value, MIN_LAT, MAX_LAT).ok_or_else(invalid)?;
            }
            ConfigKey::ViewLongitude => {
                config.view.longitude =
                    parse_in_range(value, MIN_LON, MAX_LON).ok_or_else(invalid)?;
            }
            ConfigKey::ViewZoom => {
                config.view.zoom = value.parse().map_err(|_| invalid())?;
            }
            ConfigKey::ViewStyle => {
                config.view.style = value.parse().map_err(|_| invalid())?;
            }
            ConfigKey::ViewFitPadding => {
                config.view.fit_padding = value.parse().map_err(|_| invalid())?;
            }
            ConfigKey::LoggingLevel => {
                if value.is_empty() {
                    return Err(invalid());
                }
                config.logging.level = value.to_string();
            }
            ConfigKey::LoggingFile => {
                config.logging.file = (!value.is_empty()).then(|| PathBuf::from(value));
            }
        }
        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn parse_in_range(value: &str, min: f64, max: f64) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}
