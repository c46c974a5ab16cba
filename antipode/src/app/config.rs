//! Application configuration for AntipodeApp.
//!
//! `AppConfig` carries the startup constants: where viewer A opens, at what
//! zoom, in which imagery style, and how much padding search-driven fits
//! use. The zoom is passed through to the viewers unchanged; the core never
//! interprets it.

use crate::config::ConfigFile;
use crate::coord::Coordinate;
use crate::viewer::ImageryStyle;

use super::error::AppError;

/// Initial view coordinates (Santiago, Chile).
pub const INITIAL_COORDINATES: Coordinate =
    Coordinate::new_unchecked(-33.42651995258547, -70.66558906755355);

/// Initial zoom level for both viewers.
pub const DEFAULT_ZOOM: u8 = 12;

/// Padding in pixels when fitting a viewer to a searched place's region.
pub const DEFAULT_FIT_PADDING: u32 = 0;

/// Application configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Point viewer A opens on. Viewer B opens on its antipode.
    pub initial: Coordinate,

    /// Zoom level both viewers are created with.
    pub zoom: u8,

    /// Imagery style applied to both viewers at startup.
    pub initial_style: ImageryStyle,

    /// Padding for search-driven fits.
    pub fit_padding: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial: INITIAL_COORDINATES,
            zoom: DEFAULT_ZOOM,
            initial_style: ImageryStyle::default(),
            fit_padding: DEFAULT_FIT_PADDING,
        }
    }
}

impl AppConfig {
    /// Create a config opening on `initial` with default settings otherwise.
    pub fn new(initial: Coordinate) -> Self {
        Self {
            initial,
            ..Self::default()
        }
    }

    /// Create application config from the configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidInitialCoordinate`] if the configured
    /// latitude/longitude are out of range.
    pub fn from_config_file(config: &ConfigFile) -> Result<Self, AppError> {
        let initial = Coordinate::new(config.view.latitude, config.view.longitude)?;
        Ok(Self {
            initial,
            zoom: config.view.zoom,
            initial_style: config.view.style,
            fit_padding: config.view.fit_padding,
        })
    }

    /// Set the zoom level.
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the initial imagery style.
    pub fn with_style(mut self, style: ImageryStyle) -> Self {
        self.initial_style = style;
        self
    }

    /// Set the padding for search-driven fits.
    pub fn with_fit_padding(mut self, padding: u32) -> Self {
        self.fit_padding = padding;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_santiago() {
        let config = AppConfig::default();
        assert_eq!(config.initial.lat(), -33.42651995258547);
        assert_eq!(config.initial.lon(), -70.66558906755355);
        assert_eq!(config.zoom, 12);
        assert_eq!(config.initial_style, ImageryStyle::Roadmap);
    }

    #[test]
    fn test_builder() {
        let config = AppConfig::new(Coordinate::new(51.5, -0.12).unwrap())
            .with_zoom(8)
            .with_style(ImageryStyle::Satellite)
            .with_fit_padding(16);

        assert_eq!(config.zoom, 8);
        assert_eq!(config.initial_style, ImageryStyle::Satellite);
        assert_eq!(config.fit_padding, 16);
    }

    #[test]
    fn test_from_config_file() {
        let mut file = ConfigFile::default();
        file.view.latitude = 40.0;
        file.view.longitude = -74.0;
        file.view.zoom = 9;

        let config = AppConfig::from_config_file(&file).unwrap();
        assert_eq!(config.initial, Coordinate::new(40.0, -74.0).unwrap());
        assert_eq!(config.zoom, 9);
    }

    #[test]
    fn test_from_config_file_rejects_bad_coordinate() {
        let mut file = ConfigFile::default();
        file.view.latitude = 120.0;

        assert!(matches!(
            AppConfig::from_config_file(&file),
            Err(AppError::InvalidInitialCoordinate(_))
        ));
    }
}
