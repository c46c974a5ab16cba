//! Coordinate value types and their validation errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Errors produced by the antipode transform.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude or longitude is outside its valid range (or not a number).
    #[error("Invalid coordinate: latitude {lat}, longitude {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// The viewport is malformed.
    #[error("Invalid viewport: {reason}")]
    InvalidViewport { reason: String },
}

impl CoordError {
    fn invalid_viewport(reason: impl Into<String>) -> Self {
        CoordError::InvalidViewport {
            reason: reason.into(),
        }
    }
}

/// A geographic position in degrees.
///
/// Immutable once constructed. [`Coordinate::new`] validates ranges;
/// [`Coordinate::new_unchecked`] trusts the caller (the mapping widget
/// already clamps what it hands out).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Create a validated coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError::InvalidCoordinate`] if latitude is outside
    /// [-90, 90], longitude is outside [-180, 180], or either is NaN.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordError> {
        let coord = Self { lat, lon };
        coord.validate()?;
        Ok(coord)
    }

    /// Create a coordinate without range checks.
    pub const fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in degrees.
    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[inline]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Check both components are within range.
    pub fn validate(&self) -> Result<(), CoordError> {
        if (MIN_LAT..=MAX_LAT).contains(&self.lat) && (MIN_LON..=MAX_LON).contains(&self.lon) {
            Ok(())
        } else {
            Err(CoordError::InvalidCoordinate {
                lat: self.lat,
                lon: self.lon,
            })
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat_hem = if self.lat >= 0.0 { 'N' } else { 'S' };
        let lon_hem = if self.lon >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.6}°{} {:.6}°{}",
            self.lat.abs(),
            lat_hem,
            self.lon.abs(),
            lon_hem
        )
    }
}

/// The rectangular region visible in a map viewer.
///
/// The band runs east from `west` to `east`. When `west > east` the band
/// crosses the ±180° meridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    north: f64,
    south: f64,
    east: f64,
    west: f64,
}

impl Viewport {
    /// Create a validated viewport.
    ///
    /// Zero-area viewports (`north == south` or `east == west`) are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError::InvalidViewport`] if any edge is out of range
    /// or NaN, or if `north < south`.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self, CoordError> {
        let viewport = Self {
            north,
            south,
            east,
            west,
        };
        viewport.validate()?;
        Ok(viewport)
    }

    /// Create a viewport without validation.
    pub const fn new_unchecked(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Assemble a viewport from its south-west and north-east corners.
    pub fn from_corners(south_west: Coordinate, north_east: Coordinate) -> Result<Self, CoordError> {
        Self::new(
            north_east.lat(),
            south_west.lat(),
            north_east.lon(),
            south_west.lon(),
        )
    }

    /// Northern edge latitude.
    #[inline]
    pub fn north(&self) -> f64 {
        self.north
    }

    /// Southern edge latitude.
    #[inline]
    pub fn south(&self) -> f64 {
        self.south
    }

    /// Eastern edge longitude.
    #[inline]
    pub fn east(&self) -> f64 {
        self.east
    }

    /// Western edge longitude.
    #[inline]
    pub fn west(&self) -> f64 {
        self.west
    }

    /// North-west corner.
    pub fn north_west(&self) -> Coordinate {
        Coordinate::new_unchecked(self.north, self.west)
    }

    /// South-east corner.
    pub fn south_east(&self) -> Coordinate {
        Coordinate::new_unchecked(self.south, self.east)
    }

    /// Whether the band wraps across the ±180° meridian.
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// Latitude extent in degrees.
    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    /// Longitude extent in degrees, measured east from `west`.
    pub fn lon_span(&self) -> f64 {
        if self.crosses_antimeridian() {
            self.east + 360.0 - self.west
        } else {
            self.east - self.west
        }
    }

    /// Geometric center, honoring dateline wrap.
    pub fn center(&self) -> Coordinate {
        let lat = (self.north + self.south) / 2.0;
        let lon = super::normalize_longitude(self.west + self.lon_span() / 2.0);
        Coordinate::new_unchecked(lat, lon)
    }

    /// Check edges are in range and ordered.
    pub fn validate(&self) -> Result<(), CoordError> {
        for (name, lat) in [("north", self.north), ("south", self.south)] {
            if !(MIN_LAT..=MAX_LAT).contains(&lat) {
                return Err(CoordError::invalid_viewport(format!(
                    "{} edge {} outside [-90, 90]",
                    name, lat
                )));
            }
        }
        for (name, lon) in [("east", self.east), ("west", self.west)] {
            if !(MIN_LON..=MAX_LON).contains(&lon) {
                return Err(CoordError::invalid_viewport(format!(
                    "{} edge {} outside [-180, 180]",
                    name, lon
                )));
            }
        }
        if self.north < self.south {
            return Err(CoordError::invalid_viewport(format!(
                "north {} is below south {}",
                self.north, self.south
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N {:.6} S {:.6} E {:.6} W {:.6}",
            self.north, self.south, self.east, self.west
        )
    }
}
