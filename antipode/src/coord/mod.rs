//! Antipode transform.
//!
//! Maps a coordinate, or a rectangular viewport, to the point (or region)
//! diametrically opposite on the globe.
//!
//! # Convention
//!
//! - Latitude is negated.
//! - Longitude is shifted by 180°: `lon + 180` when negative, `lon - 180`
//!   otherwise. Longitude `0` therefore maps to `-180`.
//!
//! Under this convention `antipode_of(antipode_of(p)) == p` for every valid
//! `p` whose shifted longitude is representable, which covers every longitude
//! of magnitude 64° or more and every value on a binary grid of 2^-44°.
//! Longitude `180` comes back as `-180`, the same meridian.
//!
//! At the poles the longitude is degenerate but is still computed by the
//! same rule.

mod types;

pub use types::{Coordinate, CoordError, Viewport, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Compute the antipode of a coordinate.
///
/// # Errors
///
/// Returns [`CoordError::InvalidCoordinate`] if the input is out of range.
/// Callers normally pass widget-supplied values, so this is a guard rather
/// than an expected path.
#[inline]
pub fn antipode_of(coord: Coordinate) -> Result<Coordinate, CoordError> {
    coord.validate()?;

    let lon = coord.lon();
    let antipode_lon = if lon < 0.0 { lon + 180.0 } else { lon - 180.0 };

    Ok(Coordinate::new_unchecked(-coord.lat(), antipode_lon))
}

/// Compute the antipodal viewport.
///
/// Negating latitude swaps north and south; shifting longitude by 180°
/// keeps the band's east-going direction but moves both edges. So the
/// input's north-west corner lands on the output's south-west corner and
/// the input's south-east corner lands on the output's north-east corner.
///
/// ```text
/// input                           antipode
/// NW (15, -10) +-----+ (15, 10)   NW (-5, 170) +-----+ NE (-5, -170)
///              |     |                         |     |
///     (5, -10) +-----+ SE (5, 10) SW (-15, 170)+-----+ (-15, -170)
/// ```
///
/// Zero-area and dateline-crossing viewports are accepted and produce a
/// correspondingly degenerate or wrapping result; nothing is normalized.
///
/// # Errors
///
/// Returns [`CoordError::InvalidViewport`] for a malformed viewport.
pub fn antipode_of_viewport(viewport: &Viewport) -> Result<Viewport, CoordError> {
    viewport.validate()?;

    let south_west = antipode_of(viewport.north_west())?;
    let north_east = antipode_of(viewport.south_east())?;

    Viewport::from_corners(south_west, north_east)
}

/// Wrap a longitude into [-180, 180].
///
/// Values already in range are returned untouched, so `180` stays `180`.
#[inline]
pub fn normalize_longitude(lon: f64) -> f64 {
    if (MIN_LON..=MAX_LON).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}
