//! The mapping-widget collaborator.
//!
//! The synchronizer and selection router never touch a concrete map SDK.
//! They read and write viewers through the narrow [`MapViewer`] trait,
//! which a host implements over its widget and tests implement with
//! [`HeadlessViewer`].
//!
//! # Event Delivery
//!
//! Handlers registered with `on_viewport_changed` / `on_imagery_style_changed`
//! are invoked synchronously and run to completion before the mutating call
//! returns. The synchronizer's echo suppression relies on this.

mod headless;

pub use headless::{span_for_zoom, HeadlessViewer, Marker, ViewerCall, DEFAULT_VIEWER_SIZE};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::coord::{Coordinate, Viewport};

/// Callback invoked when a viewer's viewport or imagery style changes.
pub type ChangeHandler = Arc<dyn Fn() + Send + Sync>;

/// Identifies one of the two linked viewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewerSide {
    /// The viewer centered on the chosen point.
    A,
    /// The viewer centered on its antipode.
    B,
}

impl ViewerSide {
    /// Both sides, A first.
    pub const BOTH: [ViewerSide; 2] = [ViewerSide::A, ViewerSide::B];

    /// The opposite viewer.
    #[inline]
    pub fn other(self) -> Self {
        match self {
            ViewerSide::A => ViewerSide::B,
            ViewerSide::B => ViewerSide::A,
        }
    }

    /// Array index (A = 0, B = 1).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            ViewerSide::A => 0,
            ViewerSide::B => 1,
        }
    }
}

impl fmt::Display for ViewerSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerSide::A => write!(f, "A"),
            ViewerSide::B => write!(f, "B"),
        }
    }
}

/// Imagery style (map type) shown by a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageryStyle {
    /// Street map.
    #[default]
    Roadmap,
    /// Aerial imagery.
    Satellite,
    /// Aerial imagery with labels.
    Hybrid,
    /// Shaded relief.
    Terrain,
}

impl ImageryStyle {
    /// All styles in display order.
    pub const ALL: [ImageryStyle; 4] = [
        ImageryStyle::Roadmap,
        ImageryStyle::Satellite,
        ImageryStyle::Hybrid,
        ImageryStyle::Terrain,
    ];

    /// Lowercase identifier used in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageryStyle::Roadmap => "roadmap",
            ImageryStyle::Satellite => "satellite",
            ImageryStyle::Hybrid => "hybrid",
            ImageryStyle::Terrain => "terrain",
        }
    }
}

impl fmt::Display for ImageryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown imagery style name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown imagery style '{0}' (expected roadmap, satellite, hybrid or terrain)")]
pub struct UnknownStyle(pub String);

impl FromStr for ImageryStyle {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ImageryStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == lower)
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}

/// Opaque handle to a marker placed on a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
    /// Wrap a viewer-assigned marker id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The viewer-assigned id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// The operations the core needs from one map viewer.
///
/// Implementations use interior mutability: the core holds viewers as
/// `Arc<dyn MapViewer>` and handlers may call back into any viewer while a
/// mutation is being dispatched, so implementations must not hold internal
/// locks while invoking handlers.
pub trait MapViewer: Send + Sync {
    /// Current visible region, or `None` before the viewer has initialized.
    fn viewport(&self) -> Option<Viewport>;

    /// Show `viewport`, with `padding` pixels of margin on each side.
    fn fit_to_viewport(&self, viewport: &Viewport, padding: u32);

    /// Recenter without changing the visible span.
    fn set_center(&self, center: Coordinate);

    /// Current imagery style, if the viewer reports one.
    fn imagery_style(&self) -> Option<ImageryStyle>;

    /// Switch imagery style.
    fn set_imagery_style(&self, style: ImageryStyle);

    /// Subscribe to viewport changes (drag, zoom, center or bounds).
    fn on_viewport_changed(&self, handler: ChangeHandler);

    /// Subscribe to imagery style changes.
    fn on_imagery_style_changed(&self, handler: ChangeHandler);

    /// Place a marker, optionally labelled.
    fn create_marker(&self, position: Coordinate, label: Option<&str>) -> MarkerHandle;

    /// Detach a marker previously returned by [`MapViewer::create_marker`].
    fn retire_marker(&self, marker: MarkerHandle);

    /// Bias the viewer's place search toward `region`.
    ///
    /// Viewers without a search affordance ignore this.
    fn set_search_bias(&self, _region: &Viewport) {}
}
