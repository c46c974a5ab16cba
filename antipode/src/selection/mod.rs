//! Place selection routing.
//!
//! When the search affordance on one viewer yields a place, the router
//! marks the place on that viewer and its antipode on the other, then frames
//! both views: fitted to the place's display region (and its antipodal
//! region) when one is provided, centered otherwise.
//!
//! Both viewers are updated through [`ViewSynchronizer::apply_programmatic`],
//! so search-driven updates never start a synchronization cycle.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::coord::{antipode_of, antipode_of_viewport, CoordError, Coordinate, Viewport};
use crate::sync::ViewSynchronizer;
use crate::viewer::{MarkerHandle, ViewerSide};

/// Geometry attached to a search result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceGeometry {
    /// The place's position.
    pub location: Option<Coordinate>,
    /// Preferred region to display (e.g. a city's extent).
    pub display_region: Option<Viewport>,
}

/// One result returned by the place search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    pub geometry: Option<PlaceGeometry>,
    pub label: Option<String>,
}

impl PlaceResult {
    /// A result located at `location` with no display region.
    pub fn at(location: Coordinate) -> Self {
        Self {
            geometry: Some(PlaceGeometry {
                location: Some(location),
                display_region: None,
            }),
            label: None,
        }
    }

    /// Attach a preferred display region.
    pub fn with_region(mut self, region: Viewport) -> Self {
        self.geometry
            .get_or_insert_with(PlaceGeometry::default)
            .display_region = Some(region);
        self
    }

    /// Attach a human-readable name.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Errors that reject a selection. No viewer is touched when one occurs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    /// The place has geometry but no location.
    #[error("Selected place has no location")]
    MissingGeometry,

    /// The location or display region is out of range.
    #[error("Antipode transform failed: {0}")]
    Transform(#[from] CoordError),
}

/// Why a selection was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The search returned nothing.
    NoResults,
    /// The first result carries no geometry at all.
    NoGeometry,
    /// The selection was rejected with a [`SelectionError`].
    Rejected,
}

/// Result of routing a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Nothing changed.
    Ignored(IgnoreReason),
    /// Markers placed; both viewers centered on their points.
    Centered,
    /// Markers placed; both viewers fitted to the region and its antipode.
    Fitted,
}

/// Routes search selections to both viewers.
#[derive(Debug)]
pub struct SelectionRouter {
    sync: Arc<ViewSynchronizer>,
    markers: Mutex<[Option<MarkerHandle>; 2]>,
    fit_padding: u32,
}

impl SelectionRouter {
    /// Create a router over the synchronizer's viewers.
    ///
    /// `fit_padding` is the margin, in pixels, used when fitting a viewer to a
    /// place's display region.
    pub fn new(sync: Arc<ViewSynchronizer>, fit_padding: u32) -> Self {
        Self {
            sync,
            markers: Mutex::new([None, None]),
            fit_padding,
        }
    }

    /// Adopt markers already placed on A and B (retired on the next selection).
    pub fn with_markers(self, a: MarkerHandle, b: MarkerHandle) -> Self {
        *self.markers.lock() = [Some(a), Some(b)];
        self
    }

    /// Live marker on `side`, if any.
    pub fn marker(&self, side: ViewerSide) -> Option<MarkerHandle> {
        self.markers.lock()[side.index()]
    }

    /// Route the results of a search performed on `origin`.
    ///
    /// Only the first result is used.
    ///
    /// # Errors
    ///
    /// [`SelectionError::MissingGeometry`] if the first result has geometry
    /// without a location; [`SelectionError::Transform`] if its location or
    /// region is out of range. Markers and viewports are untouched on error.
    pub fn route(
        &self,
        origin: ViewerSide,
        results: &[PlaceResult],
    ) -> Result<SelectionOutcome, SelectionError> {
        let Some(place) = results.first() else {
            return Ok(SelectionOutcome::Ignored(IgnoreReason::NoResults));
        };
        let Some(geometry) = &place.geometry else {
            info!(origin = %origin, "Returned place contains no geometry");
            return Ok(SelectionOutcome::Ignored(IgnoreReason::NoGeometry));
        };
        let location = geometry.location.ok_or(SelectionError::MissingGeometry)?;

        // Derive everything before mutating so a bad result changes nothing.
        let antipode = antipode_of(location)?;
        let framing = match &geometry.display_region {
            Some(region) => Some((*region, antipode_of_viewport(region)?)),
            None => None,
        };

        let other = origin.other();
        {
            let mut markers = self.markers.lock();
            for side in ViewerSide::BOTH {
                if let Some(marker) = markers[side.index()].take() {
                    self.sync.viewer(side).retire_marker(marker);
                }
            }
            markers[origin.index()] = Some(
                self.sync
                    .viewer(origin)
                    .create_marker(location, place.label.as_deref()),
            );
            markers[other.index()] = Some(self.sync.viewer(other).create_marker(antipode, None));
        }

        let outcome = match framing {
            Some((region, antipodal_region)) => {
                let padding = self.fit_padding;
                self.sync.apply_programmatic(origin, |viewer| {
                    viewer.fit_to_viewport(&region, padding)
                });
                self.sync.apply_programmatic(other, |viewer| {
                    viewer.fit_to_viewport(&antipodal_region, padding)
                });
                SelectionOutcome::Fitted
            }
            None => {
                self.sync
                    .apply_programmatic(origin, |viewer| viewer.set_center(location));
                self.sync
                    .apply_programmatic(other, |viewer| viewer.set_center(antipode));
                SelectionOutcome::Centered
            }
        };

        debug!(
            origin = %origin,
            location = %location,
            antipode = %antipode,
            ?outcome,
            "Routed place selection"
        );
        Ok(outcome)
    }

    /// Route a selection, logging instead of returning errors.
    pub fn handle(&self, origin: ViewerSide, results: &[PlaceResult]) -> SelectionOutcome {
        match self.route(origin, results) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring place selection");
                SelectionOutcome::Ignored(IgnoreReason::Rejected)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::{HeadlessViewer, MapViewer, ViewerCall};

    struct Fixture {
        a: Arc<HeadlessViewer>,
        b: Arc<HeadlessViewer>,
        router: SelectionRouter,
    }

    fn fixture() -> Fixture {
        let a = Arc::new(HeadlessViewer::new("a", 12));
        let b = Arc::new(HeadlessViewer::new("b", 12));
        a.set_center(Coordinate::new(0.0, 0.0).unwrap());
        b.set_center(Coordinate::new(0.0, -180.0).unwrap());
        let marker_a = a.create_marker(Coordinate::new(0.0, 0.0).unwrap(), None);
        let marker_b = b.create_marker(Coordinate::new(0.0, -180.0).unwrap(), None);

        let sync = Arc::new(ViewSynchronizer::new(a.clone(), b.clone()));
        sync.attach();
        let router = SelectionRouter::new(sync, 0).with_markers(marker_a, marker_b);

        a.clear_calls();
        b.clear_calls();
        Fixture { a, b, router }
    }

    fn tokyo() -> Coordinate {
        Coordinate::new(35.6762, 139.6503).unwrap()
    }

    #[test]
    fn test_centered_selection_from_a() {
        let f = fixture();
        let results = vec![PlaceResult::at(tokyo()).with_label("Tokyo")];

        let outcome = f.router.route(ViewerSide::A, &results).unwrap();

        assert_eq!(outcome, SelectionOutcome::Centered);
        let antipode = antipode_of(tokyo()).unwrap();

        let markers_a = f.a.markers();
        assert_eq!(markers_a.len(), 1);
        assert_eq!(markers_a[0].position, tokyo());
        assert_eq!(markers_a[0].label.as_deref(), Some("Tokyo"));

        let markers_b = f.b.markers();
        assert_eq!(markers_b.len(), 1);
        assert_eq!(markers_b[0].position, antipode);
        assert_eq!(markers_b[0].label, None);

        assert!(f.a.calls().contains(&ViewerCall::SetCenter(tokyo())));
        assert!(f.b.calls().contains(&ViewerCall::SetCenter(antipode)));
        assert_eq!(f.a.fit_count(), 0, "Centering must not bounds-fit");
        assert_eq!(f.b.fit_count(), 0, "Centering must not bounds-fit");
    }

    #[test]
    fn test_fitted_selection_from_b() {
        let f = fixture();
        let region = Viewport::new(15.0, 5.0, 10.0, -10.0).unwrap();
        let place = PlaceResult::at(Coordinate::new(10.0, 0.0).unwrap()).with_region(region);
        let results = vec![place];

        let outcome = f.router.route(ViewerSide::B, &results).unwrap();

        assert_eq!(outcome, SelectionOutcome::Fitted);
        assert_eq!(f.b.viewport(), Some(region));
        assert_eq!(
            f.a.viewport(),
            Some(Viewport::new(-5.0, -15.0, -170.0, 170.0).unwrap())
        );
        assert_eq!(f.a.fit_count(), 1);
        assert_eq!(f.b.fit_count(), 1);
    }

    #[test]
    fn test_marker_retired_before_creation() {
        let f = fixture();
        let old_a = f.router.marker(ViewerSide::A).unwrap();

        f.router
            .route(ViewerSide::A, &[PlaceResult::at(tokyo())])
            .unwrap();

        let calls = f.a.calls();
        let retire = calls
            .iter()
            .position(|c| *c == ViewerCall::RetireMarker(old_a))
            .unwrap();
        let create = calls
            .iter()
            .position(|c| matches!(c, ViewerCall::CreateMarker { .. }))
            .unwrap();
        assert!(retire < create);
        assert_ne!(f.router.marker(ViewerSide::A), Some(old_a));
    }

    #[test]
    fn test_empty_results_change_nothing() {
        let f = fixture();

        let outcome = f.router.route(ViewerSide::A, &[]).unwrap();

        assert_eq!(outcome, SelectionOutcome::Ignored(IgnoreReason::NoResults));
        assert!(f.a.calls().is_empty());
        assert!(f.b.calls().is_empty());
    }

    #[test]
    fn test_no_geometry_changes_nothing() {
        let f = fixture();
        let results = vec![PlaceResult {
            geometry: None,
            label: Some("Nowhere".to_string()),
        }];

        let outcome = f.router.route(ViewerSide::A, &results).unwrap();

        assert_eq!(outcome, SelectionOutcome::Ignored(IgnoreReason::NoGeometry));
        assert!(f.a.calls().is_empty());
        assert!(f.b.calls().is_empty());
        assert_eq!(f.a.markers().len(), 1);
    }

    #[test]
    fn test_missing_location_is_error() {
        let f = fixture();
        let results = vec![PlaceResult {
            geometry: Some(PlaceGeometry::default()),
            label: None,
        }];

        let err = f.router.route(ViewerSide::B, &results).unwrap_err();

        assert_eq!(err, SelectionError::MissingGeometry);
        assert!(f.a.calls().is_empty());
        assert!(f.b.calls().is_empty());
    }

    #[test]
    fn test_out_of_range_location_rejected_by_handle() {
        let f = fixture();
        let results = vec![PlaceResult::at(Coordinate::new_unchecked(95.0, 0.0))];

        let outcome = f.router.handle(ViewerSide::A, &results);

        assert_eq!(outcome, SelectionOutcome::Ignored(IgnoreReason::Rejected));
        assert!(f.a.calls().is_empty());
        assert!(f.b.calls().is_empty());
    }

    #[test]
    fn test_only_first_result_used() {
        let f = fixture();
        let results = vec![
            PlaceResult::at(tokyo()),
            PlaceResult::at(Coordinate::new(48.8566, 2.3522).unwrap()),
        ];

        f.router.route(ViewerSide::A, &results).unwrap();

        assert_eq!(f.a.markers()[0].position, tokyo());
    }
}
