//! Application bootstrap implementation.
//!
//! This module contains `AntipodeApp`, which places both viewers, then links
//! them. Setup happens before the synchronizer is attached so the initial
//! placement is never mirrored back.

use std::sync::Arc;

use tracing::info;

use super::config::AppConfig;
use super::error::AppError;
use crate::coord::antipode_of;
use crate::selection::{PlaceResult, SelectionOutcome, SelectionRouter};
use crate::sync::ViewSynchronizer;
use crate::viewer::{MapViewer, ViewerSide};

/// Two linked viewers showing a point and its antipode.
///
/// # Example
///
/// ```ignore
/// use antipode::app::{AntipodeApp, AppConfig};
///
/// let app = AntipodeApp::start(AppConfig::default(), viewer_a, viewer_b)?;
///
/// // Wire the host's search box to the router
/// app.select(ViewerSide::A, &results);
/// ```
#[derive(Debug)]
pub struct AntipodeApp {
    /// Synchronizer (owns the viewer handles and both guard pairs).
    sync: Arc<ViewSynchronizer>,

    /// Selection router (owns the live markers).
    router: SelectionRouter,

    /// Application configuration (retained for accessors).
    config: AppConfig,
}

impl AntipodeApp {
    /// Start the application over two viewers.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidInitialCoordinate`] if the configured
    /// initial point is out of range. No viewer is touched in that case.
    pub fn start(
        config: AppConfig,
        a: Arc<dyn MapViewer>,
        b: Arc<dyn MapViewer>,
    ) -> Result<Self, AppError> {
        let initial = config.initial;
        let antipode = antipode_of(initial)?;

        a.set_center(initial);
        b.set_center(antipode);
        a.set_imagery_style(config.initial_style);
        b.set_imagery_style(config.initial_style);
        let marker_a = a.create_marker(initial, None);
        let marker_b = b.create_marker(antipode, None);

        let sync = Arc::new(ViewSynchronizer::new(a, b));
        sync.attach();
        for side in ViewerSide::BOTH {
            sync.refresh_search_bias(side);
        }

        let router = SelectionRouter::new(Arc::clone(&sync), config.fit_padding)
            .with_markers(marker_a, marker_b);

        info!(
            initial = %initial,
            antipode = %antipode,
            zoom = config.zoom,
            style = %config.initial_style,
            "Antipode viewers linked"
        );

        Ok(Self {
            sync,
            router,
            config,
        })
    }

    /// Route a place search performed on `origin`.
    pub fn select(&self, origin: ViewerSide, results: &[PlaceResult]) -> SelectionOutcome {
        self.router.handle(origin, results)
    }

    /// The synchronizer linking the viewers.
    pub fn synchronizer(&self) -> &Arc<ViewSynchronizer> {
        &self.sync
    }

    /// The selection router.
    pub fn router(&self) -> &SelectionRouter {
        &self.router
    }

    /// The viewer on `side`.
    pub fn viewer(&self, side: ViewerSide) -> &Arc<dyn MapViewer> {
        self.sync.viewer(side)
    }

    /// The configuration the app was started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::viewer::{HeadlessViewer, ImageryStyle};

    fn viewers() -> (Arc<HeadlessViewer>, Arc<HeadlessViewer>) {
        (
            Arc::new(HeadlessViewer::new("a", 12)),
            Arc::new(HeadlessViewer::new("b", 12)),
        )
    }

    #[test]
    fn test_start_places_both_viewers() {
        let (a, b) = viewers();
        let config = AppConfig::default().with_style(ImageryStyle::Terrain);

        let app = AntipodeApp::start(config, a.clone(), b.clone()).unwrap();

        let antipode = antipode_of(app.config().initial).unwrap();
        let center = a.viewport().unwrap().center();
        assert!((center.lat() - app.config().initial.lat()).abs() < 1e-9);
        assert!((center.lon() - app.config().initial.lon()).abs() < 1e-9);
        assert_eq!(b.markers()[0].position, antipode);
        assert_eq!(a.imagery_style(), Some(ImageryStyle::Terrain));
        assert_eq!(b.imagery_style(), Some(ImageryStyle::Terrain));
        assert_eq!(a.fit_count(), 0);
        assert_eq!(b.fit_count(), 0);
        assert!(a.search_bias().is_some());
        assert!(app.router().marker(ViewerSide::A).is_some());
        assert!(app.router().marker(ViewerSide::B).is_some());
    }

    #[test]
    fn test_start_rejects_invalid_initial() {
        let (a, b) = viewers();
        let config = AppConfig::new(Coordinate::new_unchecked(-91.0, 0.0));

        let result = AntipodeApp::start(config, a.clone(), b.clone());

        assert!(matches!(result, Err(AppError::InvalidInitialCoordinate(_))));
        assert!(a.calls().is_empty());
        assert!(b.calls().is_empty());
    }

    #[test]
    fn test_select_routes_to_router() {
        let (a, b) = viewers();
        let app = AntipodeApp::start(AppConfig::default(), a.clone(), b.clone()).unwrap();
        let paris = Coordinate::new(48.8566, 2.3522).unwrap();

        let outcome = app.select(ViewerSide::A, &[PlaceResult::at(paris)]);

        assert_eq!(outcome, SelectionOutcome::Centered);
        assert_eq!(a.markers().len(), 1);
        assert_eq!(a.markers()[0].position, paris);
    }
}
