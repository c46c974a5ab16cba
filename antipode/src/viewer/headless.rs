//! In-process viewer without rendering.
//!
//! `HeadlessViewer` keeps just enough state to behave like a map widget from
//! the core's point of view: a visible region, an imagery style, markers and
//! synchronously dispatched change notifications. Every call made through
//! [`MapViewer`] is appended to a journal so tests and the CLI simulation can
//! count what the synchronizer actually did.
//!
//! User gestures (`drag_by`, `zoom_to`) mutate the viewer and notify
//! subscribers but are not journaled; only programmatic calls are.

use parking_lot::Mutex;

use super::{ChangeHandler, ImageryStyle, MapViewer, MarkerHandle};
use crate::coord::{normalize_longitude, Coordinate, Viewport, MAX_LAT, MIN_LAT};

/// Default canvas size in pixels (width, height).
pub const DEFAULT_VIEWER_SIZE: (u32, u32) = (1024, 512);

/// Longitude span in degrees visible at `zoom` (one 360° world at zoom 0).
#[inline]
pub fn span_for_zoom(zoom: u8) -> f64 {
    360.0 / 2.0_f64.powi(zoom as i32)
}

/// A programmatic call received through [`MapViewer`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCall {
    FitToViewport { viewport: Viewport, padding: u32 },
    SetCenter(Coordinate),
    SetImageryStyle(ImageryStyle),
    CreateMarker {
        position: Coordinate,
        label: Option<String>,
    },
    RetireMarker(MarkerHandle),
    SetSearchBias(Viewport),
}

/// A live marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub handle: MarkerHandle,
    pub position: Coordinate,
    pub label: Option<String>,
}

#[derive(Debug)]
struct ViewerState {
    viewport: Option<Viewport>,
    zoom: u8,
    style: Option<ImageryStyle>,
    markers: Vec<Marker>,
    next_marker_id: u64,
    search_bias: Option<Viewport>,
    calls: Vec<ViewerCall>,
}

/// Headless [`MapViewer`] implementation.
pub struct HeadlessViewer {
    name: String,
    width_px: u32,
    height_px: u32,
    state: Mutex<ViewerState>,
    viewport_handlers: Mutex<Vec<ChangeHandler>>,
    style_handlers: Mutex<Vec<ChangeHandler>>,
}

impl std::fmt::Debug for HeadlessViewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessViewer")
            .field("name", &self.name)
            .field("width_px", &self.width_px)
            .field("height_px", &self.height_px)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl HeadlessViewer {
    /// Create an uninitialized viewer at `zoom`.
    ///
    /// The viewport stays absent until the first `set_center` or
    /// `fit_to_viewport`, the way a real widget reports no bounds before its
    /// first render.
    pub fn new(name: impl Into<String>, zoom: u8) -> Self {
        Self {
            name: name.into(),
            width_px: DEFAULT_VIEWER_SIZE.0,
            height_px: DEFAULT_VIEWER_SIZE.1,
            state: Mutex::new(ViewerState {
                viewport: None,
                zoom,
                style: None,
                markers: Vec::new(),
                next_marker_id: 1,
                search_bias: None,
                calls: Vec::new(),
            }),
            viewport_handlers: Mutex::new(Vec::new()),
            style_handlers: Mutex::new(Vec::new()),
        }
    }

    /// Set the canvas size used to convert zoom and padding into degrees.
    pub fn with_size(mut self, width_px: u32, height_px: u32) -> Self {
        self.width_px = width_px.max(1);
        self.height_px = height_px.max(1);
        self
    }

    /// Viewer name (for logs and CLI output).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last zoom level requested.
    pub fn zoom(&self) -> u8 {
        self.state.lock().zoom
    }

    /// Live markers.
    pub fn markers(&self) -> Vec<Marker> {
        self.state.lock().markers.clone()
    }

    /// Region the place search is currently biased toward.
    pub fn search_bias(&self) -> Option<Viewport> {
        self.state.lock().search_bias
    }

    /// Journal of programmatic calls, oldest first.
    pub fn calls(&self) -> Vec<ViewerCall> {
        self.state.lock().calls.clone()
    }

    /// Number of journaled calls matching `predicate`.
    pub fn count_calls(&self, predicate: impl Fn(&ViewerCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| predicate(*c)).count()
    }

    /// Number of `fit_to_viewport` calls received.
    pub fn fit_count(&self) -> usize {
        self.count_calls(|c| matches!(c, ViewerCall::FitToViewport { .. }))
    }

    /// Forget all journaled calls.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Simulate the user dragging the map by the given offset in degrees.
    ///
    /// Does nothing before the viewer has a viewport.
    pub fn drag_by(&self, d_lat: f64, d_lon: f64) {
        let changed = {
            let mut state = self.state.lock();
            match state.viewport {
                Some(current) => {
                    let center = current.center();
                    let target = Coordinate::new_unchecked(
                        (center.lat() + d_lat).clamp(MIN_LAT, MAX_LAT),
                        normalize_longitude(center.lon() + d_lon),
                    );
                    let next = viewport_around(target, current.lat_span(), current.lon_span());
                    replace_viewport(&mut state, next)
                }
                None => false,
            }
        };
        if changed {
            self.notify_viewport_changed();
        }
    }

    /// Simulate the user zooming to `zoom`, keeping the current center.
    pub fn zoom_to(&self, zoom: u8) {
        let changed = {
            let mut state = self.state.lock();
            state.zoom = zoom;
            match state.viewport {
                Some(current) => {
                    let (lat_span, lon_span) = self.spans_for_zoom(zoom);
                    let next = viewport_around(current.center(), lat_span, lon_span);
                    replace_viewport(&mut state, next)
                }
                None => false,
            }
        };
        if changed {
            self.notify_viewport_changed();
        }
    }

    fn spans_for_zoom(&self, zoom: u8) -> (f64, f64) {
        let lon_span = span_for_zoom(zoom);
        let lat_span = lon_span * self.height_px as f64 / self.width_px as f64;
        (lat_span, lon_span)
    }

    fn notify_viewport_changed(&self) {
        // Snapshot so handlers can subscribe or call back in without deadlock.
        let handlers: Vec<ChangeHandler> = self.viewport_handlers.lock().clone();
        for handler in handlers {
            handler();
        }
    }

    fn notify_style_changed(&self) {
        let handlers: Vec<ChangeHandler> = self.style_handlers.lock().clone();
        for handler in handlers {
            handler();
        }
    }
}

impl MapViewer for HeadlessViewer {
    fn viewport(&self) -> Option<Viewport> {
        self.state.lock().viewport
    }

    fn fit_to_viewport(&self, viewport: &Viewport, padding: u32) {
        let changed = {
            let mut state = self.state.lock();
            state.calls.push(ViewerCall::FitToViewport {
                viewport: *viewport,
                padding,
            });
            let margin_lat = padding as f64 * viewport.lat_span() / self.height_px as f64;
            let margin_lon = padding as f64 * viewport.lon_span() / self.width_px as f64;
            let next = grow(viewport, margin_lat, margin_lon);
            replace_viewport(&mut state, next)
        };
        if changed {
            self.notify_viewport_changed();
        }
    }

    fn set_center(&self, center: Coordinate) {
        let changed = {
            let mut state = self.state.lock();
            state.calls.push(ViewerCall::SetCenter(center));
            let (lat_span, lon_span) = match state.viewport {
                Some(current) => (current.lat_span(), current.lon_span()),
                None => self.spans_for_zoom(state.zoom),
            };
            let next = viewport_around(center, lat_span, lon_span);
            replace_viewport(&mut state, next)
        };
        if changed {
            self.notify_viewport_changed();
        }
    }

    fn imagery_style(&self) -> Option<ImageryStyle> {
        self.state.lock().style
    }

    fn set_imagery_style(&self, style: ImageryStyle) {
        let changed = {
            let mut state = self.state.lock();
            state.calls.push(ViewerCall::SetImageryStyle(style));
            let changed = state.style != Some(style);
            state.style = Some(style);
            changed
        };
        if changed {
            self.notify_style_changed();
        }
    }

    fn on_viewport_changed(&self, handler: ChangeHandler) {
        self.viewport_handlers.lock().push(handler);
    }

    fn on_imagery_style_changed(&self, handler: ChangeHandler) {
        self.style_handlers.lock().push(handler);
    }

    fn create_marker(&self, position: Coordinate, label: Option<&str>) -> MarkerHandle {
        let mut state = self.state.lock();
        let handle = MarkerHandle::new(state.next_marker_id);
        state.next_marker_id += 1;
        let label = label.map(str::to_string);
        state.calls.push(ViewerCall::CreateMarker {
            position,
            label: label.clone(),
        });
        state.markers.push(Marker {
            handle,
            position,
            label,
        });
        handle
    }

    fn retire_marker(&self, marker: MarkerHandle) {
        let mut state = self.state.lock();
        state.calls.push(ViewerCall::RetireMarker(marker));
        state.markers.retain(|m| m.handle != marker);
    }

    fn set_search_bias(&self, region: &Viewport) {
        let mut state = self.state.lock();
        state.calls.push(ViewerCall::SetSearchBias(*region));
        state.search_bias = Some(*region);
    }
}

/// Store `next`, reporting whether the visible region changed.
fn replace_viewport(state: &mut ViewerState, next: Viewport) -> bool {
    let changed = state.viewport != Some(next);
    state.viewport = Some(next);
    changed
}

fn viewport_around(center: Coordinate, lat_span: f64, lon_span: f64) -> Viewport {
    let half_lat = lat_span / 2.0;
    let north = (center.lat() + half_lat).min(MAX_LAT);
    let south = (center.lat() - half_lat).max(MIN_LAT);
    if lon_span >= 360.0 {
        return Viewport::new_unchecked(north, south, 180.0, -180.0);
    }
    let half_lon = lon_span / 2.0;
    Viewport::new_unchecked(
        north,
        south,
        normalize_longitude(center.lon() + half_lon),
        normalize_longitude(center.lon() - half_lon),
    )
}

fn grow(viewport: &Viewport, margin_lat: f64, margin_lon: f64) -> Viewport {
    if margin_lat == 0.0 && margin_lon == 0.0 {
        return *viewport;
    }
    let north = (viewport.north() + margin_lat).min(MAX_LAT);
    let south = (viewport.south() - margin_lat).max(MIN_LAT);
    if viewport.lon_span() + 2.0 * margin_lon >= 360.0 {
        return Viewport::new_unchecked(north, south, 180.0, -180.0);
    }
    Viewport::new_unchecked(
        north,
        south,
        normalize_longitude(viewport.east() + margin_lon),
        normalize_longitude(viewport.west() - margin_lon),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_handler(counter: &Arc<AtomicUsize>) -> ChangeHandler {
        let counter = Arc::clone(counter);
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_uninitialized_has_no_viewport() {
        let viewer = HeadlessViewer::new("a", 12);
        assert!(viewer.viewport().is_none());
    }

    #[test]
    fn test_set_center_uses_zoom_span() {
        let viewer = HeadlessViewer::new("a", 1).with_size(1000, 500);
        viewer.set_center(Coordinate::new(0.0, 0.0).unwrap());

        let viewport = viewer.viewport().unwrap();
        assert_eq!(viewport.lon_span(), 180.0);
        assert_eq!(viewport.lat_span(), 90.0);
        assert_eq!(viewport.center(), Coordinate::new(0.0, 0.0).unwrap());
    }

    #[test]
    fn test_set_center_keeps_span() {
        let viewer = HeadlessViewer::new("a", 10);
        viewer.fit_to_viewport(&Viewport::new(15.0, 5.0, 10.0, -10.0).unwrap(), 0);
        viewer.set_center(Coordinate::new(40.0, 100.0).unwrap());

        let viewport = viewer.viewport().unwrap();
        assert_eq!(viewport.lat_span(), 10.0);
        assert_eq!(viewport.lon_span(), 20.0);
    }

    #[test]
    fn test_zero_padding_fits_exactly() {
        let viewer = HeadlessViewer::new("a", 10);
        let target = Viewport::new(-5.0, -15.0, -170.0, 170.0).unwrap();
        viewer.fit_to_viewport(&target, 0);
        assert_eq!(viewer.viewport(), Some(target));
    }

    #[test]
    fn test_padding_grows_viewport() {
        let viewer = HeadlessViewer::new("a", 10).with_size(100, 100);
        let target = Viewport::new(10.0, 0.0, 10.0, 0.0).unwrap();
        viewer.fit_to_viewport(&target, 10);

        let viewport = viewer.viewport().unwrap();
        assert_eq!(viewport.north(), 11.0);
        assert_eq!(viewport.south(), -1.0);
        assert_eq!(viewport.east(), 11.0);
        assert_eq!(viewport.west(), -1.0);
    }

    #[test]
    fn test_padding_is_pixels_scaled_per_axis() {
        let viewer = HeadlessViewer::new("a", 10).with_size(200, 100);
        let target = Viewport::new(10.0, 0.0, 10.0, 0.0).unwrap();
        viewer.fit_to_viewport(&target, 20);

        // 20 px of 200 px wide is 1°, of 100 px tall is 2°.
        let viewport = viewer.viewport().unwrap();
        assert_eq!(viewport.north(), 12.0);
        assert_eq!(viewport.south(), -2.0);
        assert_eq!(viewport.east(), 11.0);
        assert_eq!(viewport.west(), -1.0);
    }

    #[test]
    fn test_change_notifications_only_on_change() {
        let viewer = HeadlessViewer::new("a", 10);
        let counter = Arc::new(AtomicUsize::new(0));
        viewer.on_viewport_changed(counting_handler(&counter));

        let target = Viewport::new(10.0, 0.0, 10.0, 0.0).unwrap();
        viewer.fit_to_viewport(&target, 0);
        viewer.fit_to_viewport(&target, 0);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(viewer.fit_count(), 2);
    }

    #[test]
    fn test_style_notification() {
        let viewer = HeadlessViewer::new("a", 10);
        let counter = Arc::new(AtomicUsize::new(0));
        viewer.on_imagery_style_changed(counting_handler(&counter));

        viewer.set_imagery_style(ImageryStyle::Satellite);
        viewer.set_imagery_style(ImageryStyle::Satellite);
        viewer.set_imagery_style(ImageryStyle::Terrain);

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(viewer.imagery_style(), Some(ImageryStyle::Terrain));
    }

    #[test]
    fn test_drag_wraps_across_antimeridian() {
        let viewer = HeadlessViewer::new("a", 10);
        viewer.fit_to_viewport(&Viewport::new(10.0, 0.0, 175.0, 165.0).unwrap(), 0);
        viewer.drag_by(0.0, 10.0);

        let viewport = viewer.viewport().unwrap();
        assert_eq!(viewport.west(), 175.0);
        assert_eq!(viewport.east(), -175.0);
        assert!(viewport.crosses_antimeridian());
    }

    #[test]
    fn test_gestures_are_not_journaled() {
        let viewer = HeadlessViewer::new("a", 10);
        viewer.set_center(Coordinate::new(0.0, 0.0).unwrap());
        viewer.clear_calls();

        viewer.drag_by(1.0, 1.0);
        viewer.zoom_to(11);

        assert!(viewer.calls().is_empty());
        assert_eq!(viewer.zoom(), 11);
    }

    #[test]
    fn test_marker_lifecycle() {
        let viewer = HeadlessViewer::new("a", 10);
        let first = viewer.create_marker(Coordinate::new(1.0, 2.0).unwrap(), Some("Home"));
        let second = viewer.create_marker(Coordinate::new(3.0, 4.0).unwrap(), None);
        assert_ne!(first, second);

        viewer.retire_marker(first);

        let markers = viewer.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].handle, second);
        assert_eq!(markers[0].label, None);
    }

    #[test]
    fn test_handler_may_call_back_into_viewer() {
        let viewer = Arc::new(HeadlessViewer::new("a", 10));
        let weak = Arc::downgrade(&viewer);
        viewer.on_viewport_changed(Arc::new(move || {
            if let Some(viewer) = weak.upgrade() {
                let _ = viewer.viewport();
            }
        }));

        viewer.set_center(Coordinate::new(0.0, 0.0).unwrap());
        assert!(viewer.viewport().is_some());
    }
}
