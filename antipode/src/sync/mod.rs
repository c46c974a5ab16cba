//! Bidirectional view synchronization.
//!
//! Keeps viewer B showing the antipode of whatever viewer A shows, and vice
//! versa. Each "viewport changed" notification from one viewer computes the
//! antipodal viewport and fits the other viewer to it.
//!
//! # State Machine
//!
//! One machine per direction, held as a flag in [`SyncState`]:
//!
//! ```text
//! idle --[genuine change on source]--> propagating
//! propagating --[derived update applied (or abandoned)]--> idle
//! propagating --[change notification from target]--> propagating (dropped)
//! ```
//!
//! The transition back to idle happens synchronously at the end of the same
//! handler call. A notification arriving while propagating is dropped, not
//! queued: a synchronization cycle never causes a second cycle.
//!
//! Imagery style follows the same pattern with its own, independent
//! [`SyncState`].
//!
//! # Threading
//!
//! Hosts deliver events sequentially and run handlers to completion. Both
//! directions share one atomic that a cycle claims from idle by
//! compare-and-swap, so a host that dispatches from several threads still
//! never has both flags set, and never runs two cycles at once.

mod state;

pub use state::SyncState;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::coord::{antipode_of_viewport, CoordError};
use crate::viewer::{MapViewer, ViewerSide};

/// Padding used when fitting the antipodal viewer.
///
/// Must stay zero: any margin makes the target's bounds differ from the
/// exact antipode, and the next cycle would grow them again.
pub const SYNC_FIT_PADDING: u32 = 0;

/// Errors that abandon a single synchronization cycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// The source viewer has not finished initializing.
    #[error("Viewer {side} has no bounds yet")]
    BoundsUnavailable { side: ViewerSide },

    /// The source viewport could not be transformed.
    #[error("Antipode transform failed: {0}")]
    Transform(#[from] CoordError),
}

/// What a handler invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The antipodal view was applied to the other viewer.
    Propagated,
    /// The notification was an echo of an in-flight update and was dropped.
    Suppressed,
    /// The source had nothing to mirror (no imagery style reported).
    Skipped,
}

/// Links two viewers so each shows the antipode of the other.
pub struct ViewSynchronizer {
    viewers: [Arc<dyn MapViewer>; 2],
    viewport_state: SyncState,
    style_state: SyncState,
}

impl std::fmt::Debug for ViewSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewSynchronizer")
            .field("viewport_state", &self.viewport_state)
            .field("style_state", &self.style_state)
            .finish_non_exhaustive()
    }
}

impl ViewSynchronizer {
    /// Create a synchronizer for the pair `(a, b)`.
    ///
    /// Nothing is subscribed until [`ViewSynchronizer::attach`] is called.
    pub fn new(a: Arc<dyn MapViewer>, b: Arc<dyn MapViewer>) -> Self {
        Self {
            viewers: [a, b],
            viewport_state: SyncState::new(),
            style_state: SyncState::new(),
        }
    }

    /// The viewer on `side`.
    pub fn viewer(&self, side: ViewerSide) -> &Arc<dyn MapViewer> {
        &self.viewers[side.index()]
    }

    /// Flags guarding viewport propagation.
    pub fn viewport_state(&self) -> &SyncState {
        &self.viewport_state
    }

    /// Flags guarding imagery style propagation.
    pub fn style_state(&self) -> &SyncState {
        &self.style_state
    }

    /// Handle a viewport change on A.
    pub fn on_a_changed(&self) -> Result<SyncOutcome, SyncError> {
        self.on_changed(ViewerSide::A)
    }

    /// Handle a viewport change on B.
    pub fn on_b_changed(&self) -> Result<SyncOutcome, SyncError> {
        self.on_changed(ViewerSide::B)
    }

    /// Handle a viewport change on `source`.
    ///
    /// # Errors
    ///
    /// [`SyncError::BoundsUnavailable`] if `source` reports no viewport,
    /// [`SyncError::Transform`] if its viewport is malformed. Either way the
    /// cycle is abandoned and both flags are idle again on return.
    pub fn on_changed(&self, source: ViewerSide) -> Result<SyncOutcome, SyncError> {
        let target = source.other();

        // Echo of an update we are applying to `source`.
        if self.viewport_state.is_updating(source) {
            return Ok(SyncOutcome::Suppressed);
        }
        let Some(_guard) = self.viewport_state.try_begin(target) else {
            return Ok(SyncOutcome::Suppressed);
        };

        let viewport = self
            .viewer(source)
            .viewport()
            .ok_or(SyncError::BoundsUnavailable { side: source })?;
        let antipode = antipode_of_viewport(&viewport)?;

        self.viewer(target).fit_to_viewport(&antipode, SYNC_FIT_PADDING);

        Ok(SyncOutcome::Propagated)
    }

    /// Handle an imagery style change on A.
    pub fn on_a_style_changed(&self) -> SyncOutcome {
        self.on_style_changed(ViewerSide::A)
    }

    /// Handle an imagery style change on B.
    pub fn on_b_style_changed(&self) -> SyncOutcome {
        self.on_style_changed(ViewerSide::B)
    }

    /// Mirror `source`'s imagery style onto the other viewer.
    pub fn on_style_changed(&self, source: ViewerSide) -> SyncOutcome {
        let target = source.other();

        if self.style_state.is_updating(source) {
            return SyncOutcome::Suppressed;
        }
        let Some(_guard) = self.style_state.try_begin(target) else {
            return SyncOutcome::Suppressed;
        };

        match self.viewer(source).imagery_style() {
            Some(style) => {
                self.viewer(target).set_imagery_style(style);
                SyncOutcome::Propagated
            }
            None => SyncOutcome::Skipped,
        }
    }

    /// Run a programmatic update on `target` without triggering a cycle.
    ///
    /// Change notifications raised by `target` while `update` runs are
    /// treated as echoes. Used for search-driven updates, which place both
    /// viewers themselves.
    pub fn apply_programmatic<R>(
        &self,
        target: ViewerSide,
        update: impl FnOnce(&dyn MapViewer) -> R,
    ) -> R {
        let _guard = self.viewport_state.try_begin(target);
        update(self.viewer(target).as_ref())
    }

    /// Point `side`'s place search at its current viewport.
    pub fn refresh_search_bias(&self, side: ViewerSide) {
        if let Some(viewport) = self.viewer(side).viewport() {
            self.viewer(side).set_search_bias(&viewport);
        }
    }

    /// Subscribe the handlers to both viewers.
    ///
    /// Subscriptions hold a weak reference, so dropping the last `Arc` to the
    /// synchronizer turns them into no-ops. Failed cycles are logged, never
    /// propagated to the host.
    pub fn attach(self: &Arc<Self>) {
        for side in ViewerSide::BOTH {
            let weak = Arc::downgrade(self);
            self.viewer(side).on_viewport_changed(Arc::new(move || {
                if let Some(sync) = weak.upgrade() {
                    sync.handle_viewport_changed(side);
                }
            }));

            let weak = Arc::downgrade(self);
            self.viewer(side).on_imagery_style_changed(Arc::new(move || {
                if let Some(sync) = weak.upgrade() {
                    sync.handle_style_changed(side);
                }
            }));
        }
        debug!("View synchronizer attached to both viewers");
    }

    fn handle_viewport_changed(&self, side: ViewerSide) {
        match self.on_changed(side) {
            Ok(SyncOutcome::Propagated) => {
                debug!(source = %side, target = %side.other(), "Propagated antipodal viewport");
            }
            Ok(outcome) => {
                trace!(source = %side, ?outcome, "Viewport notification not propagated");
            }
            Err(SyncError::BoundsUnavailable { .. }) => {
                debug!(source = %side, "Viewer not initialized, skipping synchronization");
            }
            Err(e) => {
                warn!(source = %side, error = %e, "Abandoned synchronization cycle");
            }
        }
        self.refresh_search_bias(side);
    }

    fn handle_style_changed(&self, side: ViewerSide) {
        let outcome = self.on_style_changed(side);
        trace!(source = %side, ?outcome, "Imagery style notification handled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{Coordinate, Viewport};
    use crate::viewer::{HeadlessViewer, ImageryStyle, ViewerCall};

    fn pair() -> (Arc<HeadlessViewer>, Arc<HeadlessViewer>, Arc<ViewSynchronizer>) {
        let a = Arc::new(HeadlessViewer::new("a", 10));
        let b = Arc::new(HeadlessViewer::new("b", 10));
        let sync = Arc::new(ViewSynchronizer::new(a.clone(), b.clone()));
        (a, b, sync)
    }

    fn sample() -> Viewport {
        Viewport::new(15.0, 5.0, 10.0, -10.0).unwrap()
    }

    #[test]
    fn test_a_change_fits_b_to_antipode() {
        let (a, b, sync) = pair();
        a.fit_to_viewport(&sample(), 0);

        let outcome = sync.on_a_changed().unwrap();

        assert_eq!(outcome, SyncOutcome::Propagated);
        assert_eq!(
            b.calls(),
            vec![ViewerCall::FitToViewport {
                viewport: Viewport::new(-5.0, -15.0, -170.0, 170.0).unwrap(),
                padding: 0,
            }]
        );
        assert!(!sync.viewport_state().is_busy());
    }

    #[test]
    fn test_b_change_fits_a() {
        let (a, b, sync) = pair();
        b.fit_to_viewport(&Viewport::new(-5.0, -15.0, -170.0, 170.0).unwrap(), 0);
        a.clear_calls();

        assert_eq!(sync.on_b_changed().unwrap(), SyncOutcome::Propagated);
        assert_eq!(a.viewport(), Some(sample()));
    }

    #[test]
    fn test_bounds_unavailable_releases_flag() {
        let (_a, b, sync) = pair();

        let err = sync.on_a_changed().unwrap_err();

        assert_eq!(err, SyncError::BoundsUnavailable { side: ViewerSide::A });
        assert!(!sync.viewport_state().is_busy());
        assert_eq!(b.fit_count(), 0);
    }

    #[test]
    fn test_invalid_viewport_abandons_cycle() {
        let (a, b, sync) = pair();
        a.fit_to_viewport(&Viewport::new_unchecked(0.0, 10.0, 10.0, -10.0), 0);

        let err = sync.on_a_changed().unwrap_err();

        assert!(matches!(err, SyncError::Transform(CoordError::InvalidViewport { .. })));
        assert!(!sync.viewport_state().is_busy());
        assert_eq!(b.fit_count(), 0);

        // Next genuine change still goes through.
        a.fit_to_viewport(&sample(), 0);
        assert_eq!(sync.on_a_changed().unwrap(), SyncOutcome::Propagated);
    }

    #[test]
    fn test_attached_echo_is_suppressed() {
        let (a, b, sync) = pair();
        sync.attach();
        a.fit_to_viewport(&sample(), 0);
        a.clear_calls();
        b.clear_calls();

        a.drag_by(1.0, 1.0);

        assert_eq!(b.fit_count(), 1, "B should be fitted exactly once");
        assert_eq!(a.fit_count(), 0, "B's echo must not reach A");
        assert!(!sync.viewport_state().is_busy());
    }

    #[test]
    fn test_cycle_never_starts_second_cycle() {
        let (a, b, sync) = pair();
        sync.attach();
        a.fit_to_viewport(&sample(), 0);
        b.clear_calls();
        a.clear_calls();

        // A misbehaving widget: fitting B nudges A as a side effect.
        let nudged = Arc::downgrade(&a);
        b.on_viewport_changed(Arc::new(move || {
            if let Some(a) = nudged.upgrade() {
                a.drag_by(0.5, 0.0);
            }
        }));

        a.drag_by(1.0, 0.0);

        assert_eq!(b.fit_count(), 1);
        assert_eq!(a.fit_count(), 0);
    }

    #[test]
    fn test_search_bias_follows_viewport() {
        let (a, b, sync) = pair();
        sync.attach();
        a.set_center(Coordinate::new(-33.4, -70.6).unwrap());

        assert_eq!(a.search_bias(), a.viewport());
        assert_eq!(b.search_bias(), b.viewport());
        assert!(b.search_bias().is_some());
    }

    #[test]
    fn test_style_propagates_once() {
        let (a, b, sync) = pair();
        sync.attach();

        a.set_imagery_style(ImageryStyle::Satellite);

        assert_eq!(b.imagery_style(), Some(ImageryStyle::Satellite));
        assert_eq!(
            b.count_calls(|c| matches!(c, ViewerCall::SetImageryStyle(_))),
            1
        );
        // Only the user's own call on A; nothing bounced back.
        assert_eq!(
            a.count_calls(|c| matches!(c, ViewerCall::SetImageryStyle(_))),
            1
        );
        assert!(!sync.style_state().is_busy());
    }

    #[test]
    fn test_style_skipped_without_source_style() {
        let (_a, b, sync) = pair();
        assert_eq!(sync.on_a_style_changed(), SyncOutcome::Skipped);
        assert_eq!(b.imagery_style(), None);
    }

    #[test]
    fn test_style_and_viewport_guards_are_independent() {
        let (a, _b, sync) = pair();
        a.set_imagery_style(ImageryStyle::Hybrid);

        let _guard = sync.viewport_state().try_begin(ViewerSide::A);
        assert_eq!(sync.on_a_style_changed(), SyncOutcome::Propagated);
    }

    #[test]
    fn test_programmatic_update_does_not_propagate() {
        let (a, b, sync) = pair();
        sync.attach();

        sync.apply_programmatic(ViewerSide::A, |viewer| viewer.fit_to_viewport(&sample(), 0));

        assert_eq!(a.viewport(), Some(sample()));
        assert_eq!(b.fit_count(), 0);
        assert!(!sync.viewport_state().is_busy());
    }

    #[test]
    fn test_dropped_synchronizer_detaches() {
        let (a, b, sync) = pair();
        sync.attach();
        drop(sync);

        a.set_center(Coordinate::new(0.0, 0.0).unwrap());
        assert_eq!(b.fit_count(), 0);
    }
}
