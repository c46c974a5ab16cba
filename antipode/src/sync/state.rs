//! Reentrancy guard for one synchronized pair.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::viewer::ViewerSide;

const IDLE: u8 = 0;

/// Per-direction propagation flags.
///
/// `updating(A)` is true while a derived update is being applied to viewer
/// A (so A's change notifications are echoes), and likewise for B. Both
/// flags share one atomic and a cycle may only start from idle, so at most
/// one of them is ever set, even when handlers race on several threads. The
/// flag is released by [`PropagationGuard`] on drop, so an early return or
/// error never leaves it stuck.
#[derive(Debug, Default)]
pub struct SyncState {
    updating: AtomicU8,
}

impl SyncState {
    /// Create a state with both directions idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a derived update is currently being applied to `side`.
    #[inline]
    pub fn is_updating(&self, side: ViewerSide) -> bool {
        self.updating.load(Ordering::Acquire) & flag_bit(side) != 0
    }

    /// Whether either direction is propagating.
    pub fn is_busy(&self) -> bool {
        self.updating.load(Ordering::Acquire) != IDLE
    }

    /// Mark `target` as being updated.
    ///
    /// Returns `None` if any update, in either direction, is already in
    /// flight.
    pub(crate) fn try_begin(&self, target: ViewerSide) -> Option<PropagationGuard<'_>> {
        self.updating
            .compare_exchange(IDLE, flag_bit(target), Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PropagationGuard {
                updating: &self.updating,
            })
    }
}

fn flag_bit(side: ViewerSide) -> u8 {
    match side {
        ViewerSide::A => 0b01,
        ViewerSide::B => 0b10,
    }
}

/// Returns the state to idle when dropped.
#[derive(Debug)]
pub(crate) struct PropagationGuard<'a> {
    updating: &'a AtomicU8,
}

impl Drop for PropagationGuard<'_> {
    fn drop(&mut self) {
        self.updating.store(IDLE, Ordering::Release);
    }
}
