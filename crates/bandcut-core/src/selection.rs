//! Drag selection state machine.
//!
//! Tracks a band selection driven by pointer input. The controller moves
//! through three phases:
//!
//! - **Idle**: no selection exists
//! - **Selecting**: a drag is in progress and the band follows the pointer
//! - **Committed**: the drag ended and the band is fixed
//!
//! A drag may only start inside the image's display rectangle. Once started
//! it tracks the pointer freely; positions outside the rectangle clamp to
//! the nearest edge. Committing orders the endpoints, so dragging
//! right-to-left produces the same band as left-to-right.

use crate::viewport::{to_normalized, DisplayRect, Point};
use crate::{Axis, SelectionRange};

/// Observable phase of the selection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    Selecting,
    Committed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Selecting { start: f64, end: f64 },
    Committed(SelectionRange),
}

/// State machine for band selection by pointer drag.
#[derive(Debug, Clone)]
pub struct SelectionController {
    axis: Axis,
    display: DisplayRect,
    phase: Phase,
}

impl SelectionController {
    /// Create an idle controller for the given axis.
    ///
    /// The display rectangle starts empty; until [`set_display_rect`] is
    /// called with a laid-out image every drag start is rejected.
    ///
    /// [`set_display_rect`]: SelectionController::set_display_rect
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            display: DisplayRect::default(),
            phase: Phase::Idle,
        }
    }

    /// The axis new selections are bounded on.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Current phase.
    pub fn phase(&self) -> SelectionPhase {
        match self.phase {
            Phase::Idle => SelectionPhase::Idle,
            Phase::Selecting { .. } => SelectionPhase::Selecting,
            Phase::Committed(_) => SelectionPhase::Committed,
        }
    }

    /// Update the display rectangle after a layout change.
    ///
    /// Selection state is kept: normalized positions stay valid across
    /// window resizes because they are relative to the image, not the
    /// viewport.
    pub fn set_display_rect(&mut self, rect: DisplayRect) {
        self.display = rect;
    }

    /// Change the selection axis. Changing to a different axis discards
    /// any selection in progress or committed; setting the same axis is a
    /// no-op.
    pub fn set_axis(&mut self, axis: Axis) {
        if self.axis != axis {
            self.axis = axis;
            self.phase = Phase::Idle;
        }
    }

    /// Notify the controller that a different image is now shown.
    /// Any selection state is discarded.
    pub fn image_changed(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Start a drag at a pointer position.
    ///
    /// Returns `true` if a selection was started. The start is rejected
    /// (returning `false`) when the point lies outside the image's display
    /// rectangle or a drag is already in progress.
    pub fn begin(&mut self, point: Point) -> bool {
        match self.phase {
            Phase::Selecting { .. } => false,
            Phase::Idle | Phase::Committed(_) => {
                if !self.display.contains(point) {
                    return false;
                }
                let pos = to_normalized(point, &self.display, self.axis);
                self.phase = Phase::Selecting { start: pos, end: pos };
                true
            }
        }
    }

    /// Move the free endpoint of an in-progress drag.
    ///
    /// Positions outside the display rectangle clamp to its edge. Returns
    /// `false` if no drag is in progress.
    pub fn update(&mut self, point: Point) -> bool {
        match &mut self.phase {
            Phase::Selecting { end, .. } => {
                *end = to_normalized(point, &self.display, self.axis);
                true
            }
            _ => false,
        }
    }

    /// End the drag and fix the band.
    ///
    /// Returns the committed range, or `None` if no drag was in progress.
    pub fn commit(&mut self) -> Option<SelectionRange> {
        match self.phase {
            Phase::Selecting { start, end } => {
                let range = SelectionRange::new(start, end, self.axis);
                self.phase = Phase::Committed(range);
                Some(range)
            }
            _ => None,
        }
    }

    /// Discard any selection, in progress or committed.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }

    /// The committed band, if any.
    pub fn committed_range(&self) -> Option<SelectionRange> {
        match self.phase {
            Phase::Committed(range) => Some(range),
            _ => None,
        }
    }

    /// The band to draw right now: the live band during a drag, or the
    /// committed band after one. `None` when idle.
    pub fn active_range(&self) -> Option<SelectionRange> {
        match self.phase {
            Phase::Idle => None,
            Phase::Selecting { start, end } => Some(SelectionRange::new(start, end, self.axis)),
            Phase::Committed(range) => Some(range),
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::viewport::{contain_rect, Size};
    use proptest::prelude::*;

    proptest! {
        /// Property: Any drag inside the rect commits to an ordered range in [0, 1].
        #[test]
        fn prop_commit_is_ordered(
            start_x in 0.0f64..=200.0,
            end_x in -100.0f64..=300.0,
        ) {
            let mut ctrl = SelectionController::new(Axis::Vertical);
            ctrl.set_display_rect(contain_rect(Size::new(200.0, 100.0), 200, 100));

            prop_assume!(ctrl.begin(Point::new(start_x, 50.0)));
            ctrl.update(Point::new(end_x, 50.0));
            let range = ctrl.commit().unwrap();

            prop_assert!(range.start <= range.end);
            prop_assert!((0.0..=1.0).contains(&range.start));
            prop_assert!((0.0..=1.0).contains(&range.end));
        }

        /// Property: Mirrored drags commit to the same band.
        #[test]
        fn prop_drag_direction_irrelevant(
            a in 0.0f64..=200.0,
            b in 0.0f64..=200.0,
        ) {
            let rect = contain_rect(Size::new(200.0, 100.0), 200, 100);

            let mut forward = SelectionController::new(Axis::Vertical);
            forward.set_display_rect(rect);
            prop_assume!(forward.begin(Point::new(a, 50.0)));
            forward.update(Point::new(b, 50.0));
            let forward_range = forward.commit().unwrap();

            let mut reverse = SelectionController::new(Axis::Vertical);
            reverse.set_display_rect(rect);
            prop_assume!(reverse.begin(Point::new(b, 50.0)));
            reverse.update(Point::new(a, 50.0));
            let reverse_range = reverse.commit().unwrap();

            prop_assert_eq!(forward_range, reverse_range);
        }
    }
}
