//! Direct-manipulation positioning for the text block.
//!
//! A drag gesture is modeled as an explicit state machine with `Idle` and
//! `Dragging` states. The math is pure and independent of the event source:
//! mouse and touch deliver the same [`PointerInput`] and go through the same
//! percentage conversion, so the two input paths cannot drift apart.
//!
//! The anchor is clamped to `[0, 100]` on both axes. The rendered block may
//! still overflow the canvas edge; only the anchor is constrained.

use crate::theme::Position;

/// Which device produced a pointer sample. Coordinate math is identical for
/// both; the distinction only matters to callers wiring up event listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

/// One pointer sample in container-relative pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub source: PointerSource,
    pub x: f32,
    pub y: f32,
}

impl PointerInput {
    pub fn mouse(x: f32, y: f32) -> Self {
        Self {
            source: PointerSource::Mouse,
            x,
            y,
        }
    }

    pub fn touch(x: f32, y: f32) -> Self {
        Self {
            source: PointerSource::Touch,
            x,
            y,
        }
    }
}

/// Pixel dimensions of the container the block is dragged within
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerSize {
    pub width: f32,
    pub height: f32,
}

impl ContainerSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging {
        // pointer offset from the anchor at gesture start, in pixels
        grab_x: f32,
        grab_y: f32,
    },
}

/// Converts a pointer-drag gesture into clamped, normalized positions.
///
/// On press the controller captures the offset between the pointer and the
/// block's current anchor, so the block does not jump under the pointer.
/// Every motion sample produces a candidate position
/// `((coord - grab) / container_dim) * 100` per axis, clamped into
/// `[0, 100]`. Release commits the final position and returns to idle.
#[derive(Debug, Clone)]
pub struct DragController {
    container: ContainerSize,
    position: Position,
    state: DragState,
}

impl DragController {
    pub fn new(container: ContainerSize, position: Position) -> Self {
        Self {
            container,
            position,
            state: DragState::Idle,
        }
    }

    /// The most recently computed position
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Update the container dimensions, e.g. after a canvas size change.
    /// Takes effect on the next gesture; an active drag keeps the geometry
    /// it started with.
    pub fn set_container(&mut self, container: ContainerSize) {
        if !self.is_dragging() {
            self.container = container;
        }
    }

    /// Gesture start: capture the grab offset and begin dragging. A press
    /// while already dragging re-grabs at the new pointer location.
    pub fn press(&mut self, input: PointerInput) {
        let anchor_x = self.position.x() / 100.0 * self.container.width;
        let anchor_y = self.position.y() / 100.0 * self.container.height;
        self.state = DragState::Dragging {
            grab_x: input.x - anchor_x,
            grab_y: input.y - anchor_y,
        };
    }

    /// Gesture move: returns the new position, or `None` when no drag is
    /// active. A zero-sized container dimension leaves that axis unchanged.
    pub fn motion(&mut self, input: PointerInput) -> Option<Position> {
        let DragState::Dragging { grab_x, grab_y } = self.state else {
            return None;
        };

        let x = axis_percent(input.x, grab_x, self.container.width)
            .unwrap_or_else(|| self.position.x());
        let y = axis_percent(input.y, grab_y, self.container.height)
            .unwrap_or_else(|| self.position.y());

        self.position = Position::new(x, y);
        Some(self.position)
    }

    /// Gesture end: commit and return the final position. The returned value
    /// must always be delivered to the style model even when intermediate
    /// moves were coalesced. Returns `None` when no drag was active.
    pub fn release(&mut self) -> Option<Position> {
        if !self.is_dragging() {
            return None;
        }
        self.state = DragState::Idle;
        Some(self.position)
    }
}

/// Percentage for one axis, or `None` when the container dimension is
/// degenerate and the axis must not move.
fn axis_percent(coord: f32, grab: f32, dim: f32) -> Option<f32> {
    if dim <= 0.0 || !dim.is_finite() {
        return None;
    }
    Some(((coord - grab) / dim) * 100.0)
}
