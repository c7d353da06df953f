//! Mouse-driven rectangle selection as a pure state machine.
//!
//! The page overlay forwards raw pointer and key events; the session tracks
//! the drag in logical (CSS) pixels and, on release, converts the final
//! rectangle to device pixels. Releasing a rectangle at or below the minimum
//! size in either axis resolves as no selection rather than an error.
//!
//! Resolution consumes the session, so a finished selection cannot keep
//! receiving events.

use serde::{Deserialize, Serialize};

use tabcap_core::geometry::PixelRect;

/// Minimum drag size, in logical pixels, in each axis. A release must
/// strictly exceed this in both axes to count as a selection.
pub const MIN_SELECTION_LOGICAL_PX: f64 = 10.0;

/// A pointer or key event forwarded from the page overlay.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SelectionEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp { x: f64, y: f64 },
    /// Cancel key (Escape) pressed.
    Cancel,
}

/// Terminal result of a selection session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SelectionOutcome {
    /// Final rectangle in device pixels.
    Selected { rect: PixelRect },
    /// Cancel key pressed, or released below the minimum size.
    Cancelled,
}

/// Result of feeding one event into a session.
#[derive(Debug)]
pub enum SessionStep {
    /// Still selecting; keep pumping events into the returned session.
    Pending(SelectionSession),
    /// Selection finished; the session is gone.
    Done(SelectionOutcome),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Idle,
    Dragging { start: (f64, f64), current: (f64, f64) },
}

/// One in-progress selection. `Idle → Dragging → Resolved/Cancelled`.
#[derive(Clone, Debug)]
pub struct SelectionSession {
    scale: f64,
    phase: Phase,
}

impl SelectionSession {
    /// Start a session for a page with the given device pixel ratio.
    pub fn new(device_pixel_ratio: f64) -> Self {
        Self {
            scale: if device_pixel_ratio > 0.0 {
                device_pixel_ratio
            } else {
                1.0
            },
            phase: Phase::Idle,
        }
    }

    /// Rectangle currently spanned by the drag, in logical pixels
    /// (`left, top, width, height`). Used by overlays to render the live
    /// selection box; `None` before the drag starts.
    pub fn drag_rect(&self) -> Option<(f64, f64, f64, f64)> {
        match self.phase {
            Phase::Idle => None,
            Phase::Dragging { start, current } => Some(span(start, current)),
        }
    }

    /// Feed one event. Out-of-order events (a move before a press, a second
    /// press mid-drag) are ignored rather than treated as errors.
    pub fn handle(mut self, event: SelectionEvent) -> SessionStep {
        match (self.phase, event) {
            (_, SelectionEvent::Cancel) => SessionStep::Done(SelectionOutcome::Cancelled),

            (Phase::Idle, SelectionEvent::PointerDown { x, y }) => {
                self.phase = Phase::Dragging {
                    start: (x, y),
                    current: (x, y),
                };
                SessionStep::Pending(self)
            }

            (Phase::Dragging { start, .. }, SelectionEvent::PointerMove { x, y }) => {
                self.phase = Phase::Dragging {
                    start,
                    current: (x, y),
                };
                SessionStep::Pending(self)
            }

            (Phase::Dragging { start, .. }, SelectionEvent::PointerUp { x, y }) => {
                let (left, top, width, height) = span(start, (x, y));
                if width > MIN_SELECTION_LOGICAL_PX && height > MIN_SELECTION_LOGICAL_PX {
                    let rect = PixelRect::from_logical(left, top, width, height, self.scale);
                    SessionStep::Done(SelectionOutcome::Selected { rect })
                } else {
                    SessionStep::Done(SelectionOutcome::Cancelled)
                }
            }

            // Ignored: move/up while idle, repeated press while dragging.
            _ => SessionStep::Pending(self),
        }
    }
}

/// Rectangle spanning two points, as `(left, top, width, height)`.
fn span(a: (f64, f64), b: (f64, f64)) -> (f64, f64, f64, f64) {
    let left = a.0.min(b.0);
    let top = a.1.min(b.1);
    (left, top, (a.0 - b.0).abs(), (a.1 - b.1).abs())
}
