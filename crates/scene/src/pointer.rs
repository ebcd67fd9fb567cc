use crate::input::{InputEvent, PointerId};

/// A normalized drag gesture.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Gesture {
    DragStart { x: f64, y: f64 },
    /// Movement since the previous gesture event, in CSS pixels.
    Drag { dx: f64, dy: f64 },
    DragEnd,
}

/// Turns pointer events into drag gestures for one captured pointer.
///
/// The first pointer to go down is captured until it is released or
/// cancelled; events from any other pointer are ignored meanwhile.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PointerTracker {
    captured: Option<PointerId>,
    last: (f64, f64),
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.captured.is_some()
    }

    pub fn captured(&self) -> Option<PointerId> {
        self.captured
    }

    /// Returns the gesture `event` produces, if any. Non-pointer events
    /// always yield `None`.
    pub fn handle(&mut self, event: &InputEvent) -> Option<Gesture> {
        match *event {
            InputEvent::PointerDown { id, x, y } => {
                if self.captured.is_some() {
                    return None;
                }
                self.captured = Some(id);
                self.last = (x, y);
                Some(Gesture::DragStart { x, y })
            }
            InputEvent::PointerMove { id, x, y } if self.captured == Some(id) => {
                let (dx, dy) = (x - self.last.0, y - self.last.1);
                self.last = (x, y);
                if dx == 0.0 && dy == 0.0 {
                    return None;
                }
                Some(Gesture::Drag { dx, dy })
            }
            InputEvent::PointerUp { id, .. } | InputEvent::PointerCancel { id }
                if self.captured == Some(id) =>
            {
                self.captured = None;
                Some(Gesture::DragEnd)
            }
            _ => None,
        }
    }
}
