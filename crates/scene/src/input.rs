use foundation::math::ZoomDirection;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PointerId(pub u64);

/// Raw input delivered to the viewer by its host.
///
/// Pointer positions are CSS pixels relative to the surface's top-left corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { id: PointerId, x: f64, y: f64 },
    PointerMove { id: PointerId, x: f64, y: f64 },
    PointerUp { id: PointerId, x: f64, y: f64 },
    PointerCancel { id: PointerId },
    Wheel { delta_y: f64 },
    /// Zoom buttons.
    Zoom(ZoomDirection),
    /// New backing-store size of the display surface.
    Resize { width: u32, height: u32 },
}

/// Maps a wheel delta to a zoom step: scrolling down zooms out.
pub fn wheel_direction(delta_y: f64) -> Option<ZoomDirection> {
    if delta_y > 0.0 {
        Some(ZoomDirection::Out)
    } else if delta_y < 0.0 {
        Some(ZoomDirection::In)
    } else {
        None
    }
}
