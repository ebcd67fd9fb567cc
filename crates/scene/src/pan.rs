use foundation::math::{GeoCoordinate, WorldPoint, geo_to_world, world_to_geo};

use crate::camera::PanCamera;

/// Ratio of backing-store pixels to CSS pixels on each axis.
///
/// Pointer deltas arrive in CSS pixels while the map is drawn in backing
/// pixels, so pan deltas are scaled before being applied in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceScale {
    pub x: f64,
    pub y: f64,
}

impl SurfaceScale {
    pub const UNIT: Self = Self { x: 1.0, y: 1.0 };

    pub fn new(backing: (u32, u32), css: (f64, f64)) -> Self {
        let axis = |backing: u32, css: f64| {
            if css > 0.0 && backing > 0 {
                f64::from(backing) / css
            } else {
                1.0
            }
        };
        Self {
            x: axis(backing.0, css.0),
            y: axis(backing.1, css.1),
        }
    }
}

impl Default for SurfaceScale {
    fn default() -> Self {
        Self::UNIT
    }
}

/// An active pan drag.
///
/// The pointer offset is accumulated from the drag start and always applied
/// to the start position, so rounding does not drift over a long drag.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PanDrag {
    start: WorldPoint,
    offset_x: f64,
    offset_y: f64,
    scale: SurfaceScale,
}

impl PanDrag {
    pub fn begin(camera: &PanCamera, scale: SurfaceScale) -> Self {
        Self {
            start: geo_to_world(camera.center, camera.zoom),
            offset_x: 0.0,
            offset_y: 0.0,
            scale,
        }
    }

    /// Adds a pointer delta (CSS pixels) and moves the camera accordingly.
    pub fn apply(&mut self, camera: &mut PanCamera, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
        camera.center = self.center_at(camera);
    }

    fn center_at(&self, camera: &PanCamera) -> GeoCoordinate {
        let delta = WorldPoint::new(self.offset_x * self.scale.x, self.offset_y * self.scale.y);
        world_to_geo(self.start - delta, camera.zoom).normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::{PanDrag, SurfaceScale};
    use crate::camera::PanCamera;
    use foundation::math::{GeoCoordinate, MAX_LATITUDE, ZoomLevel};

    fn camera() -> PanCamera {
        PanCamera::new(GeoCoordinate::new(0.0, 0.0), ZoomLevel::clamped(1))
    }

    #[test]
    fn scale_is_backing_over_css() {
        let s = SurfaceScale::new((1300, 900), (650.0, 450.0));
        assert_eq!(s, SurfaceScale { x: 2.0, y: 2.0 });
        assert_eq!(SurfaceScale::new((0, 10), (0.0, 10.0)), SurfaceScale { x: 1.0, y: 1.0 });
    }

    #[test]
    fn dragging_right_moves_the_center_west() {
        let mut cam = camera();
        let mut drag = PanDrag::begin(&cam, SurfaceScale::UNIT);
        // 512px world at z1: 128px is a quarter turn.
        drag.apply(&mut cam, 128.0, 0.0);
        assert!((cam.center.lon + 90.0).abs() < 1e-9);
        assert!(cam.center.lat.abs() < 1e-9);
    }

    #[test]
    fn deltas_accumulate_from_the_drag_start() {
        let mut cam = camera();
        let mut drag = PanDrag::begin(&cam, SurfaceScale::UNIT);
        drag.apply(&mut cam, 64.0, 0.0);
        drag.apply(&mut cam, 64.0, 0.0);
        assert!((cam.center.lon + 90.0).abs() < 1e-9);
    }

    #[test]
    fn backing_scale_amplifies_css_deltas() {
        let mut cam = camera();
        let mut drag = PanDrag::begin(&cam, SurfaceScale { x: 2.0, y: 2.0 });
        drag.apply(&mut cam, 64.0, 0.0);
        assert!((cam.center.lon + 90.0).abs() < 1e-9);
    }

    #[test]
    fn dragging_down_past_the_pole_clamps_latitude() {
        let mut cam = camera();
        let mut drag = PanDrag::begin(&cam, SurfaceScale::UNIT);
        drag.apply(&mut cam, 0.0, 10_000.0);
        assert_eq!(cam.center.lat, MAX_LATITUDE);
    }

    #[test]
    fn crossing_the_date_line_wraps() {
        let mut cam = PanCamera::new(GeoCoordinate::new(170.0, 0.0), ZoomLevel::clamped(1));
        let mut drag = PanDrag::begin(&cam, SurfaceScale::UNIT);
        // 512px per 360 degrees: -28.44px moves 20 degrees east.
        drag.apply(&mut cam, -512.0 * 20.0 / 360.0, 0.0);
        assert!((cam.center.lon + 170.0).abs() < 1e-9);
    }
}
