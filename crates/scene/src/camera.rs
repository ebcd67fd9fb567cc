use std::f64::consts::{FRAC_PI_2, TAU};

use foundation::math::{GeoCoordinate, ZoomDirection, ZoomLevel, normalize_longitude};

/// Radians of rotation per pixel of orbit drag.
pub const ROTATE_SPEED: f64 = 0.005;

/// Pitch stays strictly inside the poles.
pub const PITCH_LIMIT: f64 = FRAC_PI_2 - 1e-3;

/// Orbit camera around the globe.
///
/// `yaw` turns the globe about its polar axis; positive yaw brings western
/// longitudes to the front. `pitch` tilts the north pole toward the viewer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitCamera {
    pub yaw: f64,
    pub pitch: f64,
    pub zoom: ZoomLevel,
}

impl OrbitCamera {
    pub fn new(yaw: f64, pitch: f64, zoom: ZoomLevel) -> Self {
        Self {
            yaw: yaw.rem_euclid(TAU),
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            zoom,
        }
    }

    /// Orients the camera so `center` faces the viewer.
    pub fn looking_at(center: GeoCoordinate, zoom: ZoomLevel) -> Self {
        let center = center.normalized();
        Self::new(-center.lon.to_radians(), center.lat.to_radians(), zoom)
    }

    /// Applies an orbit drag of `(dx, dy)` pixels.
    pub fn rotate(&mut self, dx: f64, dy: f64, speed: f64) {
        self.spin(dx * speed);
        self.pitch = (self.pitch + dy * speed).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Advances yaw alone, as idle auto-rotation does.
    pub fn spin(&mut self, delta_yaw: f64) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(TAU);
    }

    /// Geographic point at the center of the visible disc.
    pub fn view_center(&self) -> GeoCoordinate {
        GeoCoordinate::new(
            normalize_longitude(-self.yaw.to_degrees()),
            self.pitch.to_degrees(),
        )
    }
}

/// Flat map camera centered on a geographic point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PanCamera {
    pub center: GeoCoordinate,
    pub zoom: ZoomLevel,
}

impl PanCamera {
    pub fn new(center: GeoCoordinate, zoom: ZoomLevel) -> Self {
        Self {
            center: center.normalized(),
            zoom,
        }
    }
}

/// The viewer's camera. Exactly one mode is active for a viewer's lifetime.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CameraState {
    Orbit(OrbitCamera),
    Pan(PanCamera),
}

impl CameraState {
    pub fn zoom(&self) -> ZoomLevel {
        match self {
            CameraState::Orbit(orbit) => orbit.zoom,
            CameraState::Pan(pan) => pan.zoom,
        }
    }

    /// Steps the zoom one level. Returns `false` when already at the bound,
    /// in which case nothing changed and no refresh is needed.
    pub fn zoom_by(&mut self, direction: ZoomDirection) -> bool {
        let zoom = match self {
            CameraState::Orbit(orbit) => &mut orbit.zoom,
            CameraState::Pan(pan) => &mut pan.zoom,
        };
        let next = zoom.step(direction);
        if next == *zoom {
            return false;
        }
        *zoom = next;
        true
    }

    pub fn view_center(&self) -> GeoCoordinate {
        match self {
            CameraState::Orbit(orbit) => orbit.view_center(),
            CameraState::Pan(pan) => pan.center,
        }
    }

    pub fn is_orbit(&self) -> bool {
        matches!(self, CameraState::Orbit(_))
    }
}
