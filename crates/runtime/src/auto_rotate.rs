use crate::frame::Frame;

/// Idle spin of the globe, proportional to measured frame time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AutoRotation {
    pub rate_rad_per_s: f64,
}

impl AutoRotation {
    pub fn new(rate_rad_per_s: f64) -> Self {
        Self { rate_rad_per_s }
    }

    pub fn is_enabled(&self) -> bool {
        self.rate_rad_per_s != 0.0
    }

    /// Yaw advance for `frame`, in radians.
    pub fn delta(&self, frame: &Frame) -> f64 {
        self.rate_rad_per_s * frame.dt_s
    }
}
