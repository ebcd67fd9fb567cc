use std::time::Duration;

use serde::{Deserialize, Serialize};

use foundation::math::{GeoCoordinate, ZoomLevel};
use render::Backend;
use scene::{CameraState, OrbitCamera, PanCamera, ROTATE_SPEED};
use streaming::{CacheConfig, MAX_ATLAS_ZOOM};

use crate::error::ViewerError;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    /// Spin a sphere textured with a whole-world atlas.
    #[default]
    Orbit,
    /// Drag a flat region image fetched around the current center.
    Pan,
}

/// Viewer settings. Every field has a default, so a partial JSON document
/// (or none at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub mode: CameraMode,
    pub backend: Backend,
    pub refresh_debounce_ms: u64,
    pub frame_interval_ms: u64,
    /// Radians per pixel of orbit drag.
    pub rotate_speed: f64,
    /// Idle spin rate in radians per second; `0` disables it.
    pub auto_rotate_rad_per_s: f64,
    pub max_frame_dt_ms: u64,
    pub initial_lon: f64,
    pub initial_lat: f64,
    pub initial_zoom: u8,
    /// Atlas zooms built in the background at startup (orbit mode).
    pub warm_zooms: Vec<u8>,
    /// Highest zoom an atlas is built for; orbit zoom beyond it reuses this atlas.
    pub max_atlas_zoom: u8,
    pub fetch_concurrency: usize,
    pub region_width: u32,
    pub region_height: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            mode: CameraMode::Orbit,
            backend: Backend::Canvas,
            refresh_debounce_ms: 120,
            frame_interval_ms: 16,
            rotate_speed: ROTATE_SPEED,
            auto_rotate_rad_per_s: 0.1,
            max_frame_dt_ms: 100,
            initial_lon: 0.0,
            initial_lat: 0.0,
            initial_zoom: 2,
            warm_zooms: vec![1, 2, 3],
            max_atlas_zoom: 4,
            fetch_concurrency: 16,
            region_width: 650,
            region_height: 450,
        }
    }
}

impl ViewerConfig {
    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.frame_interval_ms == 0 {
            return Err(ViewerError::Config("frame_interval_ms must be positive".into()));
        }
        if self.region_width == 0 || self.region_height == 0 {
            return Err(ViewerError::Config("region size must be non-zero".into()));
        }
        if self.fetch_concurrency == 0 {
            return Err(ViewerError::Config("fetch_concurrency must be positive".into()));
        }
        if self.max_atlas_zoom > MAX_ATLAS_ZOOM {
            return Err(ViewerError::Config(format!(
                "max_atlas_zoom must be at most {MAX_ATLAS_ZOOM}, got {}",
                self.max_atlas_zoom
            )));
        }
        if !self.rotate_speed.is_finite() || !self.auto_rotate_rad_per_s.is_finite() {
            return Err(ViewerError::Config("rotation rates must be finite".into()));
        }
        Ok(())
    }

    pub fn refresh_debounce(&self) -> Duration {
        Duration::from_millis(self.refresh_debounce_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn max_frame_dt(&self) -> Duration {
        Duration::from_millis(self.max_frame_dt_ms)
    }

    pub fn initial_camera(&self) -> CameraState {
        let center = GeoCoordinate::new(self.initial_lon, self.initial_lat);
        let zoom = ZoomLevel::clamped(i32::from(self.initial_zoom));
        match self.mode {
            CameraMode::Orbit => CameraState::Orbit(OrbitCamera::looking_at(center, zoom)),
            CameraMode::Pan => CameraState::Pan(PanCamera::new(center, zoom)),
        }
    }

    pub fn max_atlas_zoom(&self) -> ZoomLevel {
        ZoomLevel::clamped(i32::from(self.max_atlas_zoom))
    }

    /// The atlas zoom used to texture an orbit camera at `zoom`.
    pub fn atlas_zoom(&self, zoom: ZoomLevel) -> ZoomLevel {
        zoom.min(self.max_atlas_zoom())
    }

    /// Warm zooms clamped to the atlas range, in order, without duplicates.
    pub fn warm_zoom_levels(&self) -> Vec<ZoomLevel> {
        let mut zooms: Vec<ZoomLevel> = Vec::with_capacity(self.warm_zooms.len());
        for &z in &self.warm_zooms {
            let zoom = self.atlas_zoom(ZoomLevel::clamped(i32::from(z)));
            if !zooms.contains(&zoom) {
                zooms.push(zoom);
            }
        }
        zooms
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            fetch_concurrency: self.fetch_concurrency,
        }
    }
}
