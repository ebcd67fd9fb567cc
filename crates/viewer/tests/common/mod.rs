#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use image::{ImageFormat, Rgba, RgbaImage};

use foundation::math::Mat4;
use render::{DisplaySurface, RenderError};
use streaming::{AtlasCache, CacheConfig, FetchError, FetchRequest, PreloadProgress, TileFetcher};
use viewer::{Viewer, ViewerConfig};


/// Every tile of zoom `z` has the same color, distinct per zoom.
pub fn zoom_color(z: u8) -> [u8; 4] {
    [z * 10, 255 - z * 10, 0, 255]
}

/// Region images are colored by the zoom they were fetched for.
pub fn region_color(z: u8) -> [u8; 4] {
    [9, 9, z * 10, 255]
}

fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    RgbaImage::from_pixel(width, height, Rgba(color))
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

#[derive(Default)]
pub struct MockFetcher {
    tile_delays: BTreeMap<u8, Duration>,
    region_delay: Duration,
    /// Per-call region delays, in call order; later calls use `region_delay`.
    region_delays: Vec<Duration>,
    pub tile_calls: AtomicUsize,
    pub region_calls: AtomicUsize,
    pub offline: AtomicBool,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tile_delay(mut self, z: u8, delay: Duration) -> Self {
        self.tile_delays.insert(z, delay);
        self
    }

    pub fn with_region_delay(mut self, delay: Duration) -> Self {
        self.region_delay = delay;
        self
    }

    pub fn with_region_delays(mut self, delays: Vec<Duration>) -> Self {
        self.region_delays = delays;
        self
    }

    pub fn tile_calls(&self) -> usize {
        self.tile_calls.load(Ordering::SeqCst)
    }

    pub fn region_calls(&self) -> usize {
        self.region_calls.load(Ordering::SeqCst)
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }
}

impl TileFetcher for MockFetcher {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<Vec<u8>, FetchError>> {
        async move {
            let delay = match request {
                FetchRequest::Tile(coord) => {
                    self.tile_calls.fetch_add(1, Ordering::SeqCst);
                    self.tile_delays.get(&coord.z.get()).copied()
                }
                FetchRequest::Region { .. } => {
                    let call = self.region_calls.fetch_add(1, Ordering::SeqCst);
                    Some(
                        self.region_delays
                            .get(call)
                            .copied()
                            .unwrap_or(self.region_delay),
                    )
                }
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.offline.load(Ordering::SeqCst) {
                return Err(FetchError::Status(503));
            }
            match request {
                FetchRequest::Tile(coord) => Ok(png(256, 256, zoom_color(coord.z.get()))),
                FetchRequest::Region { zoom, .. } => Ok(png(8, 8, region_color(zoom.get()))),
            }
        }
        .boxed()
    }
}

/// Records what the viewer shows instead of showing it.
#[derive(Debug)]
pub struct RecordingSurface {
    pub size: (u32, u32),
    pub textures: bool,
    /// Center pixel of every presented frame.
    pub presented: Vec<[u8; 4]>,
    pub loading: Vec<bool>,
    pub progress: Vec<PreloadProgress>,
    pub uploads: usize,
    pub textured_draws: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            size: (32, 32),
            textures: false,
            presented: Vec::new(),
            loading: Vec::new(),
            progress: Vec::new(),
            uploads: 0,
            textured_draws: 0,
        }
    }

    pub fn with_textures() -> Self {
        Self {
            textures: true,
            ..Self::new()
        }
    }
}

impl DisplaySurface for RecordingSurface {
    fn backing_size(&self) -> (u32, u32) {
        self.size
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn present_pixels(&mut self, pixels: &RgbaImage) {
        let (w, h) = pixels.dimensions();
        self.presented.push(pixels.get_pixel(w / 2, h / 2).0);
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading.push(loading);
    }

    fn show_progress(&mut self, progress: PreloadProgress) {
        self.progress.push(progress);
    }

    fn supports_textures(&self) -> bool {
        self.textures
    }

    fn upload_texture(&mut self, _texture: &RgbaImage) -> Result<(), RenderError> {
        if !self.textures {
            return Err(RenderError::Unsupported);
        }
        self.uploads += 1;
        Ok(())
    }

    fn draw_textured(&mut self, _transform: &Mat4) -> Result<(), RenderError> {
        if !self.textures {
            return Err(RenderError::Unsupported);
        }
        if self.uploads == 0 {
            return Err(RenderError::MissingPixels);
        }
        self.textured_draws += 1;
        Ok(())
    }
}

/// Defaults with idle rotation and preloading switched off.
pub fn quiet_config() -> ViewerConfig {
    ViewerConfig {
        auto_rotate_rad_per_s: 0.0,
        warm_zooms: Vec::new(),
        ..ViewerConfig::default()
    }
}

pub fn viewer(
    config: ViewerConfig,
    surface: RecordingSurface,
    fetcher: Arc<MockFetcher>,
) -> Viewer<RecordingSurface> {
    let cache = AtlasCache::new(fetcher, CacheConfig::default());
    Viewer::new(config, surface, cache).unwrap()
}
