use std::path::Path;

use image::RgbaImage;
use tracing::{debug, info};

use render::DisplaySurface;
use streaming::PreloadProgress;

/// Headless display that keeps the last presented frame in memory.
#[derive(Debug)]
pub struct PngSurface {
    size: (u32, u32),
    last: Option<RgbaImage>,
}

impl PngSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width.max(1), height.max(1)),
            last: None,
        }
    }

    /// Writes the last frame; returns `Ok(false)` when nothing was drawn.
    pub fn save(&self, path: &Path) -> Result<bool, image::ImageError> {
        match &self.last {
            Some(frame) => {
                frame.save(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl DisplaySurface for PngSurface {
    fn backing_size(&self) -> (u32, u32) {
        self.size
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width.max(1), height.max(1));
    }

    fn present_pixels(&mut self, pixels: &RgbaImage) {
        match &mut self.last {
            Some(last) if last.dimensions() == pixels.dimensions() => {
                last.copy_from_slice(pixels);
            }
            _ => self.last = Some(pixels.clone()),
        }
    }

    fn set_loading(&mut self, loading: bool) {
        debug!("loading: {loading}");
    }

    fn show_progress(&mut self, progress: PreloadProgress) {
        info!("{progress}");
    }
}
