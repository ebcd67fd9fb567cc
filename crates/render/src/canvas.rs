use image::{Rgba, RgbaImage};

use foundation::math::{GeoCoordinate, sphere_screen_to_geo};
use streaming::Atlas;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Radius of the globe disc inscribed in a `width × height` surface.
pub fn globe_radius(width: u32, height: u32) -> f64 {
    f64::from(width.min(height)) / 2.0
}

/// CPU backend: inverse-projects every pixel of the surface and samples the
/// atlas. Pixels off the disc are transparent.
#[derive(Debug, Default)]
pub struct CanvasRenderer {
    frame: RgbaImage,
}

impl CanvasRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rasterizes the globe facing `center` into the reusable frame buffer.
    pub fn render(
        &mut self,
        atlas: &Atlas,
        center: GeoCoordinate,
        (width, height): (u32, u32),
    ) -> &RgbaImage {
        if self.frame.dimensions() != (width, height) {
            self.frame = RgbaImage::new(width, height);
        }

        let radius = globe_radius(width, height);
        let half_w = f64::from(width) / 2.0;
        let half_h = f64::from(height) / 2.0;
        for (x, y, px) in self.frame.enumerate_pixels_mut() {
            let sx = f64::from(x) + 0.5 - half_w;
            let sy = f64::from(y) + 0.5 - half_h;
            *px = match sphere_screen_to_geo(sx, sy, radius, center) {
                Some(geo) => Rgba(atlas.sample(geo)),
                None => BACKGROUND,
            };
        }

        &self.frame
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }
}
