use image::RgbaImage;
use serde::{Deserialize, Serialize};

use foundation::math::Mat4;
use streaming::PreloadProgress;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("display surface does not support textured drawing")]
    Unsupported,
    #[error("no texture has been uploaded")]
    MissingPixels,
}

/// Which renderer a deployment uses. Fixed for the viewer's lifetime.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Canvas,
    Texture,
}

/// The host's display: a pixel sink plus loading and progress indicators.
///
/// Texture support is optional; hosts without it keep the defaults, which
/// report [`RenderError::Unsupported`].
pub trait DisplaySurface {
    /// Size of the drawing buffer in device pixels.
    fn backing_size(&self) -> (u32, u32);

    /// Size the surface occupies on screen, in CSS pixels.
    fn css_size(&self) -> (f64, f64) {
        let (w, h) = self.backing_size();
        (f64::from(w), f64::from(h))
    }

    fn resize(&mut self, width: u32, height: u32);

    fn present_pixels(&mut self, pixels: &RgbaImage);

    fn set_loading(&mut self, loading: bool);

    fn show_progress(&mut self, progress: PreloadProgress);

    fn supports_textures(&self) -> bool {
        false
    }

    fn upload_texture(&mut self, _texture: &RgbaImage) -> Result<(), RenderError> {
        Err(RenderError::Unsupported)
    }

    fn draw_textured(&mut self, _transform: &Mat4) -> Result<(), RenderError> {
        Err(RenderError::Unsupported)
    }
}
