use std::sync::Arc;

use tracing::debug;

use foundation::math::Mat4;
use scene::OrbitCamera;
use streaming::Atlas;

use crate::surface::{DisplaySurface, RenderError};

/// Model transform for the textured globe: pitch after yaw, then squashed
/// along the long axis so the sphere stays round on non-square surfaces.
pub fn globe_transform(camera: &OrbitCamera, (width, height): (u32, u32)) -> Mat4 {
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    let aspect = if w > h {
        Mat4::scale(h / w, 1.0, 1.0)
    } else {
        Mat4::scale(1.0, w / h, 1.0)
    };
    aspect * Mat4::rotation_x(camera.pitch as f32) * Mat4::rotation_y(camera.yaw as f32)
}

/// GPU backend: keeps the last uploaded atlas and re-uploads only when a
/// different atlas is drawn.
#[derive(Debug, Default)]
pub struct TextureRenderer {
    uploaded: Option<Arc<Atlas>>,
    uploads: u64,
}

impl TextureRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    pub fn draw(
        &mut self,
        surface: &mut dyn DisplaySurface,
        atlas: &Arc<Atlas>,
        camera: &OrbitCamera,
    ) -> Result<(), RenderError> {
        let current = self
            .uploaded
            .as_ref()
            .is_some_and(|uploaded| Arc::ptr_eq(uploaded, atlas));
        if !current {
            debug!("uploading {} atlas texture", atlas.zoom());
            surface.upload_texture(atlas.image())?;
            self.uploaded = Some(atlas.clone());
            self.uploads += 1;
        }
        surface.draw_textured(&globe_transform(camera, surface.backing_size()))
    }
}
