//! Drawing the globe onto a host-provided display surface.
//!
//! Two backends: [`CanvasRenderer`] rasterizes the sphere on the CPU and
//! presents a pixel buffer; [`TextureRenderer`] uploads the atlas once and
//! issues a single textured draw per frame.

pub mod canvas;
pub mod surface;
pub mod texture;

pub use canvas::*;
pub use surface::*;
pub use texture::*;
