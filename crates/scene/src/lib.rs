//! Camera and interaction state for the globe.
//!
//! Everything here is synchronous and owned by the viewer loop; gestures are
//! derived from raw [`InputEvent`]s and applied to a [`CameraState`].

pub mod camera;
pub mod input;
pub mod pan;
pub mod pointer;

pub use camera::*;
pub use input::*;
pub use pan::*;
pub use pointer::*;
