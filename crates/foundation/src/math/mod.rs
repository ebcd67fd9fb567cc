pub mod matrix;
pub mod mercator;
pub mod orthographic;
pub mod zoom;

pub use matrix::*;
pub use mercator::*;
pub use orthographic::*;
pub use zoom::*;
