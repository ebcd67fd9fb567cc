//! The globe viewer: camera, atlas cache and scheduling primitives wired
//! into one cooperative event loop over a host display surface.

pub mod config;
pub mod error;
pub mod event_loop;
pub mod viewer;

pub use config::*;
pub use error::*;
pub use viewer::*;
