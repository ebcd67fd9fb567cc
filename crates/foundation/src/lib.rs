pub mod math;
pub mod time;

// Foundation crate: projection math and small, well-tested primitives only.
pub use math::*;
pub use time::*;
