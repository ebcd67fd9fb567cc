//! Scheduling primitives for the viewer loop: a debounced refresh deadline,
//! coalesced frame requests, a measured frame clock and idle auto-rotation.

pub mod auto_rotate;
pub mod debounce;
pub mod frame;
pub mod frame_queue;
pub mod metrics;

pub use auto_rotate::*;
pub use debounce::*;
pub use frame::*;
pub use frame_queue::*;
pub use metrics::*;
