//! Tile fetching and the per-zoom atlas cache.
//!
//! A zoom level's full tile grid is fetched through an abstract [`TileFetcher`],
//! stitched into one immutable [`Atlas`] and memoized by [`AtlasCache`].

pub mod atlas;
pub mod cache;
pub mod decode;
pub mod fetch;
pub mod preload;
pub mod request;
pub mod residency;
pub mod tile;

pub use atlas::*;
pub use cache::*;
pub use decode::*;
pub use fetch::*;
pub use preload::*;
pub use request::*;
pub use residency::*;
pub use tile::*;
