//! The abstract fetch capability the cache and the viewer depend on.
//!
//! Nothing here knows about URL schemes or providers; hosts supply an
//! implementation (HTTP, disk, in-memory) of [`TileFetcher`].

use futures_util::future::BoxFuture;

use foundation::math::{GeoCoordinate, ZoomLevel};

use crate::tile::TileCoord;

/// What to fetch: one tile of the grid, or a rendered region around a center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FetchRequest {
    Tile(TileCoord),
    Region {
        center: GeoCoordinate,
        zoom: ZoomLevel,
        width: u32,
        height: u32,
    },
}

impl std::fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchRequest::Tile(coord) => write!(f, "tile {coord}"),
            FetchRequest::Region {
                center,
                zoom,
                width,
                height,
            } => write!(
                f,
                "region {:.6},{:.6} {zoom} {width}x{height}",
                center.lon, center.lat
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("provider returned status {0}")]
    Status(u16),
    #[error("no source configured for {0}")]
    Unsupported(String),
}

/// Source of raw image bytes for tiles and regions.
///
/// Methods return boxed futures so the trait stays dyn-compatible and can be
/// shared as `Arc<dyn TileFetcher>` by concurrent atlas builds.
pub trait TileFetcher: Send + Sync {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<Vec<u8>, FetchError>>;
}
