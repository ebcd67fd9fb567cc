use foundation::math::{TILE_SIZE, WorldPoint, ZoomLevel};

/// Tile coordinate in the ZXY scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileCoord {
    pub z: ZoomLevel,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: ZoomLevel, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Every tile of the `2^z × 2^z` grid, row by row.
    pub fn grid(z: ZoomLevel) -> impl Iterator<Item = TileCoord> {
        let n = z.tiles_per_side();
        (0..n).flat_map(move |y| (0..n).map(move |x| TileCoord::new(z, x, y)))
    }

    /// Top-left corner of this tile in world pixel space.
    pub fn origin(&self) -> WorldPoint {
        WorldPoint::new(
            f64::from(self.x * TILE_SIZE),
            f64::from(self.y * TILE_SIZE),
        )
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.z.get(), self.x, self.y)
    }
}
