use image::RgbaImage;

use foundation::math::{GeoCoordinate, TILE_SIZE, ZoomLevel, geo_to_world};

use crate::tile::TileCoord;

/// Highest zoom an atlas can be built for: `256 * 2^6 = 16384` pixels per
/// side, 1 GiB of RGBA.
pub const MAX_ATLAS_ZOOM: u8 = 6;

/// One zoom level's full tile grid stitched into a square RGBA image.
///
/// Atlases are immutable once built and shared as `Arc<Atlas>`, so a reader
/// never observes a partially stitched buffer.
#[derive(Debug, Clone)]
pub struct Atlas {
    zoom: ZoomLevel,
    image: RgbaImage,
    failed_tiles: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AtlasError {
    #[error("every tile of {zoom} failed to load")]
    Unavailable { zoom: ZoomLevel },
    #[error("an atlas for {zoom} is too large (limit is z{limit})", limit = MAX_ATLAS_ZOOM)]
    TooLarge { zoom: ZoomLevel },
}

impl Atlas {
    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Side length in pixels: `TILE_SIZE * 2^zoom`.
    pub fn size(&self) -> u32 {
        self.image.width()
    }

    /// Tiles left transparent because their fetch or decode failed.
    pub fn failed_tiles(&self) -> u32 {
        self.failed_tiles
    }

    /// Color under a geographic coordinate.
    ///
    /// Longitude wraps around the atlas seam; latitudes beyond the Mercator
    /// bound sample the edge rows.
    pub fn sample(&self, coord: GeoCoordinate) -> [u8; 4] {
        let world = geo_to_world(coord.normalized(), self.zoom);
        let size = i64::from(self.size());
        let x = (world.x.floor() as i64).rem_euclid(size);
        let y = (world.y.floor() as i64).clamp(0, size - 1);
        self.image.get_pixel(x as u32, y as u32).0
    }
}

/// Accumulates decoded tiles into a transparent atlas buffer.
#[derive(Debug)]
pub struct AtlasBuilder {
    zoom: ZoomLevel,
    image: RgbaImage,
    placed: u32,
    failed: u32,
}

impl AtlasBuilder {
    /// Allocates the transparent buffer; zooms above [`MAX_ATLAS_ZOOM`] are
    /// refused before anything is allocated.
    pub fn new(zoom: ZoomLevel) -> Result<Self, AtlasError> {
        if zoom.get() > MAX_ATLAS_ZOOM {
            return Err(AtlasError::TooLarge { zoom });
        }
        let side = TILE_SIZE * zoom.tiles_per_side();
        Ok(Self {
            zoom,
            image: RgbaImage::new(side, side),
            placed: 0,
            failed: 0,
        })
    }

    pub fn place(&mut self, coord: TileCoord, tile: &RgbaImage) {
        debug_assert_eq!(coord.z, self.zoom);
        let origin = coord.origin();
        image::imageops::replace(&mut self.image, tile, origin.x as i64, origin.y as i64);
        self.placed += 1;
    }

    /// Leaves the tile's region transparent.
    pub fn skip(&mut self, coord: TileCoord) {
        debug_assert_eq!(coord.z, self.zoom);
        self.failed += 1;
    }

    pub fn finish(self) -> Result<Atlas, AtlasError> {
        if self.placed == 0 {
            return Err(AtlasError::Unavailable { zoom: self.zoom });
        }
        Ok(Atlas {
            zoom: self.zoom,
            image: self.image,
            failed_tiles: self.failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AtlasBuilder, AtlasError, MAX_ATLAS_ZOOM};
    use crate::tile::TileCoord;
    use foundation::math::{GeoCoordinate, ZoomLevel};
    use image::{Rgba, RgbaImage};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn tile(color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(256, 256, Rgba(color))
    }

    #[test]
    fn stitches_tiles_into_their_grid_cells() {
        let z = ZoomLevel::clamped(1);
        let mut builder = AtlasBuilder::new(z).unwrap();
        for coord in TileCoord::grid(z) {
            let color = if coord.x == 0 { RED } else { BLUE };
            builder.place(coord, &tile(color));
        }
        let atlas = builder.finish().unwrap();

        assert_eq!(atlas.size(), 512);
        assert_eq!(atlas.failed_tiles(), 0);
        assert_eq!(atlas.sample(GeoCoordinate::new(-90.0, 45.0)), RED);
        assert_eq!(atlas.sample(GeoCoordinate::new(90.0, -45.0)), BLUE);
    }

    #[test]
    fn failed_tiles_stay_transparent() {
        let z = ZoomLevel::clamped(1);
        let mut builder = AtlasBuilder::new(z).unwrap();
        for coord in TileCoord::grid(z) {
            if coord.x == 1 && coord.y == 1 {
                builder.skip(coord);
            } else {
                builder.place(coord, &tile(RED));
            }
        }
        let atlas = builder.finish().unwrap();

        assert_eq!(atlas.failed_tiles(), 1);
        assert_eq!(atlas.sample(GeoCoordinate::new(90.0, -45.0)), [0, 0, 0, 0]);
        assert_eq!(atlas.sample(GeoCoordinate::new(-90.0, -45.0)), RED);
    }

    #[test]
    fn nothing_placed_is_unavailable() {
        let z = ZoomLevel::clamped(1);
        let mut builder = AtlasBuilder::new(z).unwrap();
        TileCoord::grid(z).for_each(|coord| builder.skip(coord));
        assert_eq!(builder.finish().unwrap_err(), AtlasError::Unavailable { zoom: z });
    }

    #[test]
    fn oversized_atlas_is_refused_before_allocating() {
        let z = ZoomLevel::MAX;
        assert_eq!(
            AtlasBuilder::new(z).unwrap_err(),
            AtlasError::TooLarge { zoom: z }
        );
        assert!(AtlasBuilder::new(ZoomLevel::clamped(i32::from(MAX_ATLAS_ZOOM))).is_ok());
    }

    #[test]
    fn sampling_wraps_longitude_and_clamps_latitude() {
        let z = ZoomLevel::clamped(1);
        let mut builder = AtlasBuilder::new(z).unwrap();
        for coord in TileCoord::grid(z) {
            let color = if coord.x == 0 { RED } else { BLUE };
            builder.place(coord, &tile(color));
        }
        let atlas = builder.finish().unwrap();

        assert_eq!(
            atlas.sample(GeoCoordinate::new(270.0, 0.0)),
            atlas.sample(GeoCoordinate::new(-90.0, 0.0))
        );
        assert_eq!(atlas.sample(GeoCoordinate::new(-90.0, 90.0)), RED);
        assert_eq!(atlas.sample(GeoCoordinate::new(179.999, -90.0)), BLUE);
    }
}
