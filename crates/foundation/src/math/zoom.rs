use super::TILE_SIZE;

/// Smallest zoom level the viewer will request.
pub const MIN_ZOOM: u8 = 1;
/// Largest zoom level the viewer will request.
pub const MAX_ZOOM: u8 = 17;

/// A zoom level in `[MIN_ZOOM, MAX_ZOOM]`.
///
/// All spatial computations are parameterized by a zoom level, so the range is
/// enforced at construction rather than checked at every use.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoomLevel(u8);

/// Direction of a single zoom step, as produced by wheel or button input.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    pub fn delta(self) -> i32 {
        match self {
            ZoomDirection::In => 1,
            ZoomDirection::Out => -1,
        }
    }
}

impl ZoomLevel {
    pub const MIN: Self = Self(MIN_ZOOM);
    pub const MAX: Self = Self(MAX_ZOOM);

    /// Returns `None` when `z` lies outside `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn new(z: u8) -> Option<Self> {
        (MIN_ZOOM..=MAX_ZOOM).contains(&z).then_some(Self(z))
    }

    pub fn clamped(z: i32) -> Self {
        Self(z.clamp(i32::from(MIN_ZOOM), i32::from(MAX_ZOOM)) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Number of tiles along one side of the grid at this zoom.
    pub fn tiles_per_side(self) -> u32 {
        1u32 << self.0
    }

    /// World pixel extent per axis: `TILE_SIZE * 2^zoom`.
    pub fn world_size(self) -> f64 {
        f64::from(TILE_SIZE) * f64::from(self.tiles_per_side())
    }

    /// The zoom level one step in `direction`, clamped to the valid range.
    pub fn step(self, direction: ZoomDirection) -> Self {
        Self::clamped(i32::from(self.0) + direction.delta())
    }
}

impl std::fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "z{}", self.0)
    }
}
