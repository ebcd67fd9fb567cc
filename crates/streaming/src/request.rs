use foundation::math::ZoomLevel;

/// Monotonic token identifying which desired zoom is current.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A cancellable atlas request.
///
/// This is intentionally a small, copyable handle: the scheduler captures it
/// when the refresh fires and checks it again once the build settles. Only a
/// request whose generation is still current may reach the display.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AtlasBuildRequest {
    pub zoom: ZoomLevel,
    pub generation: Generation,
}
