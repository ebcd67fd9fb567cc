use foundation::math::ZoomLevel;
use tracing::{info, warn};

use crate::cache::AtlasCache;

/// How far a warm-up pass has come, for "N of M cached" indicators.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PreloadProgress {
    pub cached: usize,
    pub failed: usize,
    pub total: usize,
}

impl PreloadProgress {
    pub fn is_complete(&self) -> bool {
        self.cached + self.failed >= self.total
    }
}

impl std::fmt::Display for PreloadProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {} cached", self.cached, self.total)?;
        if self.failed > 0 {
            write!(f, " ({} failed)", self.failed)?;
        }
        Ok(())
    }
}

/// Builds the atlases for `zooms` one after another.
///
/// `on_progress` is called once before the first build and after each zoom
/// settles. A failed zoom is logged and counted; the remaining zooms still run.
pub async fn preload(
    cache: &AtlasCache,
    zooms: &[ZoomLevel],
    mut on_progress: impl FnMut(PreloadProgress),
) -> PreloadProgress {
    let mut progress = PreloadProgress {
        total: zooms.len(),
        ..PreloadProgress::default()
    };
    on_progress(progress);

    for &zoom in zooms {
        match cache.get_atlas(zoom).await {
            Ok(_) => progress.cached += 1,
            Err(err) => {
                warn!("preload of {zoom} failed: {err}");
                progress.failed += 1;
            }
        }
        info!("preload: {progress}");
        on_progress(progress);
    }

    progress
}
