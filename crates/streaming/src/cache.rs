use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use futures_util::stream::{self, StreamExt};
use image::RgbaImage;
use parking_lot::Mutex;
use tracing::{debug, warn};

use foundation::math::{TILE_SIZE, ZoomLevel};

use crate::atlas::{Atlas, AtlasBuilder, AtlasError};
use crate::decode::{DecodeError, decode_tile};
use crate::fetch::{FetchError, FetchRequest, TileFetcher};
use crate::request::{AtlasBuildRequest, Generation};
use crate::residency::AtlasState;
use crate::tile::TileCoord;

pub type AtlasResult = Result<Arc<Atlas>, AtlasError>;

type SharedBuild = Shared<BoxFuture<'static, AtlasResult>>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Upper bound on tile fetches a single build keeps in flight.
    pub fetch_concurrency: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: 16,
        }
    }
}

/// Why a single tile could not be placed into its atlas.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TileError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Result of resolving an [`AtlasBuildRequest`].
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    Ready(Arc<Atlas>),
    /// The desired zoom changed while the build was running. The atlas (if
    /// any) was still cached, but must not be displayed.
    Superseded {
        request: AtlasBuildRequest,
        current: Generation,
    },
    Failed(AtlasError),
}

struct InFlight {
    id: u64,
    build: SharedBuild,
}

#[derive(Default)]
struct CacheState {
    resident: BTreeMap<ZoomLevel, Arc<Atlas>>,
    in_flight: BTreeMap<ZoomLevel, InFlight>,
    next_build: u64,
    generation: Generation,
    desired: Option<ZoomLevel>,
}

struct Inner {
    fetcher: Arc<dyn TileFetcher>,
    config: CacheConfig,
    state: Mutex<CacheState>,
}

/// Per-zoom atlas cache with build de-duplication and generation tokens.
///
/// Cloning is cheap and every clone shares the same entries. The internal
/// lock is only taken for bookkeeping and never held across an `.await`.
///
/// Notes:
/// - Entries are keyed in a `BTreeMap` for stable traversal order.
/// - Concurrent callers for one zoom attach to a single shared build future.
/// - Resident atlases are never evicted; the zoom range is small and bounded.
#[derive(Clone)]
pub struct AtlasCache {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for AtlasCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("AtlasCache")
            .field("config", &self.inner.config)
            .field("resident", &state.resident.keys().collect::<Vec<_>>())
            .field("in_flight", &state.in_flight.keys().collect::<Vec<_>>())
            .field("generation", &state.generation)
            .finish()
    }
}

impl AtlasCache {
    pub fn new(fetcher: Arc<dyn TileFetcher>, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                config,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    pub fn fetcher(&self) -> &Arc<dyn TileFetcher> {
        &self.inner.fetcher
    }

    /// Resident atlas for `zoom`, without starting a build.
    pub fn get(&self, zoom: ZoomLevel) -> Option<Arc<Atlas>> {
        self.inner.state.lock().resident.get(&zoom).cloned()
    }

    pub fn state(&self, zoom: ZoomLevel) -> AtlasState {
        let state = self.inner.state.lock();
        if state.resident.contains_key(&zoom) {
            AtlasState::Resident
        } else if state.in_flight.contains_key(&zoom) {
            AtlasState::Building
        } else {
            AtlasState::Absent
        }
    }

    pub fn resident_zooms(&self) -> Vec<ZoomLevel> {
        self.inner.state.lock().resident.keys().copied().collect()
    }

    /// Returns the atlas for `zoom`, building it if needed.
    ///
    /// A resident atlas is returned without network activity. If a build for
    /// `zoom` is already running, the caller awaits that same build.
    pub async fn get_atlas(&self, zoom: ZoomLevel) -> AtlasResult {
        let (id, build) = {
            let mut state = self.inner.state.lock();
            if let Some(atlas) = state.resident.get(&zoom) {
                return Ok(atlas.clone());
            }
            if let Some(in_flight) = state.in_flight.get(&zoom) {
                debug!("attaching to in-flight atlas build for {zoom}");
                (in_flight.id, in_flight.build.clone())
            } else {
                let id = state.next_build;
                state.next_build += 1;
                let build = build_atlas(
                    self.inner.fetcher.clone(),
                    zoom,
                    self.inner.config.fetch_concurrency,
                )
                .boxed()
                .shared();
                state.in_flight.insert(
                    zoom,
                    InFlight {
                        id,
                        build: build.clone(),
                    },
                );
                (id, build)
            }
        };

        let result = build.await;
        self.settle(zoom, id, &result);
        result
    }

    fn settle(&self, zoom: ZoomLevel, id: u64, result: &AtlasResult) {
        let mut state = self.inner.state.lock();
        // A later build for the same zoom may already have replaced this one.
        if state.in_flight.get(&zoom).is_some_and(|f| f.id == id) {
            state.in_flight.remove(&zoom);
        }
        if let Ok(atlas) = result {
            state.resident.entry(zoom).or_insert_with(|| atlas.clone());
        }
    }

    /// Records `zoom` as the desired zoom and returns a request tagged with
    /// the current generation. The generation advances whenever the desired
    /// zoom changes, which supersedes every earlier request.
    pub fn request(&self, zoom: ZoomLevel) -> AtlasBuildRequest {
        let mut state = self.inner.state.lock();
        if state.desired != Some(zoom) {
            state.generation = state.generation.next();
            state.desired = Some(zoom);
        }
        AtlasBuildRequest {
            zoom,
            generation: state.generation,
        }
    }

    pub fn current_generation(&self) -> Generation {
        self.inner.state.lock().generation
    }

    pub fn is_current(&self, request: &AtlasBuildRequest) -> bool {
        self.current_generation() == request.generation
    }

    /// Awaits the atlas for `request` and re-validates the generation after
    /// the await, since the desired zoom may have moved on meanwhile.
    pub async fn resolve(&self, request: AtlasBuildRequest) -> BuildOutcome {
        let result = self.get_atlas(request.zoom).await;
        let current = self.current_generation();
        if current != request.generation {
            debug!(
                "discarding superseded atlas for {} (generation {} < {})",
                request.zoom, request.generation.0, current.0
            );
            return BuildOutcome::Superseded { request, current };
        }
        match result {
            Ok(atlas) => BuildOutcome::Ready(atlas),
            Err(err) => BuildOutcome::Failed(err),
        }
    }
}

async fn fetch_tile(fetcher: &dyn TileFetcher, coord: TileCoord) -> Result<RgbaImage, TileError> {
    let bytes = fetcher.fetch(FetchRequest::Tile(coord)).await?;
    Ok(decode_tile(&bytes, TILE_SIZE)?)
}

async fn build_atlas(
    fetcher: Arc<dyn TileFetcher>,
    zoom: ZoomLevel,
    concurrency: usize,
) -> AtlasResult {
    debug!("building atlas for {zoom}");
    let mut builder = AtlasBuilder::new(zoom)?;
    let mut tiles = stream::iter(TileCoord::grid(zoom))
        .map(|coord| {
            let fetcher = fetcher.clone();
            async move { (coord, fetch_tile(fetcher.as_ref(), coord).await) }
        })
        .buffer_unordered(concurrency.max(1));

    while let Some((coord, tile)) = tiles.next().await {
        match tile {
            Ok(tile) => builder.place(coord, &tile),
            Err(err) => {
                warn!("tile {coord} unavailable, leaving it blank: {err}");
                builder.skip(coord);
            }
        }
    }

    let atlas = builder.finish()?;
    debug!(
        "atlas for {zoom} ready ({}px, {} blank tiles)",
        atlas.size(),
        atlas.failed_tiles()
    );
    Ok(Arc::new(atlas))
}
