use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use image::RgbaImage;
use tokio::time::Instant;
use tracing::{debug, warn};

use foundation::math::{ZoomDirection, ZoomLevel};
use render::{Backend, CanvasRenderer, DisplaySurface, RenderError, TextureRenderer};
use runtime::{AutoRotation, Counter, Debouncer, FrameClock, FrameQueue, Metrics, Sample};
use scene::{
    CameraState, Gesture, InputEvent, PanDrag, PointerTracker, SurfaceScale, wheel_direction,
};
use streaming::{
    Atlas, AtlasBuildRequest, AtlasCache, BuildOutcome, FetchRequest, Generation, decode_image,
};

use crate::config::ViewerConfig;
use crate::error::ViewerError;

/// What a refresh fetched.
#[derive(Debug)]
pub enum RefreshOutcome {
    Atlas(BuildOutcome),
    Region {
        generation: Generation,
        result: Result<RgbaImage, ViewerError>,
    },
}

#[derive(Debug)]
pub struct CompletedRefresh {
    pub issued_at: Instant,
    pub outcome: RefreshOutcome,
}

pub type RefreshTask = BoxFuture<'static, CompletedRefresh>;

/// Viewer state, mutated only by the event loop.
///
/// Input and timer callbacks land here as plain method calls; the network
/// side is returned as [`RefreshTask`] futures that the loop polls and feeds
/// back through [`Viewer::finish_refresh`].
pub struct Viewer<S> {
    pub(crate) config: ViewerConfig,
    surface: S,
    cache: AtlasCache,
    camera: CameraState,
    pointer: PointerTracker,
    pan_drag: Option<PanDrag>,
    pub(crate) refresh: Debouncer,
    pub(crate) frames: FrameQueue,
    clock: FrameClock,
    auto_rotation: AutoRotation,
    canvas: CanvasRenderer,
    texture: TextureRenderer,
    atlas: Option<Arc<Atlas>>,
    region: Option<RgbaImage>,
    region_generation: Generation,
    loading: bool,
    metrics: Metrics,
}

impl<S: std::fmt::Debug> std::fmt::Debug for Viewer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("surface", &self.surface)
            .field("camera", &self.camera)
            .field("atlas", &self.atlas.as_ref().map(|a| a.zoom()))
            .field("loading", &self.loading)
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl<S: DisplaySurface> Viewer<S> {
    /// Fails when the configuration is invalid or the texture backend is
    /// selected for a surface that cannot draw textures.
    pub fn new(config: ViewerConfig, surface: S, cache: AtlasCache) -> Result<Self, ViewerError> {
        config.validate()?;
        if config.backend == Backend::Texture && !surface.supports_textures() {
            return Err(RenderError::Unsupported.into());
        }

        Ok(Self {
            camera: config.initial_camera(),
            pointer: PointerTracker::new(),
            pan_drag: None,
            refresh: Debouncer::new(config.refresh_debounce()),
            frames: FrameQueue::new(),
            clock: FrameClock::new(config.max_frame_dt()),
            auto_rotation: AutoRotation::new(config.auto_rotate_rad_per_s),
            canvas: CanvasRenderer::new(),
            texture: TextureRenderer::new(),
            atlas: None,
            region: None,
            region_generation: Generation::default(),
            loading: false,
            metrics: Metrics::new(),
            config,
            surface,
            cache,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn cache(&self) -> &AtlasCache {
        &self.cache
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The atlas currently on display (orbit mode).
    pub fn displayed_atlas(&self) -> Option<&Arc<Atlas>> {
        self.atlas.as_ref()
    }

    /// The region image currently on display (pan mode).
    pub fn displayed_region(&self) -> Option<&RgbaImage> {
        self.region.as_ref()
    }

    /// Zoom an atlas refresh would build for the current camera.
    pub fn atlas_zoom(&self) -> ZoomLevel {
        self.config.atlas_zoom(self.camera.zoom())
    }

    /// Whether idle rotation should advance on the next display tick.
    pub fn auto_rotating(&self) -> bool {
        self.camera.is_orbit() && self.auto_rotation.is_enabled() && !self.pointer.is_dragging()
    }

    pub fn handle_input(&mut self, event: InputEvent, now: Instant) {
        match event {
            InputEvent::Wheel { delta_y } => {
                if let Some(direction) = wheel_direction(delta_y) {
                    self.zoom(direction, now);
                }
            }
            InputEvent::Zoom(direction) => self.zoom(direction, now),
            InputEvent::Resize { width, height } => {
                self.surface.resize(width, height);
                self.request_frame();
            }
            InputEvent::PointerDown { .. }
            | InputEvent::PointerMove { .. }
            | InputEvent::PointerUp { .. }
            | InputEvent::PointerCancel { .. } => {
                if let Some(gesture) = self.pointer.handle(&event) {
                    self.handle_gesture(gesture, now);
                }
            }
        }
    }

    fn handle_gesture(&mut self, gesture: Gesture, now: Instant) {
        match (gesture, &mut self.camera) {
            (Gesture::DragStart { .. }, CameraState::Pan(pan)) => {
                let scale = SurfaceScale::new(self.surface.backing_size(), self.surface.css_size());
                self.pan_drag = Some(PanDrag::begin(pan, scale));
            }
            (Gesture::DragStart { .. }, CameraState::Orbit(_)) => {}
            (Gesture::Drag { dx, dy }, CameraState::Orbit(orbit)) => {
                orbit.rotate(dx, dy, self.config.rotate_speed);
                self.request_frame();
            }
            (Gesture::Drag { dx, dy }, CameraState::Pan(pan)) => {
                if let Some(drag) = self.pan_drag.as_mut() {
                    drag.apply(pan, dx, dy);
                    self.supersede_region();
                    self.refresh.arm(now);
                }
            }
            (Gesture::DragEnd, _) => {
                self.pan_drag = None;
                self.refresh.arm(now);
            }
        }
    }

    fn zoom(&mut self, direction: ZoomDirection, now: Instant) {
        if !self.camera.zoom_by(direction) {
            debug!("zoom already at {}, ignoring", self.camera.zoom());
            return;
        }
        debug!("zoom changed to {}", self.camera.zoom());
        match self.camera {
            CameraState::Orbit(_) => {
                // Moves the desired zoom now, so a build that lands before the
                // debounce fires is already stale.
                let request = self.cache.request(self.atlas_zoom());
                debug!(
                    "desired atlas {} (generation {})",
                    request.zoom, request.generation.0
                );
            }
            CameraState::Pan(_) => self.supersede_region(),
        }
        self.refresh.arm(now);
    }

    /// Marks every region fetch issued so far as stale.
    fn supersede_region(&mut self) {
        self.region_generation = self.region_generation.next();
    }

    /// Arms the startup refresh so it fires on the first loop turn.
    pub fn schedule_initial_refresh(&mut self, now: Instant) {
        self.refresh.arm_now(now);
    }

    /// Issues exactly one fetch for the current camera state.
    pub fn start_refresh(&mut self, now: Instant) -> RefreshTask {
        self.metrics.inc(Counter::RefreshesIssued);
        self.set_loading(true);

        match self.camera {
            CameraState::Orbit(_) => {
                let request = self.cache.request(self.atlas_zoom());
                debug!(
                    "refreshing atlas {} (generation {})",
                    request.zoom, request.generation.0
                );
                let cache = self.cache.clone();
                async move {
                    CompletedRefresh {
                        issued_at: now,
                        outcome: RefreshOutcome::Atlas(cache.resolve(request).await),
                    }
                }
                .boxed()
            }
            CameraState::Pan(pan) => {
                let generation = self.region_generation;
                let request = FetchRequest::Region {
                    center: pan.center,
                    zoom: pan.zoom,
                    width: self.config.region_width,
                    height: self.config.region_height,
                };
                debug!("refreshing {request} (generation {})", generation.0);
                let fetcher = self.cache.fetcher().clone();
                async move {
                    let result = match fetcher.fetch(request).await {
                        Ok(bytes) => decode_image(&bytes).map_err(ViewerError::from),
                        Err(err) => Err(err.into()),
                    };
                    CompletedRefresh {
                        issued_at: now,
                        outcome: RefreshOutcome::Region { generation, result },
                    }
                }
                .boxed()
            }
        }
    }

    /// Applies a refresh result if it is still current.
    pub fn finish_refresh(&mut self, completed: CompletedRefresh, now: Instant) {
        let latency = now.saturating_duration_since(completed.issued_at);
        self.metrics
            .record(Sample::RefreshLatencyMillis, latency.as_millis() as i64);

        match completed.outcome {
            RefreshOutcome::Atlas(BuildOutcome::Ready(atlas)) => {
                debug!("displaying atlas {}", atlas.zoom());
                self.atlas = Some(atlas);
                self.refresh_done();
            }
            RefreshOutcome::Atlas(BuildOutcome::Superseded { request, current }) => {
                self.discard_stale(request, current);
            }
            RefreshOutcome::Atlas(BuildOutcome::Failed(err)) => {
                self.refresh_failed(&err.into());
            }
            RefreshOutcome::Region { generation, .. } if generation != self.region_generation => {
                debug!(
                    "discarding superseded region (generation {} < {})",
                    generation.0, self.region_generation.0
                );
                self.metrics.inc(Counter::StaleResultsDiscarded);
            }
            RefreshOutcome::Region {
                result: Ok(image), ..
            } => {
                self.region = Some(image);
                self.refresh_done();
            }
            RefreshOutcome::Region {
                result: Err(err), ..
            } => self.refresh_failed(&err),
        }
    }

    fn discard_stale(&mut self, request: AtlasBuildRequest, current: Generation) {
        debug!(
            "discarding superseded atlas {} (generation {} < {})",
            request.zoom, request.generation.0, current.0
        );
        self.metrics.inc(Counter::StaleResultsDiscarded);
    }

    fn refresh_done(&mut self) {
        self.set_loading(false);
        self.request_frame();
    }

    fn refresh_failed(&mut self, err: &ViewerError) {
        warn!("refresh failed, keeping the previous image: {err}");
        self.metrics.inc(Counter::RefreshFailures);
        self.set_loading(false);
    }

    fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.surface.set_loading(loading);
        }
    }

    pub fn show_progress(&mut self, progress: streaming::PreloadProgress) {
        self.surface.show_progress(progress);
    }

    pub fn request_frame(&mut self) {
        if !self.frames.request() {
            self.metrics.inc(Counter::FramesCoalesced);
        }
    }

    /// Restarts frame-time measurement after the loop stopped ticking.
    pub fn pause_clock(&mut self) {
        self.clock.reset();
    }

    /// One display tick: advance idle rotation, then draw if a frame is due.
    pub fn display_tick(&mut self, now: Instant, rotate: bool) {
        let frame = self.clock.tick(now);
        self.metrics
            .record(Sample::FrameDtMicros, (frame.dt_s * 1e6).round() as i64);

        if rotate && self.auto_rotating() {
            let delta = self.auto_rotation.delta(&frame);
            if let CameraState::Orbit(orbit) = &mut self.camera {
                orbit.spin(delta);
            }
            self.request_frame();
        }

        if self.frames.take() {
            self.draw();
        }
    }

    fn draw(&mut self) {
        let drawn = match &self.camera {
            CameraState::Orbit(orbit) => match (&self.atlas, self.config.backend) {
                (None, _) => false,
                (Some(atlas), Backend::Canvas) => {
                    let size = self.surface.backing_size();
                    let pixels = self.canvas.render(atlas, orbit.view_center(), size);
                    self.surface.present_pixels(pixels);
                    true
                }
                (Some(atlas), Backend::Texture) => {
                    match self.texture.draw(&mut self.surface, atlas, orbit) {
                        Ok(()) => true,
                        Err(err) => {
                            warn!("textured draw failed: {err}");
                            false
                        }
                    }
                }
            },
            CameraState::Pan(_) => match &self.region {
                Some(region) => {
                    self.surface.present_pixels(region);
                    true
                }
                None => false,
            },
        };

        if drawn {
            self.metrics.inc(Counter::FramesDrawn);
        } else {
            debug!("nothing to draw yet");
            self.metrics.inc(Counter::DrawsSkipped);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::future::{BoxFuture, FutureExt};
    use image::RgbaImage;
    use tokio::time::Instant;

    use super::Viewer;
    use crate::config::{CameraMode, ViewerConfig};
    use foundation::math::{ZoomDirection, ZoomLevel};
    use runtime::Counter;
    use scene::{InputEvent, PointerId};
    use streaming::{AtlasCache, CacheConfig, FetchError, FetchRequest, PreloadProgress, TileFetcher};

    struct Offline;

    impl TileFetcher for Offline {
        fn fetch(&self, _request: FetchRequest) -> BoxFuture<'_, Result<Vec<u8>, FetchError>> {
            async { Err(FetchError::Transport("offline".into())) }.boxed()
        }
    }

    #[derive(Debug, Default)]
    struct NullSurface {
        presented: usize,
        loading: Vec<bool>,
    }

    impl render::DisplaySurface for NullSurface {
        fn backing_size(&self) -> (u32, u32) {
            (32, 32)
        }
        fn resize(&mut self, _width: u32, _height: u32) {}
        fn present_pixels(&mut self, _pixels: &RgbaImage) {
            self.presented += 1;
        }
        fn set_loading(&mut self, loading: bool) {
            self.loading.push(loading);
        }
        fn show_progress(&mut self, _progress: PreloadProgress) {}
    }

    fn viewer(config: ViewerConfig) -> Viewer<NullSurface> {
        let cache = AtlasCache::new(Arc::new(Offline), CacheConfig::default());
        Viewer::new(config, NullSurface::default(), cache).unwrap()
    }

    #[test]
    fn zoom_at_the_bound_does_not_arm_a_refresh() {
        let mut v = viewer(ViewerConfig {
            initial_zoom: 17,
            ..ViewerConfig::default()
        });
        let now = Instant::now();

        v.handle_input(InputEvent::Zoom(ZoomDirection::In), now);
        assert!(!v.refresh.is_armed());

        v.handle_input(InputEvent::Wheel { delta_y: 0.0 }, now);
        assert!(!v.refresh.is_armed());

        v.handle_input(InputEvent::Wheel { delta_y: 1.0 }, now);
        assert!(v.refresh.is_armed());
        assert_eq!(v.camera().zoom(), ZoomLevel::clamped(16));
    }

    #[test]
    fn orbit_drag_requests_a_frame_but_no_refresh() {
        let mut v = viewer(ViewerConfig::default());
        let now = Instant::now();
        let id = PointerId(7);

        v.handle_input(InputEvent::PointerDown { id, x: 0.0, y: 0.0 }, now);
        assert!(!v.auto_rotating());
        v.handle_input(InputEvent::PointerMove { id, x: 10.0, y: 0.0 }, now);
        v.handle_input(InputEvent::PointerMove { id, x: 20.0, y: 0.0 }, now);

        assert!(v.frames.is_pending());
        assert_eq!(v.metrics().counter(Counter::FramesCoalesced), 1);
        assert!(!v.refresh.is_armed());

        v.handle_input(InputEvent::PointerUp { id, x: 20.0, y: 0.0 }, now);
        assert!(v.refresh.is_armed());
        assert!(v.auto_rotating());
    }

    #[test]
    fn pan_drag_rearms_the_debounce() {
        let mut v = viewer(ViewerConfig {
            mode: CameraMode::Pan,
            ..ViewerConfig::default()
        });
        let t0 = Instant::now();
        let id = PointerId(1);

        v.handle_input(InputEvent::PointerDown { id, x: 0.0, y: 0.0 }, t0);
        v.handle_input(InputEvent::PointerMove { id, x: 5.0, y: 0.0 }, t0);
        let later = t0 + Duration::from_millis(100);
        v.handle_input(InputEvent::PointerMove { id, x: 9.0, y: 0.0 }, later);

        assert_eq!(v.refresh.deadline(), Some(later + Duration::from_millis(120)));
        assert!(v.camera().view_center().lon < 0.0);
    }

    #[test]
    fn orbit_zoom_supersedes_the_atlas_before_the_refresh_fires() {
        let mut v = viewer(ViewerConfig::default());
        let now = Instant::now();
        let startup = v.cache().request(v.atlas_zoom());

        v.handle_input(InputEvent::Zoom(ZoomDirection::In), now);

        assert!(v.refresh.is_armed());
        assert!(!v.cache().is_current(&startup));
        let next = v.cache().request(v.atlas_zoom());
        assert_eq!(next.zoom, ZoomLevel::clamped(3));
        assert_eq!(next.generation, v.cache().current_generation());
    }

    #[test]
    fn pan_input_supersedes_in_flight_regions() {
        let mut v = viewer(ViewerConfig {
            mode: CameraMode::Pan,
            ..ViewerConfig::default()
        });
        let now = Instant::now();
        let id = PointerId(1);
        let g0 = v.region_generation;

        v.handle_input(InputEvent::PointerDown { id, x: 0.0, y: 0.0 }, now);
        assert_eq!(v.region_generation, g0);
        v.handle_input(InputEvent::PointerMove { id, x: 5.0, y: 0.0 }, now);
        let g1 = v.region_generation;
        assert!(g1 > g0);

        v.handle_input(InputEvent::Zoom(ZoomDirection::In), now);
        assert!(v.region_generation > g1);
    }

    #[test]
    fn draw_without_data_is_skipped() {
        let mut v = viewer(ViewerConfig::default());
        let now = Instant::now();
        v.request_frame();
        v.display_tick(now, false);

        assert_eq!(v.surface().presented, 0);
        assert_eq!(v.metrics().counter(Counter::DrawsSkipped), 1);
        assert!(!v.frames.is_pending());
    }

    #[tokio::test]
    async fn failed_refresh_turns_loading_off() {
        let mut v = viewer(ViewerConfig::default());
        let now = Instant::now();

        let task = v.start_refresh(now);
        assert!(v.is_loading());
        let completed = task.await;
        v.finish_refresh(completed, now);

        assert!(!v.is_loading());
        assert!(v.displayed_atlas().is_none());
        assert_eq!(v.surface().loading, vec![true, false]);
        assert_eq!(v.metrics().counter(Counter::RefreshFailures), 1);
    }
}
