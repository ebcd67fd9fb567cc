use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use render::DisplaySurface;
use scene::InputEvent;

use crate::viewer::{RefreshTask, Viewer};

impl<S: DisplaySurface> Viewer<S> {
    /// Runs the viewer until `input` is closed and no refresh, preload or
    /// frame is outstanding, then hands the viewer back.
    ///
    /// Everything happens on the calling task. The first refresh fires
    /// immediately; warm atlas zooms are preloaded in the background in
    /// orbit mode. Idle rotation stops once input has closed.
    pub async fn run(mut self, mut input: mpsc::Receiver<InputEvent>) -> Self {
        let mut refreshes: FuturesUnordered<RefreshTask> = FuturesUnordered::new();

        let warm = if self.camera().is_orbit() {
            self.config.warm_zoom_levels()
        } else {
            Vec::new()
        };
        let mut preloading = !warm.is_empty();
        let mut progress_open = preloading;
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        let cache = self.cache().clone();
        let preload = async move {
            streaming::preload(&cache, &warm, |progress| {
                let _ = progress_tx.send(progress);
            })
            .await
        };
        tokio::pin!(preload);

        let mut ticker = tokio::time::interval(self.config.frame_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut ticking = false;
        let mut input_open = true;

        self.schedule_initial_refresh(Instant::now());

        loop {
            let rotate = input_open && self.auto_rotating();
            let needs_tick = rotate || self.frames.is_pending();
            if needs_tick != ticking {
                ticking = needs_tick;
                if ticking {
                    ticker.reset();
                } else {
                    self.pause_clock();
                }
            }

            if !input_open
                && !self.refresh.is_armed()
                && refreshes.is_empty()
                && !preloading
                && !progress_open
                && !ticking
            {
                break;
            }

            let deadline = self.refresh.deadline();

            tokio::select! {
                biased;

                event = input.recv(), if input_open => match event {
                    Some(event) => self.handle_input(event, Instant::now()),
                    None => {
                        debug!("input closed");
                        input_open = false;
                    }
                },
                Some(completed) = refreshes.next(), if !refreshes.is_empty() => {
                    self.finish_refresh(completed, Instant::now());
                }
                progress = progress_rx.recv(), if progress_open => match progress {
                    Some(progress) => self.show_progress(progress),
                    None => progress_open = false,
                },
                done = &mut preload, if preloading => {
                    preloading = false;
                    info!("preload finished: {done}");
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    let now = Instant::now();
                    if self.refresh.fire_if_due(now) {
                        refreshes.push(self.start_refresh(now));
                    }
                }
                now = ticker.tick(), if ticking => self.display_tick(now, rotate),
            }
        }

        debug!("viewer loop finished: {}", self.metrics().snapshot());
        self
    }
}
