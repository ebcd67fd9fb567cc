use std::time::Duration;

use foundation::time::Time;
use tokio::time::Instant;

/// Metadata for one display tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Measured delta time since the previous tick (seconds), after capping.
    pub dt_s: f64,
    /// Accumulated clock time at this frame (seconds).
    pub time: Time,
}

/// Measures the time between display ticks.
///
/// The first tick after construction or [`FrameClock::reset`] has `dt_s == 0`,
/// so a loop that went idle does not produce a jump when it resumes. Every
/// later delta is capped at `max_dt`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    max_dt_s: f64,
    last: Option<Instant>,
    next_index: u64,
    time: Time,
}

impl FrameClock {
    pub fn new(max_dt: Duration) -> Self {
        Self {
            max_dt_s: max_dt.as_secs_f64(),
            last: None,
            next_index: 0,
            time: Time::ZERO,
        }
    }

    pub fn tick(&mut self, now: Instant) -> Frame {
        let dt_s = match self.last {
            Some(prev) => now
                .saturating_duration_since(prev)
                .as_secs_f64()
                .min(self.max_dt_s),
            None => 0.0,
        };
        self.last = Some(now);
        self.time = self.time.advanced_by(dt_s);

        let frame = Frame {
            index: self.next_index,
            dt_s,
            time: self.time,
        };
        self.next_index += 1;
        frame
    }

    /// Forgets the previous tick. Frame indices and accumulated time continue.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
