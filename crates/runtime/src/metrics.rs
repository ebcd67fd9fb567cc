use std::collections::BTreeMap;

/// Scheduling events the viewer counts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Counter {
    RefreshesIssued,
    RefreshFailures,
    StaleResultsDiscarded,
    FramesDrawn,
    FramesCoalesced,
    DrawsSkipped,
}

impl Counter {
    pub fn name(self) -> &'static str {
        match self {
            Counter::RefreshesIssued => "refreshes_issued",
            Counter::RefreshFailures => "refresh_failures",
            Counter::StaleResultsDiscarded => "stale_results_discarded",
            Counter::FramesDrawn => "frames_drawn",
            Counter::FramesCoalesced => "frames_coalesced",
            Counter::DrawsSkipped => "draws_skipped",
        }
    }
}

/// Distributions the viewer samples.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sample {
    /// Measured frame delta, in microseconds.
    FrameDtMicros,
    /// Time from a refresh firing to its result arriving, in milliseconds.
    RefreshLatencyMillis,
}

impl Sample {
    pub fn name(self) -> &'static str {
        match self {
            Sample::FrameDtMicros => "frame_dt_us",
            Sample::RefreshLatencyMillis => "refresh_latency_ms",
        }
    }
}

/// Deterministic metrics aggregation.
///
/// Sorted maps keep snapshots in a stable order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<Counter, u64>,
    histograms: BTreeMap<Sample, Histogram>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Histogram {
    pub count: u64,
    pub sum: i64,
    pub min: i64,
    pub max: i64,
}

impl Histogram {
    pub fn record(&mut self, value: i64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub counters: Vec<(&'static str, u64)>,
    pub histograms: Vec<(&'static str, Histogram)>,
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (name, value) in &self.counters {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{name}={value}")?;
        }
        for (name, h) in &self.histograms {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{name}[n={} min={} max={}]", h.count, h.min, h.max)?;
        }
        Ok(())
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, counter: Counter) -> u64 {
        self.counters.get(&counter).copied().unwrap_or(0)
    }

    pub fn inc(&mut self, counter: Counter) {
        self.inc_by(counter, 1);
    }

    pub fn inc_by(&mut self, counter: Counter, by: u64) {
        *self.counters.entry(counter).or_insert(0) += by;
    }

    pub fn record(&mut self, sample: Sample, value: i64) {
        self.histograms.entry(sample).or_default().record(value);
    }

    pub fn histogram(&self, sample: Sample) -> Option<Histogram> {
        self.histograms.get(&sample).copied()
    }

    /// Returns a stable, sorted snapshot suitable for logs.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.iter().map(|(k, v)| (k.name(), *v)).collect(),
            histograms: self
                .histograms
                .iter()
                .map(|(k, v)| (k.name(), *v))
                .collect(),
        }
    }
}
