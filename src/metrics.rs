//! In-process metrics: latency percentiles (p50/p95/p99) over a sliding
//! window of recent samples, plus event counters for suggestion, image-cache
//! and history activity.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Samples kept per latency metric; older ones fall out of the window.
const WINDOW_SIZE: usize = 1024;

/// Measures one operation; the latency is recorded by `finish`.
pub struct TimingSpan {
    name: &'static str,
    started: Instant,
    registry: Arc<MetricsRegistry>,
}

impl TimingSpan {
    pub fn finish(self) -> Duration {
        let elapsed = self.started.elapsed();
        self.registry.record(self.name, elapsed.as_micros() as f64);
        elapsed
    }
}

/// Most recent latency samples for one metric, oldest first.
struct LatencyWindow {
    samples: VecDeque<f64>,
    limit: usize,
}

impl LatencyWindow {
    fn new(limit: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(limit),
            limit,
        }
    }

    fn push(&mut self, value_us: f64) {
        if self.samples.len() == self.limit {
            self.samples.pop_front();
        }
        self.samples.push_back(value_us);
    }

    /// Nearest-rank percentile; 0 when empty.
    fn percentile(&self, p: f64) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
        sorted[rank.clamp(1, sorted.len()) - 1]
    }

    fn summary(&self) -> MetricSummary {
        MetricSummary {
            p50_us: self.percentile(50.0),
            p95_us: self.percentile(95.0),
            p99_us: self.percentile(99.0),
            count: self.samples.len(),
        }
    }
}

#[derive(Default)]
pub struct MetricsRegistry {
    latencies: Mutex<HashMap<&'static str, LatencyWindow>>,
    counters: Mutex<HashMap<&'static str, u64>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a latency sample (microseconds) to the named metric.
    pub fn record(&self, name: &'static str, value_us: f64) {
        self.latencies
            .lock()
            .entry(name)
            .or_insert_with(|| LatencyWindow::new(WINDOW_SIZE))
            .push(value_us);
        tracing::trace!(metric = name, value_us, "latency recorded");
    }

    pub fn increment(&self, name: &'static str) {
        *self.counters.lock().entry(name).or_insert(0) += 1;
    }

    pub fn count(&self, name: &str) -> u64 {
        self.counters.lock().get(name).copied().unwrap_or(0)
    }

    pub fn span(self: &Arc<Self>, name: &'static str) -> TimingSpan {
        TimingSpan {
            name,
            started: Instant::now(),
            registry: Arc::clone(self),
        }
    }

    /// Percentile `p` (0-100) of the named metric, in microseconds.
    pub fn percentile(&self, name: &str, p: f64) -> f64 {
        self.latencies
            .lock()
            .get(name)
            .map_or(0.0, |window| window.percentile(p))
    }

    pub fn summary(&self) -> HashMap<String, MetricSummary> {
        self.latencies
            .lock()
            .iter()
            .map(|(&name, window)| (name.to_string(), window.summary()))
            .collect()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricSummary {
    pub p50_us: f64,
    pub p95_us: f64,
    pub p99_us: f64,
    pub count: usize,
}

pub mod metric_names {
    pub const SUGGEST: &str = "t_suggest";
    pub const IMAGE_RESOLVE: &str = "t_image_resolve";
    pub const IMAGE_CACHE_HIT: &str = "image_cache_hit";
    pub const IMAGE_CACHE_MISS: &str = "image_cache_miss";
    pub const HISTORY_RECORDED: &str = "history_recorded";
}
