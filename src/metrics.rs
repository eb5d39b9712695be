//! Observability metrics for the sheriffing engine.
//!
//! Metrics are exposed via the `metrics` crate facade.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `perf_sheriff_passes_total` | Counter | `outcome` | Completed/aborted sheriff passes |
//! | `perf_sheriff_records_total` | Counter | `outcome` | Record outcomes per pass |
//! | `perf_sheriff_backfills_triggered_total` | Counter | - | Backfill jobs actually triggered |
//! | `perf_sheriff_pass_duration_seconds` | Histogram | - | Wall-clock time of one pass |
//!
//! To export to Prometheus:
//!
//! ```rust,ignore
//! use metrics_exporter_prometheus::PrometheusBuilder;
//!
//! PrometheusBuilder::new()
//!     .with_http_listener(([0, 0, 0, 0], 9090))
//!     .install()
//!     .expect("failed to install Prometheus recorder");
//! ```

use std::time::{Duration, Instant};

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    /// Counter: Completed or aborted sheriff passes.
    pub const PASSES_TOTAL: &str = "perf_sheriff_passes_total";
    /// Counter: Record outcomes (backfilled, failed, malformed).
    pub const RECORDS_TOTAL: &str = "perf_sheriff_records_total";
    /// Counter: Backfill jobs actually triggered.
    pub const BACKFILLS_TRIGGERED_TOTAL: &str = "perf_sheriff_backfills_triggered_total";
    /// Histogram: Wall-clock duration of one pass in seconds.
    pub const PASS_DURATION_SECONDS: &str = "perf_sheriff_pass_duration_seconds";
}

/// Label keys used across metrics.
pub mod labels {
    /// The outcome label ("completed", "runtime_exceeded", "backfilled", ...).
    pub const OUTCOME: &str = "outcome";
}

/// Recorder for sheriffing metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct SheriffMetrics;

impl SheriffMetrics {
    /// Creates a new metrics recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Records the outcome of a whole pass.
    pub fn record_pass(&self, outcome: &'static str) {
        counter!(names::PASSES_TOTAL, labels::OUTCOME => outcome).increment(1);
    }

    /// Records the terminal outcome of one record.
    pub fn record_outcome(&self, outcome: &'static str) {
        counter!(names::RECORDS_TOTAL, labels::OUTCOME => outcome).increment(1);
    }

    /// Records backfill jobs actually triggered.
    pub fn record_backfills_triggered(&self, count: u32) {
        counter!(names::BACKFILLS_TRIGGERED_TOTAL).increment(u64::from(count));
    }

    /// Observes the duration of one pass.
    pub fn observe_pass_duration(&self, duration: Duration) {
        histogram!(names::PASS_DURATION_SECONDS).record(duration.as_secs_f64());
    }
}

/// Guard that reports elapsed time to a callback on drop.
pub struct TimingGuard<F: Fn(Duration)> {
    start: Instant,
    callback: F,
}

impl<F: Fn(Duration)> TimingGuard<F> {
    /// Starts timing; the callback fires when the guard drops.
    pub fn new(callback: F) -> Self {
        Self {
            start: Instant::now(),
            callback,
        }
    }
}

impl<F: Fn(Duration)> Drop for TimingGuard<F> {
    fn drop(&mut self) {
        (self.callback)(self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn timing_guard_fires_on_drop() {
        let fired = Arc::new(AtomicBool::new(false));
        {
            let fired = fired.clone();
            let _guard = TimingGuard::new(move |_| fired.store(true, Ordering::SeqCst));
        }
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn recording_does_not_panic_without_recorder() {
        let metrics = SheriffMetrics::new();
        metrics.record_pass("completed");
        metrics.record_outcome("backfilled");
        metrics.record_backfills_triggered(3);
        metrics.observe_pass_duration(Duration::from_millis(5));
    }
}
