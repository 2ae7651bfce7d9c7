// ============================================================================
// Engine Metrics
// Processed-order count, latency and throughput accumulators
// ============================================================================

use crossbeam::utils::CachePadded;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Counters written only by the matching thread and read from anywhere.
///
/// Readers get eventual visibility, not read-your-writes freshness across
/// threads.
#[derive(Debug)]
pub struct EngineMetrics {
    processed_orders: CachePadded<AtomicU64>,
    /// Sum of per-order latencies, in microseconds
    total_latency_micros: CachePadded<AtomicU64>,
    latency_samples: CachePadded<AtomicU64>,
    started_at: Mutex<Option<Instant>>,
    min_throughput_elapsed: Duration,
}

impl EngineMetrics {
    pub fn new(min_throughput_elapsed: Duration) -> Self {
        Self {
            processed_orders: CachePadded::new(AtomicU64::new(0)),
            total_latency_micros: CachePadded::new(AtomicU64::new(0)),
            latency_samples: CachePadded::new(AtomicU64::new(0)),
            started_at: Mutex::new(None),
            min_throughput_elapsed,
        }
    }

    /// Reset the throughput clock. Counters keep accumulating.
    pub(crate) fn mark_started(&self) {
        *self.started_at.lock() = Some(Instant::now());
    }

    pub(crate) fn record_latency(&self, latency: Duration) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.total_latency_micros
            .fetch_add(micros, Ordering::Relaxed);
        self.latency_samples.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn record_processed(&self) {
        self.processed_orders.fetch_add(1, Ordering::Release);
    }

    pub fn processed_order_count(&self) -> u64 {
        self.processed_orders.load(Ordering::Acquire)
    }

    /// Mean submit-to-processed latency in milliseconds, 0 with no samples.
    ///
    /// Latencies are accumulated in whole microseconds, so sub-millisecond
    /// orders contribute their real cost instead of truncating to 0 ms.
    pub fn average_latency_ms(&self) -> f64 {
        let samples = self.latency_samples.load(Ordering::Acquire);
        if samples == 0 {
            return 0.0;
        }

        let total = self.total_latency_micros.load(Ordering::Relaxed);
        total as f64 / samples as f64 / 1_000.0
    }

    /// Time since the engine was last started, if it ever was.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.lock().map(|at| at.elapsed())
    }

    /// Processed orders per second since start.
    ///
    /// Zero before the first start and while elapsed time is under the
    /// configured threshold.
    pub fn throughput_ops(&self) -> f64 {
        match self.elapsed() {
            Some(elapsed) if elapsed >= self.min_throughput_elapsed && !elapsed.is_zero() => {
                self.processed_order_count() as f64 / elapsed.as_secs_f64()
            },
            _ => 0.0,
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            processed_orders: self.processed_order_count(),
            average_latency_ms: self.average_latency_ms(),
            throughput_ops: self.throughput_ops(),
            elapsed: self.elapsed().unwrap_or_default(),
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new(Duration::from_millis(1))
    }
}

/// Point-in-time copy of the engine metrics, for pollers
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MetricsSnapshot {
    pub processed_orders: u64,
    pub average_latency_ms: f64,
    pub throughput_ops: f64,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_empty_metrics_are_zero() {
        let metrics = EngineMetrics::default();

        assert_eq!(metrics.processed_order_count(), 0);
        assert_eq!(metrics.average_latency_ms(), 0.0);
        assert_eq!(metrics.throughput_ops(), 0.0);
        assert!(metrics.elapsed().is_none());
    }

    #[test]
    fn test_average_latency() {
        let metrics = EngineMetrics::default();
        metrics.record_latency(Duration::from_millis(2));
        metrics.record_latency(Duration::from_millis(4));

        assert_eq!(metrics.average_latency_ms(), 3.0);
    }

    #[test]
    fn test_sub_millisecond_latency_is_kept() {
        let metrics = EngineMetrics::default();
        metrics.record_latency(Duration::from_micros(250));
        metrics.record_latency(Duration::from_micros(750));

        assert_eq!(metrics.average_latency_ms(), 0.5);
    }

    #[test]
    fn test_throughput_threshold() {
        let metrics = EngineMetrics::new(Duration::from_secs(3600));
        metrics.mark_started();
        metrics.record_processed();

        assert_eq!(metrics.throughput_ops(), 0.0);
    }

    #[test]
    fn test_throughput_after_start() {
        let metrics = EngineMetrics::new(Duration::from_millis(1));
        metrics.mark_started();
        for _ in 0..10 {
            metrics.record_processed();
        }
        thread::sleep(Duration::from_millis(5));

        let throughput = metrics.throughput_ops();
        assert!(throughput > 0.0);
        assert!(throughput <= 10.0 / 0.005);
    }

    #[test]
    fn test_snapshot() {
        let metrics = EngineMetrics::default();
        metrics.record_processed();
        metrics.record_latency(Duration::from_micros(1500));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.processed_orders, 1);
        assert_eq!(snapshot.average_latency_ms, 1.5);
        assert_eq!(snapshot.elapsed, Duration::ZERO);
    }
}
