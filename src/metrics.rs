// ═══════════════════════════════════════════════════════════════
// METRICS COLLECTOR - the only place a failed URL leaves a trace
// ═══════════════════════════════════════════════════════════════
//
// Callers never learn why a URL went missing from their results. These
// counters do. Everything is a relaxed atomic: the numbers are for humans
// reading a dashboard, not for synchronizing anything.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The metrics snapshot - what `GET /metrics` serializes.
#[derive(Debug, Serialize, Clone)]
pub struct MetricsSnapshot {
    pub batches_started: u64,
    pub batches_rejected: u64,
    pub urls_requested: u64,
    pub fetch_failures: u64,
    pub empty_bodies: u64,
    pub empty_extractions: u64,
    pub texts_extracted: u64,
    pub units_cancelled: u64,
    pub units_panicked: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub status: String,
}

/// Thread-safe atomic metrics collector.
pub struct MetricsCollector {
    batches_started: AtomicU64,
    batches_rejected: AtomicU64,
    urls_requested: AtomicU64,
    fetch_failures: AtomicU64,
    empty_bodies: AtomicU64,
    empty_extractions: AtomicU64,
    texts_extracted: AtomicU64,
    units_cancelled: AtomicU64,
    units_panicked: AtomicU64,
    started_at: DateTime<Utc>,
    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            batches_started: AtomicU64::new(0),
            batches_rejected: AtomicU64::new(0),
            urls_requested: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            empty_bodies: AtomicU64::new(0),
            empty_extractions: AtomicU64::new(0),
            texts_extracted: AtomicU64::new(0),
            units_cancelled: AtomicU64::new(0),
            units_panicked: AtomicU64::new(0),
            started_at: Utc::now(),
            start_time: Instant::now(),
        }
    }

    /// A batch made it past input parsing. `url_count` may be zero.
    pub fn record_batch(&self, url_count: usize) {
        self.batches_started.fetch_add(1, Ordering::Relaxed);
        self.urls_requested.fetch_add(url_count as u64, Ordering::Relaxed);
    }

    pub fn increment_rejected(&self) {
        self.batches_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_fetch_failures(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_empty_bodies(&self) {
        self.empty_bodies.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_empty_extractions(&self) {
        self.empty_extractions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_extracted(&self) {
        self.texts_extracted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cancelled(&self) {
        self.units_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_panicked(&self) {
        self.units_panicked.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a snapshot of all metrics (lock-free reads)
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_started: self.batches_started.load(Ordering::Relaxed),
            batches_rejected: self.batches_rejected.load(Ordering::Relaxed),
            urls_requested: self.urls_requested.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            empty_bodies: self.empty_bodies.load(Ordering::Relaxed),
            empty_extractions: self.empty_extractions.load(Ordering::Relaxed),
            texts_extracted: self.texts_extracted.load(Ordering::Relaxed),
            units_cancelled: self.units_cancelled.load(Ordering::Relaxed),
            units_panicked: self.units_panicked.load(Ordering::Relaxed),
            started_at: self.started_at,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            status: "operational".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let snapshot = MetricsCollector::new().snapshot();
        assert_eq!(snapshot.batches_started, 0);
        assert_eq!(snapshot.texts_extracted, 0);
        assert_eq!(snapshot.status, "operational");
    }

    #[test]
    fn test_record_batch_counts_urls() {
        let metrics = MetricsCollector::new();
        metrics.record_batch(3);
        metrics.record_batch(0);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches_started, 2);
        assert_eq!(snapshot.urls_requested, 3);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let metrics = MetricsCollector::new();
        metrics.increment_fetch_failures();
        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["fetch_failures"], 1);
        assert!(json["started_at"].is_string());
    }
}
