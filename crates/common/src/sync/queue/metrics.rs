use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering as AtomicOrdering};

use serde::{Deserialize, Serialize};

use super::types::Priority;

/// Queue metrics for monitoring
#[derive(Debug, Default)]
pub struct QueueMetrics {
    pub total_enqueued: AtomicU64,
    pub high_priority_enqueued: AtomicU64,
    pub total_started: AtomicU64,
    pub total_completed: AtomicU64,
    pub total_panicked: AtomicU64,
    pub total_abandoned: AtomicU64,
    pub current_size: AtomicUsize,
    pub queue_depth_max: AtomicUsize,
    pub drains_started: AtomicU64,
}

impl QueueMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record enqueue operation
    pub fn record_enqueue(&self, priority: Priority, size: usize) {
        self.total_enqueued.fetch_add(1, AtomicOrdering::Relaxed);
        if priority == Priority::High {
            self.high_priority_enqueued.fetch_add(1, AtomicOrdering::Relaxed);
        }
        self.update_size(size);
    }

    /// Record a job leaving the pending list
    pub fn record_start(&self, size: usize) {
        self.total_started.fetch_add(1, AtomicOrdering::Relaxed);
        self.update_size(size);
    }

    pub fn record_completion(&self) {
        self.total_completed.fetch_add(1, AtomicOrdering::Relaxed);
    }

    pub fn record_panic(&self) {
        self.total_panicked.fetch_add(1, AtomicOrdering::Relaxed);
    }

    /// Record jobs dropped without running
    pub fn record_abandoned(&self, count: usize) {
        self.total_abandoned.fetch_add(count as u64, AtomicOrdering::Relaxed);
        self.update_size(0);
    }

    pub fn record_drain_started(&self) {
        self.drains_started.fetch_add(1, AtomicOrdering::Relaxed);
    }

    fn update_size(&self, size: usize) {
        self.current_size.store(size, AtomicOrdering::Relaxed);
        self.queue_depth_max.fetch_max(size, AtomicOrdering::Relaxed);
    }

    /// Get a snapshot of metrics
    pub fn snapshot(&self) -> QueueMetricsSnapshot {
        QueueMetricsSnapshot {
            total_enqueued: self.total_enqueued.load(AtomicOrdering::Relaxed),
            high_priority_enqueued: self.high_priority_enqueued.load(AtomicOrdering::Relaxed),
            total_started: self.total_started.load(AtomicOrdering::Relaxed),
            total_completed: self.total_completed.load(AtomicOrdering::Relaxed),
            total_panicked: self.total_panicked.load(AtomicOrdering::Relaxed),
            total_abandoned: self.total_abandoned.load(AtomicOrdering::Relaxed),
            current_size: self.current_size.load(AtomicOrdering::Relaxed),
            queue_depth_max: self.queue_depth_max.load(AtomicOrdering::Relaxed),
            drains_started: self.drains_started.load(AtomicOrdering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`QueueMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMetricsSnapshot {
    pub total_enqueued: u64,
    pub high_priority_enqueued: u64,
    pub total_started: u64,
    pub total_completed: u64,
    pub total_panicked: u64,
    pub total_abandoned: u64,
    pub current_size: usize,
    pub queue_depth_max: usize,
    pub drains_started: u64,
}

impl QueueMetricsSnapshot {
    /// Jobs that were accepted but have not started yet or are running.
    pub fn in_flight(&self) -> u64 {
        self.total_enqueued
            .saturating_sub(self.total_completed + self.total_panicked + self.total_abandoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_max_depth() {
        let metrics = QueueMetrics::new();
        metrics.record_enqueue(Priority::Normal, 1);
        metrics.record_enqueue(Priority::High, 2);
        metrics.record_start(1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_enqueued, 2);
        assert_eq!(snapshot.high_priority_enqueued, 1);
        assert_eq!(snapshot.current_size, 1);
        assert_eq!(snapshot.queue_depth_max, 2);
    }

    #[test]
    fn in_flight_excludes_finished_jobs() {
        let metrics = QueueMetrics::new();
        for size in 1..=3 {
            metrics.record_enqueue(Priority::Normal, size);
        }
        metrics.record_completion();
        metrics.record_panic();

        assert_eq!(metrics.snapshot().in_flight(), 1);
    }
}
