use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters shared by the router and its drain tasks.
///
/// Every admitted event eventually lands in exactly one of `written`,
/// `dropped_write`, or `dropped_failed`; the difference between `admitted`
/// and that sum is what was still queued when the router shut down.
#[derive(Debug, Default)]
pub struct RouterMetrics {
    dispatched: AtomicU64,
    admitted: AtomicU64,
    written: AtomicU64,
    dropped_queue_full: AtomicU64,
    dropped_write: AtomicU64,
    dropped_failed: AtomicU64,
    dropped_at_shutdown: AtomicU64,
}

impl RouterMetrics {
    pub(crate) fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_queue_full_drop(&self) {
        self.dropped_queue_full.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_write_drop(&self) {
        self.dropped_write.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed_drop(&self) {
        self.dropped_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_shutdown_drops(&self, count: u64) {
        self.dropped_at_shutdown.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            admitted: self.admitted.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            dropped_queue_full: self.dropped_queue_full.load(Ordering::Relaxed),
            dropped_write: self.dropped_write.load(Ordering::Relaxed),
            dropped_failed: self.dropped_failed.load(Ordering::Relaxed),
            dropped_at_shutdown: self.dropped_at_shutdown.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the router counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    /// Events passed to `dispatch`.
    pub dispatched: u64,
    /// Sink/event pairs that passed admission and were enqueued.
    pub admitted: u64,
    /// Events written through a sink.
    pub written: u64,
    /// Admitted events dropped because a sink's queue was full.
    pub dropped_queue_full: u64,
    /// Best-effort console/syslog writes that failed.
    pub dropped_write: u64,
    /// Events discarded because their sink had already failed.
    pub dropped_failed: u64,
    /// Events still queued when the shutdown grace period expired.
    pub dropped_at_shutdown: u64,
}
