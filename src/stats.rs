use std::sync::atomic::{AtomicU64, Ordering};

/// Pipeline counters, updated with relaxed atomics from producers and the
/// worker.
#[derive(Debug, Default)]
pub struct LoggerStats {
    accepted: AtomicU64,
    evicted: AtomicU64,
    rejected: AtomicU64,
    batches_flushed: AtomicU64,
    records_flushed: AtomicU64,
    batches_failed: AtomicU64,
    records_discarded: AtomicU64,
}

/// Point-in-time copy of [`LoggerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Records pushed into the intake queue.
    pub accepted: u64,
    /// Records dropped by the drop-oldest policy.
    pub evicted: u64,
    /// Records refused because stop had been requested.
    pub rejected: u64,
    pub batches_flushed: u64,
    pub records_flushed: u64,
    pub batches_failed: u64,
    /// Records lost together with a failed batch.
    pub records_discarded: u64,
}

impl LoggerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_accepted(&self, evicted: bool) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        if evicted {
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_flush(&self, records: usize) {
        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
        self.records_flushed.fetch_add(records as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self, records: usize) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        self.records_discarded.fetch_add(records as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            batches_flushed: self.batches_flushed.load(Ordering::Relaxed),
            records_flushed: self.records_flushed.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            records_discarded: self.records_discarded.load(Ordering::Relaxed),
        }
    }
}
