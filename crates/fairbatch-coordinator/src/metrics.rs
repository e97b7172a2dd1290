//! Operational counters for the coordinator.
//!
//! Thread-safe atomics recorded by the use-case orchestrators; `snapshot`
//! produces a plain struct for export.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counter collector for coordinator operations.
#[derive(Default)]
pub struct Metrics {
    /// Batches opened.
    pub batches_created: AtomicU64,
    /// Batches finalized normally.
    pub batches_finalized: AtomicU64,
    /// Batches cancelled administratively.
    pub batches_cancelled: AtomicU64,
    /// Recorded phase transitions.
    pub phase_advances: AtomicU64,
    /// Commitments accepted into a batch.
    pub commitments_accepted: AtomicU64,
    /// Commitments rejected by the protocol.
    pub commitments_rejected: AtomicU64,
    /// Reveals verified and recorded.
    pub reveals_accepted: AtomicU64,
    /// Reveals rejected by the protocol.
    pub reveals_rejected: AtomicU64,
    /// Bridge calls that failed.
    pub bridge_failures: AtomicU64,
    /// Saves that failed after the bridge already committed.
    pub persistence_failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_batch_created(&self) {
        self.batches_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch_finalized(&self) {
        self.batches_finalized.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch_cancelled(&self) {
        self.batches_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_phase_advance(&self) {
        self.phase_advances.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_commitment_accepted(&self) {
        self.commitments_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_commitment_rejected(&self) {
        self.commitments_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reveal_accepted(&self) {
        self.reveals_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reveal_rejected(&self) {
        self.reveals_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bridge_failure(&self) {
        self.bridge_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persistence_failure(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_created: self.batches_created.load(Ordering::Relaxed),
            batches_finalized: self.batches_finalized.load(Ordering::Relaxed),
            batches_cancelled: self.batches_cancelled.load(Ordering::Relaxed),
            phase_advances: self.phase_advances.load(Ordering::Relaxed),
            commitments_accepted: self.commitments_accepted.load(Ordering::Relaxed),
            commitments_rejected: self.commitments_rejected.load(Ordering::Relaxed),
            reveals_accepted: self.reveals_accepted.load(Ordering::Relaxed),
            reveals_rejected: self.reveals_rejected.load(Ordering::Relaxed),
            bridge_failures: self.bridge_failures.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counter values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub batches_created: u64,
    pub batches_finalized: u64,
    pub batches_cancelled: u64,
    pub phase_advances: u64,
    pub commitments_accepted: u64,
    pub commitments_rejected: u64,
    pub reveals_accepted: u64,
    pub reveals_rejected: u64,
    pub bridge_failures: u64,
    pub persistence_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let snapshot = Metrics::new().snapshot();
        assert_eq!(snapshot, MetricsSnapshot::default());
    }

    #[test]
    fn test_recording() {
        let metrics = Metrics::new();
        metrics.record_commitment_accepted();
        metrics.record_commitment_accepted();
        metrics.record_commitment_rejected();
        metrics.record_bridge_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.commitments_accepted, 2);
        assert_eq!(snapshot.commitments_rejected, 1);
        assert_eq!(snapshot.bridge_failures, 1);
        assert_eq!(snapshot.reveals_accepted, 0);
    }
}
