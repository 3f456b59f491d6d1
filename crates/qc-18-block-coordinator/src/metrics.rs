//! Observability surface for the block coordinator.
//!
//! Mirrors `qc-17-block-production::metrics::Metrics`: a flat struct of
//! `AtomicU64` counters, cheap to increment on the hot path, with
//! optional registration against this workspace's telemetry collaborator
//! (`quantum-telemetry`) via the `MetricsRegistry` port.

use crate::domain::{CoordinatorState, VisitCounters};
use std::sync::atomic::{AtomicU64, Ordering};

/// Coordinator-wide counters, independent of the per-state visit counts
/// tracked in [`VisitCounters`].
#[derive(Debug, Default)]
pub struct CoordinatorMetrics {
    /// Per-state visit counts.
    pub visits: VisitCounters,
    /// Blocks successfully committed (post-exec validation passed).
    pub commits_total: AtomicU64,
    /// State-store reverts performed (fork reconciliation or rejection).
    pub reverts_total: AtomicU64,
    /// Times `RESET` was entered.
    pub resets_total: AtomicU64,
    /// Blocks removed from the chain due to validation or timeout
    /// failures.
    pub blocks_rejected_total: AtomicU64,
    /// Blocks minted and transmitted successfully.
    pub blocks_mined_total: AtomicU64,
    /// Transactions marked `EXECUTED` via the status cache.
    pub transactions_executed_total: AtomicU64,
}

impl CoordinatorMetrics {
    /// Construct a fresh, zeroed metrics surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visit to `state`.
    pub fn record_visit(&self, state: CoordinatorState) {
        self.visits.record(state.index());
    }

    /// Record a successful commit.
    pub fn record_commit(&self) {
        self.commits_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a state-store revert.
    pub fn record_revert(&self) {
        self.reverts_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record entry into `RESET`.
    pub fn record_reset(&self) {
        self.resets_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a block being purged from the chain.
    pub fn record_block_rejected(&self) {
        self.blocks_rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a block being minted and transmitted.
    pub fn record_block_mined(&self) {
        self.blocks_mined_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record `count` transactions being marked executed.
    pub fn record_transactions_executed(&self, count: u64) {
        self.transactions_executed_total
            .fetch_add(count, Ordering::Relaxed);
    }
}

/// Port for registering increment-only counters with the node's
/// telemetry registry. Modeled after the single collaborator capability
/// design-notes §9 calls out: "create counter with name, returning an
/// increment-only handle."
pub trait MetricsRegistry: Send + Sync {
    /// Register (or fetch, if already registered) a named counter handle.
    fn counter(&self, name: &str) -> Box<dyn CounterHandle>;
}

/// An increment-only counter handle returned by a [`MetricsRegistry`].
pub trait CounterHandle: Send + Sync {
    /// Increment the counter by one.
    fn increment(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_accumulate() {
        let metrics = CoordinatorMetrics::new();
        assert_eq!(metrics.commits_total.load(Ordering::Relaxed), 0);

        metrics.record_commit();
        metrics.record_commit();
        metrics.record_reset();
        metrics.record_transactions_executed(3);

        assert_eq!(metrics.commits_total.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.resets_total.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.transactions_executed_total.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn visit_counters_track_per_state() {
        let metrics = CoordinatorMetrics::new();
        metrics.record_visit(CoordinatorState::Reset);
        metrics.record_visit(CoordinatorState::Reset);
        metrics.record_visit(CoordinatorState::Synchronising);

        assert_eq!(metrics.visits.get(CoordinatorState::Reset.index()), 2);
        assert_eq!(
            metrics.visits.get(CoordinatorState::Synchronising.index()),
            1
        );
    }
}
