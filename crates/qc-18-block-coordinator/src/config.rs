//! Runtime configuration for the block coordinator.
//!
//! Mirrors the layering convention of this workspace's other subsystem
//! crates (`qc-17-block-production::config`, `node-runtime::container
//! ::config`): a plain, `Clone + Debug` struct with a `Default` impl,
//! meant to nest inside a parent node configuration rather than read
//! the environment itself.

use std::time::Duration;

/// Tunables for the block coordinator's state machine.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Maximum length of a single common-ancestor-path lookup.
    pub common_path_to_ancestor_length_limit: usize,

    /// Residual ancestor-path length below which the cache is discarded
    /// in favor of step-wise lookup.
    pub threshold_for_fast_syncing: usize,

    /// How long to wait after entering `WAIT_FOR_TRANSACTIONS` before
    /// asking peers for missing digests.
    pub wait_before_asking_for_missing_tx: Duration,

    /// Overall budget, counted from the ask-peers moment, before an
    /// unreachable block is purged.
    pub wait_for_tx_timeout: Duration,

    /// Minimum interval between `WAIT_FOR_TRANSACTIONS` progress logs.
    pub tx_sync_notify_interval: Duration,

    /// Minimum interval between `WAIT_FOR_EXECUTION` progress logs.
    pub exec_notify_interval: Duration,

    /// Minimum interval between general periodic info logs.
    pub periodic_info_log_interval: Duration,

    /// Delay after a hashless/empty heaviest tip before retrying.
    pub empty_tip_retry_delay: Duration,

    /// Delay after a catastrophic or revert failure before retrying.
    pub catastrophic_failure_delay: Duration,

    /// Delay applied while idling in `SYNCHRONISED` or while a stake
    /// oracle has declined to permit minting.
    pub idle_poll_delay: Duration,

    /// Delay applied between `WAIT_FOR_TRANSACTIONS` re-entries.
    pub tx_wait_poll_delay: Duration,

    /// Delay applied between `WAIT_FOR_EXECUTION` re-entries while
    /// `RUNNING`.
    pub exec_wait_poll_delay: Duration,

    /// Target time between minted blocks.
    pub block_period: Duration,

    /// Default proof-of-work-style difficulty target used when no stake
    /// oracle or packer supplies one.
    pub block_difficulty: u64,

    /// Declared parallel-lane count (`1 << log2_num_lanes`) minted
    /// blocks must carry.
    pub num_lanes: u32,

    /// Declared slice count minted blocks must carry.
    pub num_slices: usize,

    /// Attempt budget handed to the proof miner per `PROOF_SEARCH`
    /// entry, keeping each entry a bounded, cooperative slice of work.
    pub proof_search_attempt_budget: u64,

    /// Whether this node is configured to mint blocks at all.
    pub mining_enabled: bool,

    /// Whether minting is currently allowed (e.g. toggled off during
    /// maintenance) independent of `mining_enabled`.
    pub mining_allowed: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            common_path_to_ancestor_length_limit: 256,
            threshold_for_fast_syncing: 100,
            wait_before_asking_for_missing_tx: Duration::from_secs(30),
            wait_for_tx_timeout: Duration::from_secs(30),
            tx_sync_notify_interval: Duration::from_secs(1),
            exec_notify_interval: Duration::from_millis(500),
            periodic_info_log_interval: Duration::from_secs(10),
            empty_tip_retry_delay: Duration::from_millis(500),
            catastrophic_failure_delay: Duration::from_secs(5),
            idle_poll_delay: Duration::from_millis(100),
            tx_wait_poll_delay: Duration::from_millis(200),
            exec_wait_poll_delay: Duration::from_millis(20),
            block_period: Duration::from_secs(10),
            block_difficulty: 1 << 32,
            num_lanes: 1,
            num_slices: 1,
            proof_search_attempt_budget: 1_000_000,
            mining_enabled: false,
            mining_allowed: true,
        }
    }
}
