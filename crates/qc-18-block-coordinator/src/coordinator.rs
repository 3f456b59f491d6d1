//! The `Coordinator` struct: collaborator handles, config, and the
//! transient fields the state machine threads across steps.

use crate::clock::{Clock, PeriodicGate, SystemClock};
use crate::config::CoordinatorConfig;
use crate::domain::{AncestorPathCache, CoordinatorState, LastExecutedBlock, TransactionDigestSet};
use crate::metrics::CoordinatorMetrics;
use crate::ports::{
    BlockPacker, BlockSink, Dag, ExecutionEngine, MainChain, ProofMiner, StakeOracle, StateStore,
    StatusCache, SynergeticExecMgr, TransactionIndex,
};
use crate::timers::DeadlineTimer;
use shared_types::Hash;
use std::sync::Arc;
use std::time::Instant;

/// Every external collaborator the coordinator depends on. Required
/// ports are plain `Arc<dyn Trait>`; optional ones (`stake_oracle`,
/// `synergetic`, `dag`) may be left `None`, in which case the handlers
/// that would have consulted them fall back to the permissive default
/// the spec names for an unconfigured collaborator.
pub struct Collaborators {
    /// Persistent chain store and its ancestor-path index.
    pub main_chain: Arc<dyn MainChain>,
    /// Merkle-versioned state store.
    pub state_store: Arc<dyn StateStore>,
    /// Deterministic transaction execution engine.
    pub execution_engine: Arc<dyn ExecutionEngine>,
    /// Mempool/storage transaction index and peer solicitation.
    pub tx_index: Arc<dyn TransactionIndex>,
    /// Block packer's selection heuristic.
    pub packer: Arc<dyn BlockPacker>,
    /// Block broadcast sink.
    pub sink: Arc<dyn BlockSink>,
    /// Per-transaction execution status updates.
    pub status_cache: Arc<dyn StatusCache>,
    /// Cooperative proof-search collaborator.
    pub proof_miner: Arc<dyn ProofMiner>,
    /// Optional stake/consensus weight oracle.
    pub stake_oracle: Option<Arc<dyn StakeOracle>>,
    /// Optional off-chain work validator.
    pub synergetic: Option<Arc<dyn SynergeticExecMgr>>,
    /// Optional DAG-epoch subsystem.
    pub dag: Option<Arc<dyn Dag>>,
}

/// The Block Coordinator: a single-threaded cooperative state machine
/// driving chain reconciliation, transaction synchronization,
/// speculative execution, state commitment, and (optionally) block
/// production.
///
/// Construct once per node, then repeatedly call [`Coordinator::step`]
/// (directly, or via [`crate::driver::run`] / `run_async`) from a single
/// dedicated thread or task. No method on this type blocks; every wait
/// is expressed as a requested re-entry delay.
pub struct Coordinator {
    pub(crate) collaborators: Collaborators,
    pub(crate) config: CoordinatorConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) metrics: Arc<CoordinatorMetrics>,
    /// Identity this node mints blocks under. Signing itself is out of
    /// scope (§1) — the coordinator only stamps this into minted
    /// blocks' `miner` field.
    pub(crate) mining_identity: Hash,

    pub(crate) state: CoordinatorState,
    pub(crate) current_block: Option<crate::domain::Block>,
    pub(crate) next_block: Option<crate::domain::Block>,
    pub(crate) pending_txs: Option<TransactionDigestSet>,
    pub(crate) ancestor_path: AncestorPathCache,
    pub(crate) last_executed: Arc<LastExecutedBlock>,
    pub(crate) next_block_time: Instant,

    pub(crate) asked_peers: bool,
    pub(crate) ask_peers_timer: DeadlineTimer,
    pub(crate) overall_tx_timeout: DeadlineTimer,

    pub(crate) tx_wait_gate: PeriodicGate,
    pub(crate) exec_wait_gate: PeriodicGate,
    pub(crate) info_gate: PeriodicGate,
}

impl Coordinator {
    /// Construct a coordinator with the real system clock.
    pub fn new(
        collaborators: Collaborators,
        config: CoordinatorConfig,
        mining_identity: Hash,
    ) -> Self {
        Self::with_clock(collaborators, config, mining_identity, Arc::new(SystemClock))
    }

    /// Construct a coordinator with an injected clock, used by tests to
    /// drive time deterministically.
    pub fn with_clock(
        collaborators: Collaborators,
        config: CoordinatorConfig,
        mining_identity: Hash,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let now = clock.now();
        let tx_sync_notify_interval = config.tx_sync_notify_interval;
        let exec_notify_interval = config.exec_notify_interval;
        let periodic_info_log_interval = config.periodic_info_log_interval;
        let block_period = config.block_period;
        Self {
            collaborators,
            config,
            clock,
            metrics: Arc::new(CoordinatorMetrics::new()),
            mining_identity,
            state: CoordinatorState::ReloadState,
            current_block: None,
            next_block: None,
            pending_txs: None,
            ancestor_path: AncestorPathCache::new(),
            last_executed: Arc::new(LastExecutedBlock::new(Default::default())),
            next_block_time: now + block_period,
            asked_peers: false,
            ask_peers_timer: DeadlineTimer::unarmed(),
            overall_tx_timeout: DeadlineTimer::unarmed(),
            tx_wait_gate: PeriodicGate::new(tx_sync_notify_interval),
            exec_wait_gate: PeriodicGate::new(exec_notify_interval),
            info_gate: PeriodicGate::new(periodic_info_log_interval),
        }
    }

    /// The coordinator's current state tag.
    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// A clonable handle to the last-executed digest, readable from
    /// other node subsystems without touching the coordinator itself.
    pub fn last_executed_handle(&self) -> Arc<LastExecutedBlock> {
        self.last_executed.clone()
    }

    /// The observability surface (visit counts, commits, reverts, ...).
    pub fn metrics(&self) -> Arc<CoordinatorMetrics> {
        self.metrics.clone()
    }

    pub(crate) fn main_chain(&self) -> &Arc<dyn MainChain> {
        &self.collaborators.main_chain
    }

    pub(crate) fn tx_index(&self) -> &Arc<dyn TransactionIndex> {
        &self.collaborators.tx_index
    }
}
