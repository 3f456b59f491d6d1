//! # qc-18-block-coordinator
//!
//! The Block Coordinator: the fifteen-state orchestration hub that
//! drives a node through chain reconciliation, transaction
//! synchronization, speculative execution, state commitment, and
//! (optionally) block production.
//!
//! This crate defines the narrow outbound port traits it needs from the
//! rest of the node (chain store, state store, execution engine,
//! mempool, packer, stake oracle, synergetic-work manager, DAG,
//! telemetry) and ships a single-threaded cooperative driver that never
//! blocks its host thread — every potentially long wait is decomposed
//! into "check, yield with a requested delay, re-enter" (see
//! [`driver`]).
//!
//! ```text
//!          ┌───────────────┐
//!          │  RELOAD_STATE │
//!          └───────┬───────┘
//!                  ▼
//!  ┌────────►  RESET ───────────► SYNCHRONISING ──► SYNCHRONISED ──┐
//!  │                                    │                          │
//!  │                                    ▼                          │ (mining)
//!  │                      PRE_EXEC_BLOCK_VALIDATION                ▼
//!  │                                    │                NEW_SYNERGETIC_EXECUTION
//!  │                                    ▼                          │
//!  │                      WAIT_FOR_TRANSACTIONS                   PACK_NEW_BLOCK
//!  │                                    │                          │
//!  │                                    ▼                          ▼
//!  │                      SYNERGETIC_EXECUTION          EXECUTE_NEW_BLOCK
//!  │                                    │                          │
//!  │                                    ▼                          ▼
//!  │                      SCHEDULE_BLOCK_EXECUTION    WAIT_FOR_NEW_BLOCK_EXECUTION
//!  │                                    │                          │
//!  │                                    ▼                          ▼
//!  │                      WAIT_FOR_EXECUTION                PROOF_SEARCH (loops)
//!  │                                    │                          │
//!  │                                    ▼                          ▼
//!  └──────────────────── POST_EXEC_BLOCK_VALIDATION    TRANSMIT_BLOCK
//! ```
//!
//! ## Logging, errors, config
//!
//! Every handler logs through `tracing` (debug on routine transitions,
//! warn on collaborator failures), tagged `[qc-18]` matching the rest
//! of this workspace's subsystem crates. Collaborator failures surface
//! as [`CoordinatorError`] (via [`error::Result`]); the state machine
//! itself never propagates an error across a transition — every `Err`
//! downgrades to a logged `RESET` (§7 of the design notes). Tunables
//! live in [`CoordinatorConfig`], a plain `Default`-able struct meant to
//! nest inside a parent node configuration.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod driver;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod ports;
pub mod testing;
pub mod timers;

pub use clock::{Clock, FakeClock, PeriodicGate, SystemClock};
pub use config::CoordinatorConfig;
pub use coordinator::{Collaborators, Coordinator};
pub use domain::{
    AncestorPathCache, Block, BlockDigest, CoordinatorState, DagEpochHandle, EngineState,
    ExecutionView, LastExecutedBlock, MerkleRoot, Proof, Slice, TransactionDigestSet,
    TransactionRef, VisitCounters,
};
pub use driver::{run, StopSignal};
pub use error::{CoordinatorError, Result};
pub use handlers::StepOutcome;
pub use metrics::{CounterHandle, CoordinatorMetrics, MetricsRegistry};
pub use timers::DeadlineTimer;

#[cfg(feature = "async-driver")]
pub use driver::run_async;

/// Subsystem identifier used in log line prefixes and telemetry
/// registration, matching the `qc-NN` convention of the sibling
/// subsystem crates in this workspace.
pub const SUBSYSTEM_ID: u8 = 18;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsystem_id_matches_crate_name() {
        assert_eq!(SUBSYSTEM_ID, 18);
    }
}
