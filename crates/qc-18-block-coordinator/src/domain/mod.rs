//! Domain models and pure logic for the block coordinator.

pub mod ancestor_path;
pub mod entities;
pub mod exec_status;
pub mod state;
pub mod tx_tracker;

pub use ancestor_path::AncestorPathCache;
pub use entities::{
    Block, BlockDigest, DagEpochHandle, LastExecutedBlock, MerkleRoot, Proof, Slice,
    TransactionRef, VisitCounters,
};
pub use exec_status::{map_engine_state, EngineState, ExecutionView};
pub use state::CoordinatorState;
pub use tx_tracker::TransactionDigestSet;
