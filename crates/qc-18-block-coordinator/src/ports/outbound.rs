//! Outbound port traits the coordinator calls into.
//!
//! All synchronous: the driver is a single-threaded cooperative loop and
//! never awaits inside a handler (§5). Crates composing the coordinator
//! into an async runtime (e.g. `node-runtime`) wrap these with blocking
//! adapters rather than the coordinator depending on `async_trait`
//! itself, mirroring how `qc-17-block-production::ports` separates its
//! async service trait from the coordinator's own synchronous core.

use crate::domain::{
    Block, BlockDigest, DagEpochHandle, EngineState, MerkleRoot,
};
use crate::error::Result;
use shared_types::Hash;
use std::collections::HashSet;

/// Outcome of `MainChain::add_block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddBlockOutcome {
    /// The block was appended to the chain.
    Added,
    /// The block was already present; not an error.
    AlreadyPresent,
    /// The chain store rejected the block outright.
    Rejected,
}

/// Truncation policy for a bounded ancestor-path lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationPolicy {
    /// When the path exceeds the limit, keep the end closest to the
    /// target (the tip) and drop the oldest entries.
    ReturnLeastRecent,
}

/// The persistent main-chain store and its path-to-ancestor index.
pub trait MainChain: Send + Sync {
    /// The current heaviest tip, if any block has been stored.
    fn get_heaviest_block(&self) -> Result<Option<Block>>;

    /// Digest of the current heaviest tip.
    fn get_heaviest_block_hash(&self) -> Result<BlockDigest>;

    /// Look a block up by its digest.
    fn get(&self, hash: BlockDigest) -> Result<Option<Block>>;

    /// Append a block to the chain.
    fn add_block(&self, block: Block) -> Result<AddBlockOutcome>;

    /// Remove a block (and anything that depends on it) from the chain.
    fn remove_block(&self, hash: BlockDigest) -> Result<()>;

    /// Fetch the ordered path from `target` back to `tip`'s common
    /// ancestor, oldest-first, bounded by `limit` entries and truncated
    /// per `policy` when the true path is longer.
    fn get_path_to_common_ancestor(
        &self,
        tip: BlockDigest,
        target: BlockDigest,
        limit: usize,
        policy: TruncationPolicy,
    ) -> Result<Vec<Block>>;

    /// Drop the chain store back to its initial (genesis-only) state.
    fn reset(&self) -> Result<()>;
}

/// The Merkle-versioned state store.
pub trait StateStore: Send + Sync {
    /// The root of the state as currently applied.
    fn current_hash(&self) -> Result<MerkleRoot>;

    /// The root as of the last `commit`.
    fn last_commit_hash(&self) -> Result<MerkleRoot>;

    /// Whether a committed snapshot exists at `(root, block_number)`.
    fn hash_exists(&self, root: MerkleRoot, block_number: u64) -> Result<bool>;

    /// Revert the working state to a previously committed snapshot.
    /// Returns whether the revert succeeded.
    fn revert_to_hash(&self, root: MerkleRoot, block_number: u64) -> Result<bool>;

    /// Commit the current working state as the snapshot for
    /// `block_number`.
    fn commit(&self, block_number: u64) -> Result<()>;
}

/// The deterministic transaction execution engine.
pub trait ExecutionEngine: Send + Sync {
    /// Schedule a block body for execution. Returns whether scheduling
    /// succeeded (maps to the raw `SCHEDULED` outcome; any other raw
    /// outcome is reported as `Ok(false)`, never an error, since
    /// scheduling rejection is an ordinary RESET-worthy condition).
    fn execute(&self, block: &Block) -> Result<bool>;

    /// The engine's current raw lifecycle state.
    fn get_state(&self) -> Result<EngineState>;

    /// Overwrite the digest the engine considers last-processed, used
    /// after reverts and after a mint's digest is recomputed post-proof.
    fn set_last_processed_block(&self, hash: BlockDigest) -> Result<()>;

    /// The digest the engine considers last-processed.
    fn last_processed_block(&self) -> Result<BlockDigest>;
}

/// The mempool/storage transaction index, including peer solicitation.
pub trait TransactionIndex: Send + Sync {
    /// Whether a transaction with this digest is present locally.
    fn has_transaction(&self, digest: Hash) -> Result<bool>;

    /// Ask peers for every digest in `missing` that is not yet local.
    fn issue_call_for_missing_txs(&self, missing: &HashSet<Hash>) -> Result<()>;
}

/// The block packer's selection heuristic.
pub trait BlockPacker: Send + Sync {
    /// Fill in `next_block`'s slices from currently available
    /// transactions. Implementations may fail (e.g. no candidates, a
    /// downstream panic caught at the boundary); any failure maps to
    /// `Err` and the coordinator treats it as a transient failure
    /// (§7b).
    fn generate_block(
        &self,
        next_block: &mut Block,
        num_lanes: u32,
        num_slices: usize,
    ) -> Result<()>;
}

/// Where completed blocks are broadcast.
pub trait BlockSink: Send + Sync {
    /// Observe a block that has just been added to the chain.
    fn on_block(&self, block: &Block) -> Result<()>;
}

/// A transaction's lifecycle status as tracked by the status cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    /// Included in a block whose execution has committed.
    Executed,
}

/// Per-transaction execution status updates.
pub trait StatusCache: Send + Sync {
    /// Update a transaction's tracked status.
    fn update(&self, digest: Hash, status: TxStatus) -> Result<()>;
}

/// Optional stake/consensus weight oracle. When absent, the coordinator
/// falls back to always-permit-mint with a default weight.
pub trait StakeOracle: Send + Sync {
    /// Whether this node may mint a block on top of `previous`.
    fn should_generate_block(&self, previous: BlockDigest, miner: Hash) -> Result<bool>;

    /// Whether `miner` was a valid proposer for a block built on
    /// `previous`.
    fn valid_miner_for_block(&self, previous: BlockDigest, miner: Hash) -> Result<bool>;

    /// The weight a block minted by `miner` on top of `previous` should
    /// carry.
    fn get_block_generation_weight(&self, previous: BlockDigest, miner: Hash) -> Result<u64>;

    /// Notify the oracle which block the coordinator just finished
    /// processing (committed, rejected, or minted).
    fn update_current_block(&self, block: &Block) -> Result<()>;
}

/// Optional off-chain work validator.
pub trait SynergeticExecMgr: Send + Sync {
    /// Prepare a work queue from the current block and its declared
    /// parent, ahead of execution.
    fn prepare_work_queue(&self, current: &Block, previous: &Block) -> Result<()>;

    /// Validate the prepared work and fold its effects into state.
    fn validate_work_and_update_state(&self, block_number: u64, num_lanes: u32) -> Result<bool>;
}

/// Optional DAG-epoch subsystem.
pub trait Dag: Send + Sync {
    /// The epoch currently active, if any.
    fn current_epoch(&self) -> Result<Option<DagEpochHandle>>;

    /// Allocate a fresh epoch handle for `block_number`.
    fn create_epoch(&self, block_number: u64) -> Result<DagEpochHandle>;

    /// Whether every node required by `epoch` has arrived.
    fn satisfy_epoch(&self, epoch: DagEpochHandle) -> Result<bool>;

    /// Revert to the epoch recorded for `block_number`.
    fn revert_to_epoch(&self, block_number: u64) -> Result<bool>;

    /// Commit `epoch` as finalized.
    fn commit_epoch(&self, epoch: DagEpochHandle) -> Result<()>;
}

/// The cooperative proof-search collaborator.
pub trait ProofMiner: Send + Sync {
    /// Attempt to close `block`'s proof within `attempt_budget` tries.
    /// Returns whether a proof was found; on success the implementation
    /// must set `block.proof.closed` and recompute `block.hash` (the
    /// content digest is undefined until the proof, which the digest
    /// covers, has been closed).
    fn mine(&self, block: &mut Block, attempt_budget: u64) -> Result<bool>;
}
