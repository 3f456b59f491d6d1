//! Core domain entities for the block coordinator.
//!
//! These mirror the conceptual data model: content-addressed digests, a
//! block body organized into lanes of slices, and the small set of
//! concurrency-safe containers the state machine shares with the rest of
//! the node.

use shared_types::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Opaque 32-byte content hash of a block. Equality is byte equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockDigest(pub Hash);

impl BlockDigest {
    /// The distinguished genesis digest (all-zero).
    pub const GENESIS: BlockDigest = BlockDigest([0u8; 32]);

    /// Whether this digest is the genesis sentinel.
    pub fn is_genesis(&self) -> bool {
        *self == Self::GENESIS
    }
}

impl std::fmt::Display for BlockDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0[..4] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "..")
    }
}

/// Opaque 32-byte Merkle state root produced by the state store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MerkleRoot(pub Hash);

impl MerkleRoot {
    /// The distinguished empty-state root.
    pub const GENESIS: MerkleRoot = MerkleRoot([0u8; 32]);
}

/// A single transaction as it appears inside a block slice. The coordinator
/// only ever inspects the digest; the payload is opaque to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRef {
    /// Content digest of the transaction, used to check mempool/storage
    /// availability and to mark execution status.
    pub digest: Hash,
}

/// An ordered sequence of transactions executed together as one lane-slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slice {
    /// Transactions in execution order within this slice.
    pub transactions: Vec<TransactionRef>,
}

impl Slice {
    /// Iterate the digests of every transaction in this slice.
    pub fn digests(&self) -> impl Iterator<Item = Hash> + '_ {
        self.transactions.iter().map(|tx| tx.digest)
    }
}

/// A mutable-difficulty proof attached to a block. Closed by the proof
/// miner; the coordinator never inspects its internals beyond the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    /// Current difficulty target. Lower is harder.
    pub difficulty_target: u64,
    /// Nonce or equivalent witness once the proof has been closed.
    pub closed: bool,
}

impl Proof {
    /// A fresh, unclosed proof at the given difficulty.
    pub fn new(difficulty_target: u64) -> Self {
        Self {
            difficulty_target,
            closed: false,
        }
    }
}

/// A DAG-epoch handle, present only when the optional DAG subsystem is
/// wired in. Opaque to the coordinator beyond its block_number tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DagEpochHandle(pub u64);

/// The body of a block as observed (or, while minting, owned) by the
/// coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Digest of the parent block.
    pub previous_hash: BlockDigest,
    /// This block's own digest. Zero until the proof closes it.
    pub hash: BlockDigest,
    /// Height in the chain.
    pub block_number: u64,
    /// Identity of the block's miner/proposer.
    pub miner: Hash,
    /// State root this block is claimed to produce once executed.
    pub merkle_hash: MerkleRoot,
    /// Ordered lanes of transaction slices.
    pub slices: Vec<Slice>,
    /// log2 of the number of parallel lanes this block declares.
    pub log2_num_lanes: u8,
    /// Optional DAG epoch this block is associated with.
    pub dag_epoch: Option<DagEpochHandle>,
    /// Accumulated weight used by the chain store's heaviest-tip
    /// comparator.
    pub weight: u64,
    /// Proof-of-work/consensus proof, mutable until closed.
    pub proof: Proof,
}

impl Block {
    /// Number of lanes declared by `log2_num_lanes`.
    pub fn num_lanes(&self) -> u32 {
        1u32 << self.log2_num_lanes
    }

    /// Number of slices actually present.
    pub fn num_slices(&self) -> usize {
        self.slices.len()
    }

    /// Whether this block is the genesis block (previous_hash is the
    /// genesis sentinel).
    pub fn is_genesis_child(&self) -> bool {
        self.previous_hash.is_genesis()
    }

    /// All transaction digests across every slice, in slice then
    /// within-slice order.
    pub fn all_digests(&self) -> Vec<Hash> {
        self.slices.iter().flat_map(|s| s.digests()).collect()
    }
}

/// Concurrency-safe container for the digest of the most recently
/// committed block. Readable from other node subsystems; updated only on
/// a successful commit.
#[derive(Debug, Default)]
pub struct LastExecutedBlock {
    inner: RwLock<BlockDigest>,
}

impl LastExecutedBlock {
    /// Construct the container, initialized to genesis.
    pub fn new(initial: BlockDigest) -> Self {
        Self {
            inner: RwLock::new(initial),
        }
    }

    /// Read the current last-executed digest.
    pub fn get(&self) -> BlockDigest {
        *self.inner.read().expect("last-executed lock poisoned")
    }

    /// Advance the last-executed digest. Callers must only invoke this
    /// after a successful commit (invariant 5 in the spec).
    pub fn set(&self, digest: BlockDigest) {
        *self.inner.write().expect("last-executed lock poisoned") = digest;
    }
}

impl Default for BlockDigest {
    fn default() -> Self {
        Self::GENESIS
    }
}

impl Default for MerkleRoot {
    fn default() -> Self {
        Self::GENESIS
    }
}

/// Per-state visit counters, exposed read-only to the observability
/// surface. Kept here rather than in `metrics` because they are part of
/// the coordinator's own invariants (idempotent reset relies on them
/// being monotonic, never reset to zero mid-run).
#[derive(Debug, Default)]
pub struct VisitCounters {
    counts: [AtomicU64; 16],
}

impl VisitCounters {
    /// Record a visit to the given state index.
    pub fn record(&self, index: usize) {
        self.counts[index].fetch_add(1, Ordering::Relaxed);
    }

    /// Read the visit count for the given state index.
    pub fn get(&self, index: usize) -> u64 {
        self.counts[index].load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_digest_is_distinguished() {
        assert!(BlockDigest::GENESIS.is_genesis());
        assert!(!BlockDigest([1u8; 32]).is_genesis());
    }

    #[test]
    fn num_lanes_matches_log2() {
        let mut block = sample_block();
        block.log2_num_lanes = 3;
        assert_eq!(block.num_lanes(), 8);
    }

    #[test]
    fn last_executed_block_updates() {
        let container = LastExecutedBlock::new(BlockDigest::GENESIS);
        assert!(container.get().is_genesis());
        container.set(BlockDigest([9u8; 32]));
        assert_eq!(container.get(), BlockDigest([9u8; 32]));
    }

    #[test]
    fn all_digests_flattens_slices() {
        let mut block = sample_block();
        block.slices = vec![
            Slice {
                transactions: vec![TransactionRef { digest: [1u8; 32] }],
            },
            Slice {
                transactions: vec![
                    TransactionRef { digest: [2u8; 32] },
                    TransactionRef { digest: [3u8; 32] },
                ],
            },
        ];
        assert_eq!(block.all_digests(), vec![[1u8; 32], [2u8; 32], [3u8; 32]]);
    }

    fn sample_block() -> Block {
        Block {
            previous_hash: BlockDigest::GENESIS,
            hash: BlockDigest([0u8; 32]),
            block_number: 1,
            miner: [0u8; 32],
            merkle_hash: MerkleRoot::GENESIS,
            slices: vec![],
            log2_num_lanes: 0,
            dag_epoch: None,
            weight: 1,
            proof: Proof::new(1_000),
        }
    }
}
