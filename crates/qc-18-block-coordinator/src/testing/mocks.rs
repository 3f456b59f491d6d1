//! In-memory collaborator implementations for tests.

use crate::clock::FakeClock;
use crate::config::CoordinatorConfig;
use crate::coordinator::{Collaborators, Coordinator};
use crate::domain::{Block, BlockDigest, EngineState, MerkleRoot, Proof, Slice, TransactionRef};
use crate::error::{CoordinatorError, Result};
use crate::ports::{
    AddBlockOutcome, BlockPacker, BlockSink, Dag, ExecutionEngine, MainChain, ProofMiner,
    StakeOracle, StateStore, StatusCache, SynergeticExecMgr, TransactionIndex, TruncationPolicy,
    TxStatus,
};
use shared_types::Hash;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Build a `Block` with the given linkage, leaving everything else at
/// sensible test defaults.
pub fn block(
    number: u64,
    previous: BlockDigest,
    hash: BlockDigest,
    merkle_hash: MerkleRoot,
) -> Block {
    Block {
        previous_hash: previous,
        hash,
        block_number: number,
        miner: [0u8; 32],
        merkle_hash,
        slices: Vec::new(),
        log2_num_lanes: 0,
        dag_epoch: None,
        weight: number,
        proof: Proof::new(1),
    }
}

/// A deterministic, test-only stand-in digest for a block once its
/// proof closes — not a real hash function, just distinct per input.
pub fn synthetic_digest(block: &Block) -> BlockDigest {
    let mut bytes = [0u8; 32];
    bytes[0..8].copy_from_slice(&block.block_number.to_le_bytes());
    bytes[8..16].copy_from_slice(&block.weight.to_le_bytes());
    bytes[16] = block.previous_hash.0[0] ^ 0xAB;
    bytes[17] = block.miner[0] ^ 0xCD;
    BlockDigest(bytes)
}

/// A merkle root derived deterministically from a block number, for
/// tests that don't care about real state contents.
pub fn merkle_for(number: u64) -> MerkleRoot {
    let mut bytes = [0u8; 32];
    bytes[0..8].copy_from_slice(&number.to_le_bytes());
    MerkleRoot(bytes)
}

#[derive(Default)]
struct MainChainState {
    blocks: HashMap<BlockDigest, Block>,
    heaviest: BlockDigest,
}

/// An in-memory chain store keyed by digest.
#[derive(Clone, Default)]
pub struct InMemoryMainChain {
    state: Arc<Mutex<MainChainState>>,
}

impl InMemoryMainChain {
    /// An empty chain store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a block and make it the heaviest tip.
    pub fn insert(&self, block: Block) {
        let mut state = self.state.lock().unwrap();
        state.heaviest = block.hash;
        state.blocks.insert(block.hash, block);
    }

    /// Insert a block without disturbing the current heaviest tip.
    pub fn insert_without_retip(&self, block: Block) {
        let mut state = self.state.lock().unwrap();
        state.blocks.insert(block.hash, block);
    }

    /// Force the heaviest tip pointer.
    pub fn set_heaviest(&self, hash: BlockDigest) {
        self.state.lock().unwrap().heaviest = hash;
    }

    /// Whether a block with this digest is stored.
    pub fn contains(&self, hash: BlockDigest) -> bool {
        self.state.lock().unwrap().blocks.contains_key(&hash)
    }
}

impl MainChain for InMemoryMainChain {
    fn get_heaviest_block(&self) -> Result<Option<Block>> {
        let state = self.state.lock().unwrap();
        Ok(state.blocks.get(&state.heaviest).cloned())
    }

    fn get_heaviest_block_hash(&self) -> Result<BlockDigest> {
        Ok(self.state.lock().unwrap().heaviest)
    }

    fn get(&self, hash: BlockDigest) -> Result<Option<Block>> {
        Ok(self.state.lock().unwrap().blocks.get(&hash).cloned())
    }

    fn add_block(&self, block: Block) -> Result<AddBlockOutcome> {
        let mut state = self.state.lock().unwrap();
        if state.blocks.contains_key(&block.hash) {
            return Ok(AddBlockOutcome::AlreadyPresent);
        }
        state.heaviest = block.hash;
        state.blocks.insert(block.hash, block);
        Ok(AddBlockOutcome::Added)
    }

    fn remove_block(&self, hash: BlockDigest) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(removed) = state.blocks.remove(&hash) {
            if state.heaviest == hash {
                state.heaviest = removed.previous_hash;
            }
        }
        Ok(())
    }

    fn get_path_to_common_ancestor(
        &self,
        tip: BlockDigest,
        target: BlockDigest,
        limit: usize,
        _policy: TruncationPolicy,
    ) -> Result<Vec<Block>> {
        let state = self.state.lock().unwrap();

        let chain_from = |mut cursor: BlockDigest| -> Vec<Block> {
            let mut chain = Vec::new();
            while !cursor.is_genesis() {
                match state.blocks.get(&cursor) {
                    Some(block) => {
                        chain.push(block.clone());
                        cursor = block.previous_hash;
                    }
                    None => break,
                }
            }
            chain.reverse();
            chain
        };

        let tip_chain = chain_from(tip);
        let target_chain = chain_from(target);

        let mut common_len = 0;
        while common_len < tip_chain.len()
            && common_len < target_chain.len()
            && tip_chain[common_len].hash == target_chain[common_len].hash
        {
            common_len += 1;
        }
        if common_len == 0 {
            return Err(CoordinatorError::AncestorPathUnavailable(
                "no common ancestor found".into(),
            ));
        }

        let mut path = vec![tip_chain[common_len - 1].clone()];
        path.extend(tip_chain[common_len..].iter().cloned());
        path.truncate(limit.max(1));
        Ok(path)
    }

    fn reset(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.blocks.clear();
        state.heaviest = BlockDigest::GENESIS;
        Ok(())
    }
}

#[derive(Default)]
struct StateStoreState {
    current: MerkleRoot,
    last_commit: MerkleRoot,
    committed: HashMap<(MerkleRoot, u64), ()>,
}

/// An in-memory Merkle-versioned state store.
#[derive(Clone, Default)]
pub struct InMemoryStateStore {
    state: Arc<Mutex<StateStoreState>>,
}

impl InMemoryStateStore {
    /// A state store already holding the genesis snapshot.
    pub fn new() -> Self {
        let store = Self::default();
        store
            .state
            .lock()
            .unwrap()
            .committed
            .insert((MerkleRoot::GENESIS, 0), ());
        store
    }

    /// Test hook simulating a deterministic execution engine writing a
    /// new root into working state ahead of a commit.
    pub fn set_pending_root(&self, root: MerkleRoot) {
        self.state.lock().unwrap().current = root;
    }
}

impl StateStore for InMemoryStateStore {
    fn current_hash(&self) -> Result<MerkleRoot> {
        Ok(self.state.lock().unwrap().current)
    }

    fn last_commit_hash(&self) -> Result<MerkleRoot> {
        Ok(self.state.lock().unwrap().last_commit)
    }

    fn hash_exists(&self, root: MerkleRoot, block_number: u64) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .committed
            .contains_key(&(root, block_number)))
    }

    fn revert_to_hash(&self, root: MerkleRoot, block_number: u64) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if state.committed.contains_key(&(root, block_number)) {
            state.current = root;
            state.last_commit = root;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn commit(&self, block_number: u64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let root = state.current;
        state.committed.insert((root, block_number), ());
        state.last_commit = root;
        Ok(())
    }
}

struct ExecutionEngineState {
    state: EngineState,
    last_processed: BlockDigest,
    scheduled: Option<BlockDigest>,
    backing_store: InMemoryStateStore,
}

/// An execution engine whose completion is driven explicitly by test
/// code via [`ScriptedExecutionEngine::complete`], `stall`, or `fail`.
///
/// A real execution engine advances its own last-processed digest once
/// it finishes the block it was handed — the coordinator never tells it
/// which block just completed on the ordinary success path (§6:
/// `setLastProcessedBlock` is only called explicitly after reverts and
/// after a mint's digest is recomputed post-proof). This mock mirrors
/// that: `complete` advances `last_processed` to whatever `execute` was
/// last called with.
#[derive(Clone)]
pub struct ScriptedExecutionEngine {
    state: Arc<Mutex<ExecutionEngineState>>,
}

impl ScriptedExecutionEngine {
    /// Construct an idle engine backed by `store` (written to when a
    /// scheduled execution "completes").
    pub fn new(store: InMemoryStateStore) -> Self {
        Self {
            state: Arc::new(Mutex::new(ExecutionEngineState {
                state: EngineState::Idle,
                last_processed: BlockDigest::GENESIS,
                scheduled: None,
                backing_store: store,
            })),
        }
    }

    /// Simulate execution finishing deterministically at `root`,
    /// advancing `last_processed` to the digest of whichever block was
    /// most recently scheduled via `execute`.
    pub fn complete(&self, root: MerkleRoot) {
        let mut state = self.state.lock().unwrap();
        state.backing_store.set_pending_root(root);
        if let Some(scheduled) = state.scheduled.take() {
            state.last_processed = scheduled;
        }
        state.state = EngineState::Idle;
    }

    /// Simulate `TRANSACTIONS_UNAVAILABLE`.
    pub fn stall(&self) {
        self.state.lock().unwrap().state = EngineState::TransactionsUnavailable;
    }

    /// Simulate `FAILED`.
    pub fn fail(&self) {
        self.state.lock().unwrap().state = EngineState::Failed;
    }
}

impl ExecutionEngine for ScriptedExecutionEngine {
    fn execute(&self, block: &Block) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.state = EngineState::Active;
        state.scheduled = Some(block.hash);
        Ok(true)
    }

    fn get_state(&self) -> Result<EngineState> {
        Ok(self.state.lock().unwrap().state)
    }

    fn set_last_processed_block(&self, hash: BlockDigest) -> Result<()> {
        self.state.lock().unwrap().last_processed = hash;
        Ok(())
    }

    fn last_processed_block(&self) -> Result<BlockDigest> {
        Ok(self.state.lock().unwrap().last_processed)
    }
}

#[derive(Default)]
struct TxIndexState {
    present: HashSet<Hash>,
    solicitations: Vec<HashSet<Hash>>,
}

/// An in-memory mempool/storage transaction index.
#[derive(Clone, Default)]
pub struct InMemoryTransactionIndex {
    state: Arc<Mutex<TxIndexState>>,
}

impl InMemoryTransactionIndex {
    /// An index holding no transactions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a digest as locally present.
    pub fn insert(&self, digest: Hash) {
        self.state.lock().unwrap().present.insert(digest);
    }

    /// Every `issue_call_for_missing_txs` invocation observed so far.
    pub fn solicitations(&self) -> Vec<HashSet<Hash>> {
        self.state.lock().unwrap().solicitations.clone()
    }
}

impl TransactionIndex for InMemoryTransactionIndex {
    fn has_transaction(&self, digest: Hash) -> Result<bool> {
        Ok(self.state.lock().unwrap().present.contains(&digest))
    }

    fn issue_call_for_missing_txs(&self, missing: &HashSet<Hash>) -> Result<()> {
        self.state.lock().unwrap().solicitations.push(missing.clone());
        Ok(())
    }
}

/// A block packer that fills a single configured slice of transactions.
#[derive(Clone, Default)]
pub struct SimpleBlockPacker {
    transactions: Arc<Mutex<Vec<TransactionRef>>>,
}

impl SimpleBlockPacker {
    /// A packer that produces an empty block unless configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the digests the next packed block should carry.
    pub fn set_transactions(&self, transactions: Vec<TransactionRef>) {
        *self.transactions.lock().unwrap() = transactions;
    }
}

impl BlockPacker for SimpleBlockPacker {
    fn generate_block(
        &self,
        next_block: &mut Block,
        num_lanes: u32,
        num_slices: usize,
    ) -> Result<()> {
        next_block.log2_num_lanes = num_lanes.trailing_zeros() as u8;
        let txs = self.transactions.lock().unwrap().clone();
        next_block.slices = (0..num_slices)
            .map(|i| Slice {
                transactions: if i == 0 { txs.clone() } else { Vec::new() },
            })
            .collect();
        Ok(())
    }
}

/// A block sink that records every block it observes.
#[derive(Clone, Default)]
pub struct RecordingBlockSink {
    blocks: Arc<Mutex<Vec<Block>>>,
}

impl RecordingBlockSink {
    /// A sink that has observed nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every block observed so far, in order.
    pub fn received(&self) -> Vec<Block> {
        self.blocks.lock().unwrap().clone()
    }
}

impl BlockSink for RecordingBlockSink {
    fn on_block(&self, block: &Block) -> Result<()> {
        self.blocks.lock().unwrap().push(block.clone());
        Ok(())
    }
}

/// A status cache that records every update it receives.
#[derive(Clone, Default)]
pub struct RecordingStatusCache {
    updates: Arc<Mutex<Vec<(Hash, TxStatus)>>>,
}

impl RecordingStatusCache {
    /// A cache that has recorded nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every update observed so far, in order.
    pub fn updates(&self) -> Vec<(Hash, TxStatus)> {
        self.updates.lock().unwrap().clone()
    }
}

impl StatusCache for RecordingStatusCache {
    fn update(&self, digest: Hash, status: TxStatus) -> Result<()> {
        self.updates.lock().unwrap().push((digest, status));
        Ok(())
    }
}

/// A proof miner that fails `attempts_required` times before succeeding,
/// so tests can exercise `PROOF_SEARCH`'s self-loop.
#[derive(Clone)]
pub struct ScriptedProofMiner {
    remaining: Arc<Mutex<u64>>,
}

impl ScriptedProofMiner {
    /// A miner that succeeds on its `attempts_required + 1`-th call.
    pub fn new(attempts_required: u64) -> Self {
        Self {
            remaining: Arc::new(Mutex::new(attempts_required)),
        }
    }
}

impl ProofMiner for ScriptedProofMiner {
    fn mine(&self, block: &mut Block, _attempt_budget: u64) -> Result<bool> {
        let mut remaining = self.remaining.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Ok(false);
        }
        block.proof.closed = true;
        block.hash = synthetic_digest(block);
        Ok(true)
    }
}

/// A stake oracle that always permits minting, reports a fixed weight,
/// and records every `update_current_block` notification.
#[derive(Clone, Default)]
pub struct PermissiveStakeOracle {
    notifications: Arc<Mutex<Vec<BlockDigest>>>,
    permit_mint: Arc<Mutex<bool>>,
}

impl PermissiveStakeOracle {
    /// An oracle that permits minting by default.
    pub fn new() -> Self {
        let oracle = Self::default();
        *oracle.permit_mint.lock().unwrap() = true;
        oracle
    }

    /// Toggle whether `should_generate_block` permits minting.
    pub fn set_permit_mint(&self, permit: bool) {
        *self.permit_mint.lock().unwrap() = permit;
    }

    /// Every block digest `update_current_block` was called with, in
    /// order (genesis digest when the coordinator had no block to
    /// report).
    pub fn notifications(&self) -> Vec<BlockDigest> {
        self.notifications.lock().unwrap().clone()
    }
}

impl StakeOracle for PermissiveStakeOracle {
    fn should_generate_block(&self, _previous: BlockDigest, _miner: Hash) -> Result<bool> {
        Ok(*self.permit_mint.lock().unwrap())
    }

    fn valid_miner_for_block(&self, _previous: BlockDigest, _miner: Hash) -> Result<bool> {
        Ok(true)
    }

    fn get_block_generation_weight(&self, _previous: BlockDigest, _miner: Hash) -> Result<u64> {
        Ok(1)
    }

    fn update_current_block(&self, block: &Block) -> Result<()> {
        self.notifications.lock().unwrap().push(block.hash);
        Ok(())
    }
}

/// A synergetic-work manager that always prepares and validates
/// successfully, recording what it was asked to do.
#[derive(Clone, Default)]
pub struct AlwaysValidSynergeticExecMgr {
    prepared: Arc<Mutex<Vec<(BlockDigest, BlockDigest)>>>,
}

impl AlwaysValidSynergeticExecMgr {
    /// A manager that accepts every block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(current, previous)` digest pair `prepare_work_queue` was
    /// called with.
    pub fn prepared(&self) -> Vec<(BlockDigest, BlockDigest)> {
        self.prepared.lock().unwrap().clone()
    }
}

impl SynergeticExecMgr for AlwaysValidSynergeticExecMgr {
    fn prepare_work_queue(&self, current: &Block, previous: &Block) -> Result<()> {
        self.prepared
            .lock()
            .unwrap()
            .push((current.hash, previous.hash));
        Ok(())
    }

    fn validate_work_and_update_state(&self, _block_number: u64, _num_lanes: u32) -> Result<bool> {
        Ok(true)
    }
}

#[derive(Default)]
struct DagState {
    epochs: HashMap<u64, crate::domain::DagEpochHandle>,
    satisfied: HashSet<u64>,
}

/// An in-memory DAG-epoch subsystem.
#[derive(Clone, Default)]
pub struct InMemoryDag {
    state: Arc<Mutex<DagState>>,
}

impl InMemoryDag {
    /// A DAG with no epochs created yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the epoch for `block_number` as satisfied.
    pub fn satisfy(&self, block_number: u64) {
        self.state.lock().unwrap().satisfied.insert(block_number);
    }
}

impl Dag for InMemoryDag {
    fn current_epoch(&self) -> Result<Option<crate::domain::DagEpochHandle>> {
        Ok(None)
    }

    fn create_epoch(&self, block_number: u64) -> Result<crate::domain::DagEpochHandle> {
        let handle = crate::domain::DagEpochHandle(block_number);
        self.state.lock().unwrap().epochs.insert(block_number, handle);
        Ok(handle)
    }

    fn satisfy_epoch(&self, epoch: crate::domain::DagEpochHandle) -> Result<bool> {
        Ok(self.state.lock().unwrap().satisfied.contains(&epoch.0))
    }

    fn revert_to_epoch(&self, _block_number: u64) -> Result<bool> {
        Ok(true)
    }

    fn commit_epoch(&self, _epoch: crate::domain::DagEpochHandle) -> Result<()> {
        Ok(())
    }
}

/// Bundles one of every mock collaborator plus a [`FakeClock`], and
/// builds fully-wired [`Coordinator`]s from them.
#[derive(Clone)]
pub struct MockHarness {
    /// Shared, test-driven clock.
    pub clock: FakeClock,
    /// Chain store.
    pub main_chain: InMemoryMainChain,
    /// State store.
    pub state_store: InMemoryStateStore,
    /// Execution engine.
    pub execution_engine: ScriptedExecutionEngine,
    /// Transaction index.
    pub tx_index: InMemoryTransactionIndex,
    /// Block packer.
    pub packer: SimpleBlockPacker,
    /// Block sink.
    pub sink: RecordingBlockSink,
    /// Status cache.
    pub status_cache: RecordingStatusCache,
    /// Proof miner.
    pub proof_miner: ScriptedProofMiner,
    /// Stake oracle.
    pub stake_oracle: PermissiveStakeOracle,
}

impl MockHarness {
    /// A harness with every collaborator at its permissive default, a
    /// fresh clock, and an immediate-success proof miner.
    pub fn new() -> Self {
        let state_store = InMemoryStateStore::new();
        Self {
            clock: FakeClock::new(),
            main_chain: InMemoryMainChain::new(),
            execution_engine: ScriptedExecutionEngine::new(state_store.clone()),
            state_store,
            tx_index: InMemoryTransactionIndex::new(),
            packer: SimpleBlockPacker::new(),
            sink: RecordingBlockSink::new(),
            status_cache: RecordingStatusCache::new(),
            proof_miner: ScriptedProofMiner::new(0),
            stake_oracle: PermissiveStakeOracle::new(),
        }
    }

    /// Build a `Coordinator` wired to this harness's collaborators,
    /// with the stake oracle present but no synergetic-work manager or
    /// DAG configured.
    pub fn coordinator(&self, config: CoordinatorConfig) -> Coordinator {
        self.coordinator_with_mining_identity(config, [7u8; 32])
    }

    /// As [`MockHarness::coordinator`], with an explicit mining
    /// identity.
    pub fn coordinator_with_mining_identity(
        &self,
        config: CoordinatorConfig,
        mining_identity: Hash,
    ) -> Coordinator {
        let collaborators = Collaborators {
            main_chain: Arc::new(self.main_chain.clone()),
            state_store: Arc::new(self.state_store.clone()),
            execution_engine: Arc::new(self.execution_engine.clone()),
            tx_index: Arc::new(self.tx_index.clone()),
            packer: Arc::new(self.packer.clone()),
            sink: Arc::new(self.sink.clone()),
            status_cache: Arc::new(self.status_cache.clone()),
            proof_miner: Arc::new(self.proof_miner.clone()),
            stake_oracle: Some(Arc::new(self.stake_oracle.clone())),
            synergetic: None,
            dag: None,
        };
        Coordinator::with_clock(collaborators, config, mining_identity, Arc::new(self.clock.clone()))
    }
}

impl Default for MockHarness {
    fn default() -> Self {
        Self::new()
    }
}
