//! Port traits (driven side) the coordinator calls into, plus the small
//! value types their contracts exchange.

pub mod outbound;

pub use outbound::{
    AddBlockOutcome, BlockPacker, BlockSink, Dag, ExecutionEngine, MainChain, ProofMiner,
    StakeOracle, StateStore, StatusCache, SynergeticExecMgr, TransactionIndex,
    TruncationPolicy, TxStatus,
};
