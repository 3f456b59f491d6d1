//! Error types for the block coordinator.

use thiserror::Error;

/// Result type alias for block coordinator operations.
pub type Result<T> = std::result::Result<T, CoordinatorError>;

/// Errors a port collaborator can report back to the driver. The driver
/// never propagates these across a state transition (§7 of the design
/// notes) — every handler maps an `Err` to a logged `RESET`.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The main-chain store could not service a request.
    #[error("main chain error: {0}")]
    MainChain(String),

    /// The state store could not service a request.
    #[error("state store error: {0}")]
    StateStore(String),

    /// The execution engine could not service a request.
    #[error("execution engine error: {0}")]
    ExecutionEngine(String),

    /// The block packer failed to produce a block template.
    #[error("block packer error: {0}")]
    BlockPacker(String),

    /// The optional synergetic-work manager rejected or failed to
    /// prepare a work queue.
    #[error("synergetic execution error: {0}")]
    SynergeticExecution(String),

    /// The optional DAG-epoch subsystem failed an operation.
    #[error("dag epoch error: {0}")]
    Dag(String),

    /// The stake/consensus weight oracle failed an operation.
    #[error("stake oracle error: {0}")]
    StakeOracle(String),

    /// A requested ancestor path was unavailable or malformed.
    #[error("ancestor path lookup failed: {0}")]
    AncestorPathUnavailable(String),

    /// A structural block validation rule was violated.
    #[error("block validation failed: {0}")]
    BlockValidation(String),

    /// An internal invariant was violated; always a bug if observed.
    #[error("internal invariant violated: {0}")]
    InvariantViolated(String),
}

impl CoordinatorError {
    /// Whether this error represents a transient external failure that
    /// is expected to clear up on retry after a `RESET` (taxonomy class
    /// (b) in §7), as opposed to a structural rejection of the block
    /// itself.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CoordinatorError::MainChain(_)
                | CoordinatorError::StateStore(_)
                | CoordinatorError::ExecutionEngine(_)
                | CoordinatorError::BlockPacker(_)
                | CoordinatorError::AncestorPathUnavailable(_)
        )
    }

    /// Whether this error indicates the block itself is invalid and
    /// should be purged from the chain rather than merely retried.
    pub fn is_structural_rejection(&self) -> bool {
        matches!(
            self,
            CoordinatorError::BlockValidation(_) | CoordinatorError::SynergeticExecution(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_distinguished_from_structural() {
        assert!(CoordinatorError::StateStore("timeout".into()).is_transient());
        assert!(!CoordinatorError::StateStore("timeout".into()).is_structural_rejection());

        assert!(CoordinatorError::BlockValidation("bad miner".into()).is_structural_rejection());
        assert!(!CoordinatorError::BlockValidation("bad miner".into()).is_transient());
    }
}
