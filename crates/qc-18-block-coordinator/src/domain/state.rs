//! The fifteen-state tag enumeration driving the coordinator.

/// One of the coordinator's states. The initial state is `ReloadState`;
/// there is no terminal state — the machine loops through
/// `Synchronising`/`Synchronised` forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinatorState {
    /// Startup recovery.
    ReloadState,
    /// Clears per-cycle fields and returns to synchronising.
    Reset,
    /// Catch up to the heaviest tip.
    Synchronising,
    /// Idle when the tip is executed; may branch to minting.
    Synchronised,
    /// Structural validation of the current block.
    PreExecBlockValidation,
    /// Gate on mempool/transaction availability.
    WaitForTransactions,
    /// Optional pre-execution work validation.
    SynergeticExecution,
    /// Hand the current block to the execution engine.
    ScheduleBlockExecution,
    /// Poll the execution engine's status.
    WaitForExecution,
    /// Verify the resulting Merkle root.
    PostExecBlockValidation,
    /// Mint pipeline: optional pre-step before packing.
    NewSynergeticExecution,
    /// Invoke the block packer.
    PackNewBlock,
    /// Schedule the minted block's execution.
    ExecuteNewBlock,
    /// Poll, then capture the minted block's Merkle root.
    WaitForNewBlockExecution,
    /// Cooperative proof search in bounded slices.
    ProofSearch,
    /// Add the minted block to the chain and broadcast it.
    TransmitBlock,
}

impl CoordinatorState {
    /// Stable index into the sixteen-slot visit-counter array, used by
    /// the observability surface.
    pub fn index(self) -> usize {
        match self {
            CoordinatorState::ReloadState => 0,
            CoordinatorState::Reset => 1,
            CoordinatorState::Synchronising => 2,
            CoordinatorState::Synchronised => 3,
            CoordinatorState::PreExecBlockValidation => 4,
            CoordinatorState::WaitForTransactions => 5,
            CoordinatorState::SynergeticExecution => 6,
            CoordinatorState::ScheduleBlockExecution => 7,
            CoordinatorState::WaitForExecution => 8,
            CoordinatorState::PostExecBlockValidation => 9,
            CoordinatorState::NewSynergeticExecution => 10,
            CoordinatorState::PackNewBlock => 11,
            CoordinatorState::ExecuteNewBlock => 12,
            CoordinatorState::WaitForNewBlockExecution => 13,
            CoordinatorState::ProofSearch => 14,
            CoordinatorState::TransmitBlock => 15,
        }
    }

    /// Short tag used in log lines, mirroring the `[qc-NN]` prefix
    /// convention used across this workspace's subsystem crates.
    pub fn tag(self) -> &'static str {
        match self {
            CoordinatorState::ReloadState => "RELOAD_STATE",
            CoordinatorState::Reset => "RESET",
            CoordinatorState::Synchronising => "SYNCHRONISING",
            CoordinatorState::Synchronised => "SYNCHRONISED",
            CoordinatorState::PreExecBlockValidation => "PRE_EXEC_BLOCK_VALIDATION",
            CoordinatorState::WaitForTransactions => "WAIT_FOR_TRANSACTIONS",
            CoordinatorState::SynergeticExecution => "SYNERGETIC_EXECUTION",
            CoordinatorState::ScheduleBlockExecution => "SCHEDULE_BLOCK_EXECUTION",
            CoordinatorState::WaitForExecution => "WAIT_FOR_EXECUTION",
            CoordinatorState::PostExecBlockValidation => "POST_EXEC_BLOCK_VALIDATION",
            CoordinatorState::NewSynergeticExecution => "NEW_SYNERGETIC_EXECUTION",
            CoordinatorState::PackNewBlock => "PACK_NEW_BLOCK",
            CoordinatorState::ExecuteNewBlock => "EXECUTE_NEW_BLOCK",
            CoordinatorState::WaitForNewBlockExecution => "WAIT_FOR_NEW_BLOCK_EXECUTION",
            CoordinatorState::ProofSearch => "PROOF_SEARCH",
            CoordinatorState::TransmitBlock => "TRANSMIT_BLOCK",
        }
    }
}

impl std::fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_state_has_a_unique_index() {
        let states = [
            CoordinatorState::ReloadState,
            CoordinatorState::Reset,
            CoordinatorState::Synchronising,
            CoordinatorState::Synchronised,
            CoordinatorState::PreExecBlockValidation,
            CoordinatorState::WaitForTransactions,
            CoordinatorState::SynergeticExecution,
            CoordinatorState::ScheduleBlockExecution,
            CoordinatorState::WaitForExecution,
            CoordinatorState::PostExecBlockValidation,
            CoordinatorState::NewSynergeticExecution,
            CoordinatorState::PackNewBlock,
            CoordinatorState::ExecuteNewBlock,
            CoordinatorState::WaitForNewBlockExecution,
            CoordinatorState::ProofSearch,
            CoordinatorState::TransmitBlock,
        ];
        let mut seen = std::collections::HashSet::new();
        for state in states {
            assert!(seen.insert(state.index()), "duplicate index for {state}");
        }
        assert_eq!(seen.len(), 16);
    }
}
