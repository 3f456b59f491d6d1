//! Maps the execution engine's raw reported states onto the simplified
//! lifecycle the coordinator reasons about.

/// Raw state as reported by the execution engine collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No block scheduled, ready to accept one.
    Idle,
    /// Currently executing a scheduled block.
    Active,
    /// Execution is blocked on transactions it does not have.
    TransactionsUnavailable,
    /// Execution was aborted.
    Aborted,
    /// Execution failed.
    Failed,
}

/// The coordinator's simplified view of execution progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionView {
    /// Nothing is executing.
    Idle,
    /// A block is executing normally.
    Running,
    /// Execution is blocked (treated the same as an error by the state
    /// machine: RESET).
    Stalled,
    /// Execution failed or was aborted.
    Error,
}

/// Map a raw engine state onto the coordinator's view, per §4.2.
pub fn map_engine_state(state: EngineState) -> ExecutionView {
    match state {
        EngineState::Idle => ExecutionView::Idle,
        EngineState::Active => ExecutionView::Running,
        EngineState::TransactionsUnavailable => ExecutionView::Stalled,
        EngineState::Aborted | EngineState::Failed => ExecutionView::Error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_engine_state_maps_to_exactly_one_view() {
        assert_eq!(map_engine_state(EngineState::Idle), ExecutionView::Idle);
        assert_eq!(
            map_engine_state(EngineState::Active),
            ExecutionView::Running
        );
        assert_eq!(
            map_engine_state(EngineState::TransactionsUnavailable),
            ExecutionView::Stalled
        );
        assert_eq!(
            map_engine_state(EngineState::Aborted),
            ExecutionView::Error
        );
        assert_eq!(map_engine_state(EngineState::Failed), ExecutionView::Error);
    }
}
