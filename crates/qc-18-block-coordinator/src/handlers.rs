//! The fifteen-state handler table (§4.1). Each `handle_*` method is a
//! pure function of `self` plus collaborator observations: it mutates
//! coordinator-owned fields and returns the next state plus an optional
//! re-entry delay. No handler blocks; every wait is "check, yield with
//! delay, re-enter".

use crate::coordinator::Coordinator;
use crate::domain::{
    map_engine_state, Block, BlockDigest, CoordinatorState, ExecutionView, MerkleRoot, Proof,
    TransactionDigestSet,
};
use crate::ports::{AddBlockOutcome, TruncationPolicy, TxStatus};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Next state plus the delay the driver should honor before calling
/// [`Coordinator::step`] again.
pub struct StepOutcome {
    /// The state the coordinator was in before this step.
    pub previous: CoordinatorState,
    /// The state the coordinator transitioned to.
    pub next: CoordinatorState,
    /// How long the driver should wait before the next `step`, if any.
    pub delay: Option<Duration>,
}

impl Coordinator {
    /// Run one state-machine step. Never blocks.
    pub fn step(&mut self) -> StepOutcome {
        let previous = self.state;
        self.metrics.record_visit(previous);

        let (next, delay) = match previous {
            CoordinatorState::ReloadState => self.handle_reload_state(),
            CoordinatorState::Reset => self.handle_reset(),
            CoordinatorState::Synchronising => self.handle_synchronising(),
            CoordinatorState::Synchronised => self.handle_synchronised(),
            CoordinatorState::PreExecBlockValidation => self.handle_pre_exec_validation(),
            CoordinatorState::WaitForTransactions => self.handle_wait_for_transactions(previous),
            CoordinatorState::SynergeticExecution => self.handle_synergetic_execution(),
            CoordinatorState::ScheduleBlockExecution => self.handle_schedule_block_execution(),
            CoordinatorState::WaitForExecution => self.handle_wait_for_execution(),
            CoordinatorState::PostExecBlockValidation => self.handle_post_exec_validation(),
            CoordinatorState::NewSynergeticExecution => self.handle_new_synergetic_execution(),
            CoordinatorState::PackNewBlock => self.handle_pack_new_block(),
            CoordinatorState::ExecuteNewBlock => self.handle_execute_new_block(),
            CoordinatorState::WaitForNewBlockExecution => {
                self.handle_wait_for_new_block_execution()
            }
            CoordinatorState::ProofSearch => self.handle_proof_search(),
            CoordinatorState::TransmitBlock => self.handle_transmit_block(),
        };

        if next != previous {
            debug!(from = previous.tag(), to = next.tag(), "[qc-18] transition");
        }
        self.state = next;
        StepOutcome {
            previous,
            next,
            delay,
        }
    }

    /// Remove a block from the chain and count the rejection. Used by
    /// every structural-rejection and timeout error path (§7a, §7e).
    pub(crate) fn reject_current_block(&self, block: &Block, reason: &str) {
        warn!(hash = %block.hash, reason, "[qc-18] rejecting block");
        if let Err(err) = self.main_chain().remove_block(block.hash) {
            warn!(hash = %block.hash, %err, "[qc-18] failed to remove rejected block");
        }
        self.metrics.record_block_rejected();
    }

    fn handle_reload_state(&mut self) -> (CoordinatorState, Option<Duration>) {
        match self.main_chain().get_heaviest_block() {
            Ok(Some(block)) => {
                if !block.is_genesis_child() {
                    match self
                        .collaborators
                        .state_store
                        .revert_to_hash(block.merkle_hash, block.block_number)
                    {
                        Ok(true) => {
                            if let Err(err) = self
                                .collaborators
                                .execution_engine
                                .set_last_processed_block(block.hash)
                            {
                                warn!(%err, "[qc-18] reload: failed to set last-processed digest");
                            }
                            self.last_executed.set(block.hash);
                        }
                        Ok(false) => {
                            warn!(hash = %block.hash, "[qc-18] reload: revert to heaviest block failed");
                        }
                        Err(err) => warn!(%err, "[qc-18] reload: state store revert failed"),
                    }
                }
                self.current_block = Some(block);
            }
            Ok(None) => debug!("[qc-18] reload: no heaviest block yet, starting from genesis"),
            Err(err) => warn!(%err, "[qc-18] reload: failed to fetch heaviest block"),
        }
        (CoordinatorState::Reset, None)
    }

    fn handle_reset(&mut self) -> (CoordinatorState, Option<Duration>) {
        self.metrics.record_reset();
        if let Some(oracle) = &self.collaborators.stake_oracle {
            if let Some(block) = self.next_block.as_ref().or(self.current_block.as_ref()) {
                if let Err(err) = oracle.update_current_block(block) {
                    warn!(%err, "[qc-18] reset: stake oracle notification failed");
                }
            }
        }
        self.current_block = None;
        self.next_block = None;
        self.pending_txs = None;
        self.ancestor_path.clear();
        self.asked_peers = false;
        self.ask_peers_timer.disarm();
        self.overall_tx_timeout.disarm();
        self.next_block_time = self.clock.now() + self.config.block_period;
        (CoordinatorState::Synchronising, None)
    }

    fn handle_synchronising(&mut self) -> (CoordinatorState, Option<Duration>) {
        if self.current_block.is_none() {
            match self.main_chain().get_heaviest_block() {
                Ok(block) => self.current_block = block,
                Err(err) => {
                    warn!(%err, "[qc-18] synchronising: failed to fetch heaviest block");
                    return (CoordinatorState::Reset, None);
                }
            }
        }

        let current = match &self.current_block {
            Some(block) if !block.hash.is_genesis() => block.clone(),
            _ => {
                if self.info_gate.check(self.clock.now()) {
                    info!("[qc-18] synchronising: heaviest tip empty or hashless");
                }
                return (CoordinatorState::Reset, Some(self.config.empty_tip_retry_delay));
            }
        };

        let last_processed = match self.collaborators.execution_engine.last_processed_block() {
            Ok(hash) => hash,
            Err(err) => {
                warn!(%err, "[qc-18] synchronising: failed to read last-processed digest");
                return (CoordinatorState::Reset, None);
            }
        };

        if last_processed.is_genesis() {
            if current.previous_hash.is_genesis() {
                return (CoordinatorState::PreExecBlockValidation, None);
            }
            return match self.main_chain().get(current.previous_hash) {
                Ok(Some(parent)) => {
                    self.current_block = Some(parent);
                    (CoordinatorState::Synchronising, None)
                }
                Ok(None) => (CoordinatorState::Reset, None),
                Err(err) => {
                    warn!(%err, "[qc-18] synchronising: failed to fetch parent block");
                    (CoordinatorState::Reset, None)
                }
            };
        }

        if current.hash == last_processed {
            return (CoordinatorState::Synchronised, None);
        }

        self.reconcile_fork(&current, last_processed)
    }

    fn reconcile_fork(
        &mut self,
        current: &Block,
        last_processed: BlockDigest,
    ) -> (CoordinatorState, Option<Duration>) {
        if self.ancestor_path.is_empty() {
            let path = match self.main_chain().get_path_to_common_ancestor(
                current.hash,
                last_processed,
                self.config.common_path_to_ancestor_length_limit,
                TruncationPolicy::ReturnLeastRecent,
            ) {
                Ok(path) => path,
                Err(err) => {
                    warn!(%err, "[qc-18] fork reconciliation: ancestor path lookup failed");
                    return (CoordinatorState::Reset, None);
                }
            };

            if path.len() < 2 {
                warn!(
                    len = path.len(),
                    "[qc-18] fork reconciliation: ancestor path shorter than required minimum"
                );
                return (CoordinatorState::Reset, None);
            }

            let common_parent = path[0].clone();
            let next = path[1].clone();

            let parent_committed = match self
                .collaborators
                .state_store
                .hash_exists(common_parent.merkle_hash, common_parent.block_number)
            {
                Ok(exists) => exists,
                Err(err) => {
                    warn!(%err, "[qc-18] fork reconciliation: hash_exists failed");
                    false
                }
            };

            if !parent_committed {
                // Catastrophic inconsistency (§7d): the common ancestor
                // the chain store reports is not one we ever committed.
                self.hard_revert_to_genesis();
                return (
                    CoordinatorState::Reset,
                    Some(self.config.catastrophic_failure_delay),
                );
            }

            let reverted = self
                .collaborators
                .state_store
                .revert_to_hash(common_parent.merkle_hash, common_parent.block_number)
                .unwrap_or(false);
            if !reverted {
                return (
                    CoordinatorState::Reset,
                    Some(self.config.catastrophic_failure_delay),
                );
            }
            if let Some(dag) = &self.collaborators.dag {
                if let Err(err) = dag.revert_to_epoch(common_parent.block_number) {
                    warn!(%err, "[qc-18] fork reconciliation: dag revert failed");
                }
            }
            self.metrics.record_revert();

            self.current_block = Some(next);
            self.ancestor_path.fill(path[2..].to_vec());
            if self.ancestor_path.len() < self.config.threshold_for_fast_syncing {
                self.ancestor_path.clear();
            }
            return (CoordinatorState::PreExecBlockValidation, None);
        }

        match self.ancestor_path.pop_next() {
            Some(next) => {
                self.current_block = Some(next);
                if self.ancestor_path.len() < self.config.threshold_for_fast_syncing {
                    self.ancestor_path.clear();
                }
                (CoordinatorState::PreExecBlockValidation, None)
            }
            None => (CoordinatorState::Reset, None),
        }
    }

    fn hard_revert_to_genesis(&self) {
        if let Err(err) = self
            .collaborators
            .state_store
            .revert_to_hash(MerkleRoot::GENESIS, 0)
        {
            warn!(%err, "[qc-18] hard revert to genesis: state store revert failed");
        }
        if let Err(err) = self
            .collaborators
            .execution_engine
            .set_last_processed_block(BlockDigest::GENESIS)
        {
            warn!(%err, "[qc-18] hard revert to genesis: execution engine reset failed");
        }
    }

    fn handle_synchronised(&mut self) -> (CoordinatorState, Option<Duration>) {
        let current = match &self.current_block {
            Some(block) => block.clone(),
            None => return (CoordinatorState::Reset, None),
        };

        match self.main_chain().get_heaviest_block_hash() {
            Ok(heaviest) if heaviest == current.hash => {}
            Ok(_) => return (CoordinatorState::Reset, None),
            Err(err) => {
                warn!(%err, "[qc-18] synchronised: failed to check heaviest tip");
                return (CoordinatorState::Reset, None);
            }
        }

        let due_to_mint = self.config.mining_enabled
            && self.config.mining_allowed
            && self.clock.now() >= self.next_block_time;
        if !due_to_mint {
            return (CoordinatorState::Synchronised, Some(self.config.idle_poll_delay));
        }

        if let Some(oracle) = &self.collaborators.stake_oracle {
            match oracle.should_generate_block(current.hash, self.mining_identity) {
                Ok(true) => {}
                Ok(false) => {
                    return (
                        CoordinatorState::Synchronised,
                        Some(self.config.idle_poll_delay),
                    )
                }
                Err(err) => {
                    warn!(%err, "[qc-18] synchronised: stake oracle permission check failed");
                    return (
                        CoordinatorState::Synchronised,
                        Some(self.config.idle_poll_delay),
                    );
                }
            }
        }

        let weight = match &self.collaborators.stake_oracle {
            Some(oracle) => oracle
                .get_block_generation_weight(current.hash, self.mining_identity)
                .unwrap_or(1),
            None => 1,
        };
        let dag_epoch = self
            .collaborators
            .dag
            .as_ref()
            .and_then(|dag| dag.create_epoch(current.block_number + 1).ok());

        let next = Block {
            previous_hash: current.hash,
            hash: BlockDigest::GENESIS,
            block_number: current.block_number + 1,
            miner: self.mining_identity,
            merkle_hash: MerkleRoot::GENESIS,
            slices: Vec::new(),
            log2_num_lanes: self.config.num_lanes.trailing_zeros() as u8,
            dag_epoch,
            weight,
            proof: Proof::new(self.config.block_difficulty),
        };
        self.next_block = Some(next);
        self.current_block = None;
        (CoordinatorState::NewSynergeticExecution, None)
    }

    fn handle_pre_exec_validation(&mut self) -> (CoordinatorState, Option<Duration>) {
        let block = self
            .current_block
            .clone()
            .expect("current_block present entering PRE_EXEC_BLOCK_VALIDATION");

        if !block.is_genesis_child() {
            let previous = match self.main_chain().get(block.previous_hash) {
                Ok(Some(previous)) => previous,
                Ok(None) => {
                    self.reject_current_block(&block, "previous block not found");
                    return (CoordinatorState::Reset, None);
                }
                Err(err) => {
                    warn!(%err, "[qc-18] pre-exec validation: chain lookup failed");
                    self.reject_current_block(&block, "chain lookup failed");
                    return (CoordinatorState::Reset, None);
                }
            };

            if let Some(oracle) = &self.collaborators.stake_oracle {
                match oracle.valid_miner_for_block(block.previous_hash, block.miner) {
                    Ok(true) => {}
                    _ => {
                        self.reject_current_block(&block, "invalid miner for block");
                        return (CoordinatorState::Reset, None);
                    }
                }
                match oracle.get_block_generation_weight(block.previous_hash, block.miner) {
                    Ok(weight) if weight == block.weight => {}
                    _ => {
                        self.reject_current_block(&block, "weight mismatch");
                        return (CoordinatorState::Reset, None);
                    }
                }
            }

            if block.block_number != previous.block_number + 1 {
                self.reject_current_block(&block, "non-contiguous block number");
                return (CoordinatorState::Reset, None);
            }
            if block.num_lanes() != self.config.num_lanes {
                self.reject_current_block(&block, "declared lane count mismatch");
                return (CoordinatorState::Reset, None);
            }
            if block.num_slices() != self.config.num_slices {
                self.reject_current_block(&block, "declared slice count mismatch");
                return (CoordinatorState::Reset, None);
            }
            // previous_hash is a fixed 32-byte BlockDigest at the type
            // level; the spec's size check is enforced by the compiler.

            if let Some(synergetic) = &self.collaborators.synergetic {
                if synergetic.prepare_work_queue(&block, &previous).is_err() {
                    self.reject_current_block(&block, "synergetic work queue preparation failed");
                    return (CoordinatorState::Reset, None);
                }
            }
        }

        self.tx_wait_gate.reset();
        (CoordinatorState::WaitForTransactions, None)
    }

    fn handle_wait_for_transactions(
        &mut self,
        previous_state: CoordinatorState,
    ) -> (CoordinatorState, Option<Duration>) {
        let first_entry = previous_state != CoordinatorState::WaitForTransactions;
        if first_entry {
            self.ask_peers_timer
                .arm(self.clock.now(), self.config.wait_before_asking_for_missing_tx);
            self.overall_tx_timeout.disarm();
            self.asked_peers = false;
            self.pending_txs = None;
        }

        let block = self
            .current_block
            .clone()
            .expect("current_block present entering WAIT_FOR_TRANSACTIONS");

        if self.asked_peers && self.overall_tx_timeout.is_expired(self.clock.now()) {
            self.reject_current_block(&block, "transactions unreachable within timeout");
            self.pending_txs = None;
            return (CoordinatorState::Reset, None);
        }

        let tx_index = self.collaborators.tx_index.clone();

        if self.pending_txs.is_none() {
            self.pending_txs = Some(TransactionDigestSet::from_digests(block.all_digests()));
        }

        if !self.asked_peers && self.ask_peers_timer.is_expired(self.clock.now()) {
            let snapshot = self.pending_txs.as_ref().unwrap().snapshot();
            if let Err(err) = tx_index.issue_call_for_missing_txs(&snapshot) {
                warn!(%err, "[qc-18] wait-for-transactions: peer solicitation failed");
            }
            self.asked_peers = true;
            self.overall_tx_timeout
                .arm(self.clock.now(), self.config.wait_for_tx_timeout);
        }

        let pending = self.pending_txs.as_mut().unwrap();
        pending.retain_missing(|digest| tx_index.has_transaction(*digest).unwrap_or(false));
        let txs_satisfied = pending.is_satisfied();
        let pending_len = pending.len();

        let dag_satisfied = match block.dag_epoch {
            Some(epoch) => match &self.collaborators.dag {
                Some(dag) => dag.satisfy_epoch(epoch).unwrap_or(false),
                None => true,
            },
            None => true,
        };

        if txs_satisfied && dag_satisfied {
            self.pending_txs = None;
            return (CoordinatorState::SynergeticExecution, None);
        }

        if self.tx_wait_gate.check(self.clock.now()) {
            debug!(pending = pending_len, "[qc-18] waiting for transactions");
        }
        (
            CoordinatorState::WaitForTransactions,
            Some(self.config.tx_wait_poll_delay),
        )
    }

    fn handle_synergetic_execution(&mut self) -> (CoordinatorState, Option<Duration>) {
        let block = self
            .current_block
            .clone()
            .expect("current_block present entering SYNERGETIC_EXECUTION");

        if !block.is_genesis_child() {
            if let Some(synergetic) = &self.collaborators.synergetic {
                let previous = match self.main_chain().get(block.previous_hash) {
                    Ok(Some(previous)) => previous,
                    _ => {
                        self.reject_current_block(&block, "previous block missing for synergetic work");
                        return (CoordinatorState::Reset, None);
                    }
                };
                if synergetic.prepare_work_queue(&block, &previous).is_err() {
                    self.reject_current_block(&block, "synergetic re-prepare failed");
                    return (CoordinatorState::Reset, None);
                }
                match synergetic
                    .validate_work_and_update_state(block.block_number, block.num_lanes())
                {
                    Ok(true) => {}
                    _ => {
                        self.reject_current_block(&block, "synergetic validation failed");
                        return (CoordinatorState::Reset, None);
                    }
                }
            }
        }
        (CoordinatorState::ScheduleBlockExecution, None)
    }

    fn handle_schedule_block_execution(&mut self) -> (CoordinatorState, Option<Duration>) {
        let block = self
            .current_block
            .clone()
            .expect("current_block present entering SCHEDULE_BLOCK_EXECUTION");
        match self.collaborators.execution_engine.execute(&block) {
            Ok(true) => {
                self.exec_wait_gate.reset();
                (CoordinatorState::WaitForExecution, None)
            }
            Ok(false) => (CoordinatorState::Reset, None),
            Err(err) => {
                warn!(%err, "[qc-18] schedule: execution engine rejected block");
                (CoordinatorState::Reset, None)
            }
        }
    }

    fn handle_wait_for_execution(&mut self) -> (CoordinatorState, Option<Duration>) {
        match self.collaborators.execution_engine.get_state() {
            Ok(engine_state) => match map_engine_state(engine_state) {
                ExecutionView::Idle => (CoordinatorState::PostExecBlockValidation, None),
                ExecutionView::Running => {
                    if self.exec_wait_gate.check(self.clock.now()) {
                        debug!("[qc-18] waiting for execution to finish");
                    }
                    (
                        CoordinatorState::WaitForExecution,
                        Some(self.config.exec_wait_poll_delay),
                    )
                }
                ExecutionView::Stalled | ExecutionView::Error => {
                    warn!("[qc-18] execution stalled or errored");
                    (CoordinatorState::Reset, None)
                }
            },
            Err(err) => {
                warn!(%err, "[qc-18] wait-for-execution: status poll failed");
                (CoordinatorState::Reset, None)
            }
        }
    }

    fn handle_post_exec_validation(&mut self) -> (CoordinatorState, Option<Duration>) {
        let block = self
            .current_block
            .clone()
            .expect("current_block present entering POST_EXEC_BLOCK_VALIDATION");

        if !block.is_genesis_child() {
            let current_hash = match self.collaborators.state_store.current_hash() {
                Ok(hash) => hash,
                Err(err) => {
                    warn!(%err, "[qc-18] post-exec validation: failed to read current hash");
                    self.hard_revert_to_genesis();
                    self.last_executed.set(BlockDigest::GENESIS);
                    self.reject_current_block(&block, "state store unreadable post-execution");
                    return (CoordinatorState::Reset, None);
                }
            };

            if current_hash != block.merkle_hash {
                let reverted = match self.main_chain().get(block.previous_hash) {
                    Ok(Some(previous)) => {
                        match self
                            .collaborators
                            .state_store
                            .revert_to_hash(previous.merkle_hash, previous.block_number)
                        {
                            Ok(true) => {
                                if let Some(dag) = &self.collaborators.dag {
                                    if let Err(err) = dag.revert_to_epoch(previous.block_number) {
                                        warn!(%err, "[qc-18] post-exec: dag revert failed");
                                    }
                                }
                                if let Err(err) = self
                                    .collaborators
                                    .execution_engine
                                    .set_last_processed_block(previous.hash)
                                {
                                    warn!(%err, "[qc-18] post-exec: failed to rewind last-processed digest");
                                }
                                self.metrics.record_revert();
                                true
                            }
                            _ => false,
                        }
                    }
                    _ => false,
                };

                if !reverted {
                    self.hard_revert_to_genesis();
                    self.last_executed.set(BlockDigest::GENESIS);
                }
                self.reject_current_block(&block, "merkle root mismatch post-execution");
                return (CoordinatorState::Reset, None);
            }
        }

        for digest in block.all_digests() {
            if let Err(err) = self
                .collaborators
                .status_cache
                .update(digest, TxStatus::Executed)
            {
                warn!(%err, "[qc-18] post-exec: status cache update failed");
            }
        }
        self.metrics
            .record_transactions_executed(block.all_digests().len() as u64);
        if let Err(err) = self.collaborators.state_store.commit(block.block_number) {
            warn!(%err, "[qc-18] post-exec: state store commit failed");
        }
        if let Some(dag) = &self.collaborators.dag {
            if let Some(epoch) = block.dag_epoch {
                if let Err(err) = dag.commit_epoch(epoch) {
                    warn!(%err, "[qc-18] post-exec: dag epoch commit failed");
                }
            }
        }
        self.last_executed.set(block.hash);
        self.metrics.record_commit();
        (CoordinatorState::Reset, None)
    }

    fn handle_new_synergetic_execution(&mut self) -> (CoordinatorState, Option<Duration>) {
        let next = self
            .next_block
            .clone()
            .expect("next_block present entering NEW_SYNERGETIC_EXECUTION");

        if let Some(synergetic) = &self.collaborators.synergetic {
            let previous = match self.main_chain().get(next.previous_hash) {
                Ok(Some(previous)) => previous,
                _ => return (CoordinatorState::Reset, None),
            };
            if synergetic.prepare_work_queue(&next, &previous).is_err() {
                return (CoordinatorState::Reset, None);
            }
            match synergetic.validate_work_and_update_state(next.block_number, next.num_lanes()) {
                Ok(true) => {}
                _ => return (CoordinatorState::Reset, None),
            }
        }
        (CoordinatorState::PackNewBlock, None)
    }

    fn handle_pack_new_block(&mut self) -> (CoordinatorState, Option<Duration>) {
        let mut next = self
            .next_block
            .take()
            .expect("next_block present entering PACK_NEW_BLOCK");
        match self.collaborators.packer.generate_block(
            &mut next,
            self.config.num_lanes,
            self.config.num_slices,
        ) {
            Ok(()) => {
                self.next_block = Some(next);
                self.next_block_time = self.clock.now() + self.config.block_period;
                (CoordinatorState::ExecuteNewBlock, None)
            }
            Err(err) => {
                warn!(%err, "[qc-18] pack-new-block: packer failed");
                (CoordinatorState::Reset, None)
            }
        }
    }

    fn handle_execute_new_block(&mut self) -> (CoordinatorState, Option<Duration>) {
        let next = self
            .next_block
            .clone()
            .expect("next_block present entering EXECUTE_NEW_BLOCK");
        match self.collaborators.execution_engine.execute(&next) {
            Ok(true) => {
                self.exec_wait_gate.reset();
                (CoordinatorState::WaitForNewBlockExecution, None)
            }
            _ => (CoordinatorState::Reset, None),
        }
    }

    fn handle_wait_for_new_block_execution(&mut self) -> (CoordinatorState, Option<Duration>) {
        match self.collaborators.execution_engine.get_state() {
            Ok(engine_state) => match map_engine_state(engine_state) {
                ExecutionView::Idle => {
                    let root = match self.collaborators.state_store.current_hash() {
                        Ok(root) => root,
                        Err(err) => {
                            warn!(%err, "[qc-18] wait-for-new-block-execution: failed to read current hash");
                            return (CoordinatorState::Reset, None);
                        }
                    };
                    let block_number = {
                        let next = self
                            .next_block
                            .as_mut()
                            .expect("next_block present entering WAIT_FOR_NEW_BLOCK_EXECUTION");
                        next.merkle_hash = root;
                        next.block_number
                    };
                    if let Err(err) = self.collaborators.state_store.commit(block_number) {
                        warn!(%err, "[qc-18] wait-for-new-block-execution: commit failed");
                        return (CoordinatorState::Reset, None);
                    }
                    if let Some(dag) = &self.collaborators.dag {
                        if let Some(epoch) = self.next_block.as_ref().and_then(|b| b.dag_epoch) {
                            if let Err(err) = dag.commit_epoch(epoch) {
                                warn!(%err, "[qc-18] wait-for-new-block-execution: dag commit failed");
                            }
                        }
                    }
                    (CoordinatorState::ProofSearch, None)
                }
                ExecutionView::Running => {
                    if self.exec_wait_gate.check(self.clock.now()) {
                        debug!("[qc-18] waiting for minted block execution to finish");
                    }
                    (
                        CoordinatorState::WaitForNewBlockExecution,
                        Some(self.config.exec_wait_poll_delay),
                    )
                }
                ExecutionView::Stalled | ExecutionView::Error => (CoordinatorState::Reset, None),
            },
            Err(err) => {
                warn!(%err, "[qc-18] wait-for-new-block-execution: status poll failed");
                (CoordinatorState::Reset, None)
            }
        }
    }

    fn handle_proof_search(&mut self) -> (CoordinatorState, Option<Duration>) {
        let mut next = self
            .next_block
            .take()
            .expect("next_block present entering PROOF_SEARCH");
        match self
            .collaborators
            .proof_miner
            .mine(&mut next, self.config.proof_search_attempt_budget)
        {
            Ok(true) => {
                let hash = next.hash;
                self.next_block = Some(next);
                if let Err(err) = self
                    .collaborators
                    .execution_engine
                    .set_last_processed_block(hash)
                {
                    warn!(%err, "[qc-18] proof-search: failed to set last-processed digest");
                }
                (CoordinatorState::TransmitBlock, None)
            }
            Ok(false) => {
                self.next_block = Some(next);
                (CoordinatorState::ProofSearch, None)
            }
            Err(err) => {
                warn!(%err, "[qc-18] proof-search: miner failed");
                (CoordinatorState::Reset, None)
            }
        }
    }

    fn handle_transmit_block(&mut self) -> (CoordinatorState, Option<Duration>) {
        let next = self
            .next_block
            .take()
            .expect("next_block present entering TRANSMIT_BLOCK");
        match self.main_chain().add_block(next.clone()) {
            Ok(AddBlockOutcome::Added) => {
                for digest in next.all_digests() {
                    if let Err(err) = self
                        .collaborators
                        .status_cache
                        .update(digest, TxStatus::Executed)
                    {
                        warn!(%err, "[qc-18] transmit: status cache update failed");
                    }
                }
                self.metrics
                    .record_transactions_executed(next.all_digests().len() as u64);
                self.last_executed.set(next.hash);
                self.metrics.record_block_mined();
                if let Err(err) = self.collaborators.sink.on_block(&next) {
                    warn!(%err, "[qc-18] transmit: block sink failed");
                }
            }
            Ok(AddBlockOutcome::AlreadyPresent) => {
                debug!(hash = %next.hash, "[qc-18] transmit: minted block already present");
            }
            Ok(AddBlockOutcome::Rejected) => {
                warn!(hash = %next.hash, "[qc-18] transmit: chain store rejected minted block");
            }
            Err(err) => {
                warn!(%err, "[qc-18] transmit: add_block failed");
            }
        }
        (CoordinatorState::Reset, None)
    }
}
