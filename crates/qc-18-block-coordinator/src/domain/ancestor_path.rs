//! The ancestor-path cache used during long fork reconciliation.
//!
//! Holds the blocks still to be set as `current_block`, oldest-first
//! (closest to the common ancestor at the front, the heaviest tip at the
//! back). Grown in one lookup, consumed one element per `SYNCHRONISING`
//! iteration — see the Open Question in DESIGN.md for how this
//! implementation resolves the spec's underspecified pop/truncate
//! interaction.

use crate::domain::entities::Block;
use std::collections::VecDeque;

/// Ordered queue of not-yet-executed blocks discovered by a single
/// common-ancestor lookup.
#[derive(Debug, Default)]
pub struct AncestorPathCache {
    queue: VecDeque<Block>,
}

impl AncestorPathCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cache currently holds any pending blocks.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of blocks still queued.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Replace the cache's contents with a freshly fetched path. `path`
    /// must be ordered oldest-first and must NOT include the common
    /// ancestor itself (callers pass `path[1..]` of the raw lookup
    /// result, having already consumed `path[0]` as the common parent).
    pub fn fill(&mut self, path: Vec<Block>) {
        self.queue = path.into();
    }

    /// Pop the next block to execute off the front of the queue.
    pub fn pop_next(&mut self) -> Option<Block> {
        self.queue.pop_front()
    }

    /// Discard every pending entry, e.g. because reconciliation
    /// completed, the residual fell below the fast-sync threshold, or
    /// `RESET` was entered.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
