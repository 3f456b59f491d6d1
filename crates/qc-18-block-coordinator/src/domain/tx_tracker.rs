//! The transaction-set tracker used by `WAIT_FOR_TRANSACTIONS`.
//!
//! Constructed lazily from a block's slices; a filter pass removes
//! digests the storage layer reports as locally present. Never
//! serialized or shared — it lives only for the duration of one block's
//! wait.

use shared_types::Hash;
use std::collections::HashSet;

/// The set of transaction digests still outstanding for the block
/// currently being waited on.
#[derive(Debug, Default, Clone)]
pub struct TransactionDigestSet {
    pending: HashSet<Hash>,
}

impl TransactionDigestSet {
    /// Build the set from every digest across all of a block's slices.
    /// Insertion order is irrelevant, duplicates collapse naturally.
    pub fn from_digests<I: IntoIterator<Item = Hash>>(digests: I) -> Self {
        Self {
            pending: digests.into_iter().collect(),
        }
    }

    /// Remove every digest the predicate reports as already present.
    /// Returns the number removed.
    pub fn retain_missing<F: Fn(&Hash) -> bool>(&mut self, has_locally: F) -> usize {
        let before = self.pending.len();
        self.pending.retain(|digest| !has_locally(digest));
        before - self.pending.len()
    }

    /// Whether every digest has arrived.
    pub fn is_satisfied(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of outstanding digests.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the tracker holds no outstanding digests (either never
    /// populated, or fully satisfied).
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Snapshot of the outstanding digests, e.g. to hand to a
    /// peer-solicitation call.
    pub fn snapshot(&self) -> HashSet<Hash> {
        self.pending.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_is_satisfied() {
        let set = TransactionDigestSet::default();
        assert!(set.is_satisfied());
    }

    #[test]
    fn filtering_removes_locally_present_digests() {
        let mut set = TransactionDigestSet::from_digests([[1u8; 32], [2u8; 32], [3u8; 32]]);
        assert_eq!(set.len(), 3);

        let removed = set.retain_missing(|d| *d == [2u8; 32]);
        assert_eq!(removed, 1);
        assert_eq!(set.len(), 2);
        assert!(!set.is_satisfied());

        let removed = set.retain_missing(|_| true);
        assert_eq!(removed, 2);
        assert!(set.is_satisfied());
    }

    #[test]
    fn duplicate_digests_collapse() {
        let set = TransactionDigestSet::from_digests([[1u8; 32], [1u8; 32]]);
        assert_eq!(set.len(), 1);
    }
}
