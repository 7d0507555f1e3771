//! Lock table: who holds which mode on which resource.
//!
//! Two views are kept in step: transaction -> resources (acquisition order)
//! and resource -> holders (grant order). Every mutation goes through this
//! type so the views cannot drift apart.

use super::types::{Mode, TxnId};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Holder-set classification of a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolderState {
    /// Nobody holds the resource.
    Free,
    /// One or more shared holders; `first` is the earliest granted.
    Shared { first: TxnId, count: usize },
    /// Exactly one exclusive holder.
    Exclusive(TxnId),
}

#[derive(Debug, Default)]
pub struct LockTable {
    by_txn: HashMap<TxnId, IndexMap<String, Mode>>,
    by_resource: HashMap<String, IndexMap<TxnId, Mode>>,
}

impl LockTable {
    /// Classify the holder set of `resource`.
    pub fn state(&self, resource: &str) -> HolderState {
        let Some(holders) = self.by_resource.get(resource) else {
            return HolderState::Free;
        };
        match holders.first() {
            None => HolderState::Free,
            Some((&txn, Mode::Exclusive)) => HolderState::Exclusive(txn),
            Some((&txn, Mode::Shared)) => HolderState::Shared {
                first: txn,
                count: holders.len(),
            },
        }
    }

    /// Mode `txn` holds on `resource`, if any.
    pub fn mode(&self, txn: TxnId, resource: &str) -> Option<Mode> {
        self.by_resource
            .get(resource)
            .and_then(|holders| holders.get(&txn))
            .copied()
    }

    /// Holders of `resource` in grant order.
    pub fn holders(&self, resource: &str) -> impl Iterator<Item = (TxnId, Mode)> + '_ {
        self.by_resource
            .get(resource)
            .into_iter()
            .flat_map(|holders| holders.iter().map(|(&txn, &mode)| (txn, mode)))
    }

    /// Resources held by `txn` in acquisition order.
    pub fn held_by(&self, txn: TxnId) -> impl Iterator<Item = (&str, Mode)> + '_ {
        self.by_txn
            .get(&txn)
            .into_iter()
            .flat_map(|held| held.iter().map(|(resource, &mode)| (resource.as_str(), mode)))
    }

    /// First holder of `resource` other than `txn`.
    pub fn first_other_holder(&self, resource: &str, txn: TxnId) -> Option<TxnId> {
        self.holders(resource)
            .map(|(holder, _)| holder)
            .find(|&holder| holder != txn)
    }

    /// Record `txn` holding `mode` on `resource`.
    ///
    /// Re-recording an existing holder changes its mode in place and keeps its
    /// position in both views; this is how upgrades are applied.
    pub fn grant(&mut self, txn: TxnId, resource: &str, mode: Mode) {
        self.by_txn
            .entry(txn)
            .or_default()
            .insert(resource.to_string(), mode);
        self.by_resource
            .entry(resource.to_string())
            .or_default()
            .insert(txn, mode);
    }

    /// Remove `txn` from the holders of `resource`, returning the mode it held.
    ///
    /// With `compact` set, a resource whose holder set becomes empty is dropped.
    pub fn release(&mut self, txn: TxnId, resource: &str, compact: bool) -> Option<Mode> {
        let holders = self.by_resource.get_mut(resource)?;
        let mode = holders.shift_remove(&txn)?;
        if compact && holders.is_empty() {
            self.by_resource.remove(resource);
        }
        if let Some(held) = self.by_txn.get_mut(&txn) {
            held.shift_remove(resource);
        }
        Some(mode)
    }

    /// Drop whatever is left of `txn` in the transaction view.
    pub fn forget(&mut self, txn: TxnId) {
        self.by_txn.remove(&txn);
    }

    /// Names of resources with a holder-set entry (possibly empty when not compacting).
    pub fn resources(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_resource.keys().map(String::as_str)
    }

    /// Transactions with a transaction-view entry.
    pub fn transactions(&self) -> impl Iterator<Item = TxnId> + '_ {
        self.by_txn.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_classifies_holder_sets() {
        let mut table = LockTable::default();
        assert_eq!(table.state("A"), HolderState::Free);

        table.grant(1, "A", Mode::Shared);
        table.grant(2, "A", Mode::Shared);
        assert_eq!(table.state("A"), HolderState::Shared { first: 1, count: 2 });

        table.grant(3, "B", Mode::Exclusive);
        assert_eq!(table.state("B"), HolderState::Exclusive(3));
    }

    #[test]
    fn grant_in_place_keeps_order() {
        let mut table = LockTable::default();
        table.grant(1, "A", Mode::Shared);
        table.grant(1, "B", Mode::Shared);
        table.grant(1, "A", Mode::Exclusive);

        let held: Vec<_> = table.held_by(1).collect();
        assert_eq!(held, vec![("A", Mode::Exclusive), ("B", Mode::Shared)]);
        assert_eq!(table.mode(1, "A"), Some(Mode::Exclusive));
    }

    #[test]
    fn release_updates_both_views() {
        let mut table = LockTable::default();
        table.grant(1, "A", Mode::Shared);
        table.grant(2, "A", Mode::Shared);

        assert_eq!(table.release(1, "A", true), Some(Mode::Shared));
        assert_eq!(table.held_by(1).count(), 0);
        assert_eq!(table.state("A"), HolderState::Shared { first: 2, count: 1 });
        assert_eq!(table.first_other_holder("A", 2), None);

        assert_eq!(table.release(2, "A", true), Some(Mode::Shared));
        assert_eq!(table.resources().count(), 0);
    }

    #[test]
    fn release_without_compaction_keeps_empty_entry() {
        let mut table = LockTable::default();
        table.grant(1, "A", Mode::Exclusive);
        table.release(1, "A", false);

        assert_eq!(table.resources().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(table.state("A"), HolderState::Free);
    }

    #[test]
    fn release_of_non_holder_is_none() {
        let mut table = LockTable::default();
        table.grant(1, "A", Mode::Shared);
        assert_eq!(table.release(2, "A", true), None);
        assert_eq!(table.release(1, "Z", true), None);
    }
}
