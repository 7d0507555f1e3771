//! Per-resource FIFO wait queues.

use super::types::{Mode, TxnId};
use indexmap::IndexMap;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct WaitQueues {
    queues: BTreeMap<String, IndexMap<TxnId, Mode>>,
}

impl WaitQueues {
    /// Append `txn` to the queue of `resource`.
    ///
    /// Returns `false` (and leaves the queue untouched) when `txn` already has
    /// an entry there.
    pub fn enqueue(&mut self, resource: &str, txn: TxnId, mode: Mode) -> bool {
        let queue = self.queues.entry(resource.to_string()).or_default();
        if queue.contains_key(&txn) {
            return false;
        }
        queue.insert(txn, mode);
        true
    }

    /// Raise the entry of `txn` on `resource` to exclusive, keeping its position.
    ///
    /// Returns `false` when `txn` has no entry there.
    pub fn escalate(&mut self, resource: &str, txn: TxnId) -> bool {
        match self
            .queues
            .get_mut(resource)
            .and_then(|queue| queue.get_mut(&txn))
        {
            Some(mode) => {
                *mode = Mode::Exclusive;
                true
            }
            None => false,
        }
    }

    /// Mode `txn` is waiting for on `resource`.
    pub fn requested(&self, resource: &str, txn: TxnId) -> Option<Mode> {
        self.queues
            .get(resource)
            .and_then(|queue| queue.get(&txn))
            .copied()
    }

    pub fn front(&self, resource: &str) -> Option<(TxnId, Mode)> {
        self.queues
            .get(resource)
            .and_then(|queue| queue.first())
            .map(|(&txn, &mode)| (txn, mode))
    }

    pub fn pop_front(&mut self, resource: &str, compact: bool) -> Option<(TxnId, Mode)> {
        let queue = self.queues.get_mut(resource)?;
        let entry = queue.shift_remove_index(0);
        if compact && queue.is_empty() {
            self.queues.remove(resource);
        }
        entry
    }

    /// Remove the entry of `txn` on `resource`, returning whether it was at the front.
    pub fn remove(&mut self, resource: &str, txn: TxnId, compact: bool) -> Option<bool> {
        let queue = self.queues.get_mut(resource)?;
        let (index, _, _) = queue.shift_remove_full(&txn)?;
        if compact && queue.is_empty() {
            self.queues.remove(resource);
        }
        Some(index == 0)
    }

    /// Remove `txn` from every queue.
    ///
    /// Returns the affected resources (in name order) paired with whether the
    /// removed entry was at the front of that queue.
    pub fn purge(&mut self, txn: TxnId, compact: bool) -> Vec<(String, bool)> {
        let mut purged = Vec::new();
        for (resource, queue) in self.queues.iter_mut() {
            if let Some((index, _, _)) = queue.shift_remove_full(&txn) {
                purged.push((resource.clone(), index == 0));
            }
        }
        if compact {
            self.queues.retain(|_, queue| !queue.is_empty());
        }
        purged
    }

    /// Waiters on `resource` in arrival order.
    pub fn waiters(&self, resource: &str) -> impl Iterator<Item = (TxnId, Mode)> + '_ {
        self.queues
            .get(resource)
            .into_iter()
            .flat_map(|queue| queue.iter().map(|(&txn, &mode)| (txn, mode)))
    }

    /// Resources with a queue entry (possibly empty when not compacting).
    pub fn resources(&self) -> impl Iterator<Item = &str> + '_ {
        self.queues.keys().map(String::as_str)
    }
}
