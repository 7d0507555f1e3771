//! Transaction lifecycle: `Start` and `End` with cascading release.

use super::LockManager;
use super::types::{Outcome, TxnId};
use crate::error::{LockError, Result};

impl LockManager {
    pub(super) fn start(&mut self, txn: TxnId) -> Result<Vec<Outcome>> {
        if !self.active.insert(txn) {
            return Err(LockError::AlreadyStarted(txn));
        }
        Ok(vec![Outcome::TransactionStarted])
    }

    /// End `txn`, releasing everything it holds in acquisition order.
    ///
    /// Its wait-queue entries are dropped silently before the releases run, so
    /// a pending upgrade of the ending transaction is never granted to it.
    /// Queues whose front entry belonged to `txn` are swept afterwards.
    pub(super) fn end(&mut self, txn: TxnId) -> Result<Vec<Outcome>> {
        if !self.is_active(txn) {
            return Err(LockError::NotStarted(txn));
        }

        let mut outcomes = vec![Outcome::TransactionEnded];
        let purged = self.queues.purge(txn, self.compact);

        let held: Vec<String> = self
            .table
            .held_by(txn)
            .map(|(resource, _)| resource.to_string())
            .collect();
        for resource in &held {
            let released = self.unlock(txn, resource);
            outcomes.extend(
                released
                    .into_iter()
                    .map(|outcome| Outcome::released(resource, outcome)),
            );
        }

        for (resource, was_front) in purged {
            if !was_front || held.contains(&resource) {
                continue;
            }
            let mut granted = Vec::new();
            self.grant_sweep(&resource, &mut granted);
            outcomes.extend(
                granted
                    .into_iter()
                    .map(|outcome| Outcome::released(&resource, outcome)),
            );
        }

        self.table.forget(txn);
        self.active.remove(&txn);
        Ok(outcomes)
    }
}
