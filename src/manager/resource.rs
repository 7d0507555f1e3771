//! Per-resource lock state machine.
//!
//! Each request is classified by the holder set of the resource (free, shared,
//! exclusive) and answered with exactly one outcome, optionally followed by the
//! grants a release or a queue change made possible.

use super::LockManager;
use super::table::HolderState;
use super::types::{Mode, Outcome, TxnId};
use crate::config::GrantPolicy;

impl LockManager {
    /// Handle `SLock` / `XLock` from an active transaction.
    pub(super) fn lock(&mut self, txn: TxnId, resource: &str, requested: Mode) -> Vec<Outcome> {
        let decision = match self.table.state(resource) {
            HolderState::Free => {
                return self.grant_now(txn, resource, requested, Outcome::LockGranted(requested));
            }
            HolderState::Exclusive(holder) if holder == txn => Outcome::AlreadyHeld(requested),
            HolderState::Exclusive(holder) => {
                let queued = self.wait(txn, resource, requested);
                Outcome::Waiting {
                    mode: queued,
                    blocker: holder,
                    blocker_mode: Mode::Exclusive,
                }
            }
            HolderState::Shared { first, count } => {
                let holds_shared = self.table.mode(txn, resource).is_some();
                match (requested, holds_shared) {
                    (Mode::Shared, true) => Outcome::AlreadyHeld(Mode::Shared),
                    (Mode::Shared, false) => {
                        return self.grant_now(
                            txn,
                            resource,
                            Mode::Shared,
                            Outcome::LockGranted(Mode::Shared),
                        );
                    }
                    (Mode::Exclusive, true) if count == 1 => {
                        return self.grant_now(txn, resource, Mode::Exclusive, Outcome::LockUpgraded);
                    }
                    (Mode::Exclusive, true) => {
                        // count > 1, so another holder exists.
                        let blocker = self.table.first_other_holder(resource, txn).unwrap_or(first);
                        self.wait(txn, resource, Mode::Exclusive);
                        Outcome::WaitingForUpgrade(blocker)
                    }
                    (Mode::Exclusive, false) => {
                        self.wait(txn, resource, Mode::Exclusive);
                        Outcome::Waiting {
                            mode: Mode::Exclusive,
                            blocker: first,
                            blocker_mode: Mode::Shared,
                        }
                    }
                }
            }
        };
        vec![decision]
    }

    /// Handle `Unlock` from an active transaction.
    pub(super) fn unlock(&mut self, txn: TxnId, resource: &str) -> Vec<Outcome> {
        match self.table.release(txn, resource, self.compact) {
            Some(mode) => {
                let mut outcomes = vec![Outcome::Unlocked(mode)];
                self.grant_sweep(resource, &mut outcomes);
                outcomes
            }
            None if self.table.state(resource) == HolderState::Free => {
                vec![Outcome::NothingToUnlock]
            }
            None => vec![Outcome::NotLockedByCaller],
        }
    }

    /// Admit waiters from the front of the queue of `resource`.
    ///
    /// Shared waiters are granted while the policy allows it; an exclusive
    /// waiter is granted alone and ends the sweep. A front entry that is not
    /// compatible with the remaining holders ends the sweep without a grant.
    pub(super) fn grant_sweep(&mut self, resource: &str, outcomes: &mut Vec<Outcome>) {
        while let Some((waiter, requested)) = self.queues.front(resource) {
            if !self.compatible(resource, waiter, requested) {
                break;
            }
            self.queues.pop_front(resource, self.compact);

            let upgrading = self.table.mode(waiter, resource) == Some(Mode::Shared);
            self.table.grant(waiter, resource, requested);
            outcomes.push(match requested {
                Mode::Exclusive if upgrading => Outcome::LockUpgradedForWaiter(waiter),
                mode => Outcome::LockGrantedToWaiter { txn: waiter, mode },
            });

            if requested == Mode::Exclusive || self.policy == GrantPolicy::Single {
                break;
            }
        }
    }

    /// Whether `waiter` could hold `requested` on `resource` right now.
    fn compatible(&self, resource: &str, waiter: TxnId, requested: Mode) -> bool {
        match requested {
            Mode::Shared => self
                .table
                .holders(resource)
                .all(|(_, mode)| mode == Mode::Shared),
            Mode::Exclusive => self.table.holders(resource).all(|(holder, _)| holder == waiter),
        }
    }

    /// Grant `mode` immediately and settle any queue entry the grant satisfies.
    ///
    /// A pending exclusive request stays queued when only a shared lock was
    /// granted: the transaction is then an upgrade waiter.
    fn grant_now(&mut self, txn: TxnId, resource: &str, mode: Mode, outcome: Outcome) -> Vec<Outcome> {
        self.table.grant(txn, resource, mode);
        let mut outcomes = vec![outcome];

        let satisfied = match self.queues.requested(resource, txn) {
            Some(Mode::Exclusive) => mode == Mode::Exclusive,
            Some(Mode::Shared) => true,
            None => false,
        };
        if satisfied && self.queues.remove(resource, txn, self.compact) == Some(true) {
            self.grant_sweep(resource, &mut outcomes);
        }
        outcomes
    }

    /// Queue `txn` for `mode` and return the mode it now waits for.
    ///
    /// A repeated request keeps the original position. An exclusive request
    /// raises a queued shared entry in place; a shared request never lowers a
    /// queued exclusive one.
    fn wait(&mut self, txn: TxnId, resource: &str, mode: Mode) -> Mode {
        if self.queues.enqueue(resource, txn, mode) {
            return mode;
        }
        if mode == Mode::Exclusive {
            self.queues.escalate(resource, txn);
        }
        self.queues.requested(resource, txn).unwrap_or(mode)
    }
}
