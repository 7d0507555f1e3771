//! Strict two-phase lock manager.
//!
//! The manager owns the lock table and the wait queues and drives two coupled
//! state machines over them:
//! - the transaction lifecycle (`Start` / `End`, with cascading release), and
//! - the per-resource lock state (shared / exclusive grants, upgrades, FIFO waits).
//!
//! # Scheduling
//!
//! Requests are processed one at a time and complete synchronously, including
//! any cascade of releases and grants. A `Waiting` outcome is informational:
//! nothing blocks. Hosts that share a manager between threads must serialize
//! access; [`SharedLockManager`] does that with a single mutex.
//!
//! # Deadlocks
//!
//! There is no deadlock detection. A cycle of waits stays blocked until one of
//! the transactions involved ends.

mod queue;
mod resource;
mod shared;
mod table;
mod transaction;
mod types;


pub use shared::SharedLockManager;
pub use table::HolderState;
pub use types::{Mode, Operation, Outcome, TxnId};

use crate::config::{Config, GrantPolicy};
use crate::error::{LockError, Result};
use queue::WaitQueues;
use std::collections::BTreeSet;
use table::LockTable;

/// Lock manager state: active transactions, lock table, and wait queues.
#[derive(Debug)]
pub struct LockManager {
    active: BTreeSet<TxnId>,
    table: LockTable,
    queues: WaitQueues,
    policy: GrantPolicy,
    compact: bool,
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LockManager {
    /// Create an empty manager with the default grant policy.
    pub fn new() -> Self {
        Self {
            active: BTreeSet::new(),
            table: LockTable::default(),
            queues: WaitQueues::default(),
            policy: GrantPolicy::default(),
            compact: true,
        }
    }

    /// Create an empty manager configured from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_grant_policy(config.grant_policy)
            .with_compaction(config.compact_idle_resources)
    }

    pub fn with_grant_policy(mut self, policy: GrantPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_compaction(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn grant_policy(&self) -> GrantPolicy {
        self.policy
    }

    /// Process one request given by its textual operation tag.
    ///
    /// # Returns
    ///
    /// * `Ok(outcomes)` - The ordered outcome records of the request
    /// * `Err(LockError::InvalidCommand)` - Unknown tag, or a tag that does not
    ///   match the presence of `resource`
    /// * `Err(..)` - Lifecycle errors (`AlreadyStarted`, `NotStarted`,
    ///   `TransactionNotFound`)
    pub fn process_request(
        &mut self,
        operation: &str,
        txn: TxnId,
        resource: Option<&str>,
    ) -> Result<Vec<Outcome>> {
        let operation: Operation = operation.parse()?;
        self.process(operation, txn, resource)
    }

    /// Process one request with an already parsed operation.
    pub fn process(
        &mut self,
        operation: Operation,
        txn: TxnId,
        resource: Option<&str>,
    ) -> Result<Vec<Outcome>> {
        match (operation, resource) {
            (Operation::Start, None) => self.start(txn),
            (Operation::End, None) => self.end(txn),
            (op, Some(resource)) if op.targets_resource() => {
                if !self.is_active(txn) {
                    return Err(LockError::TransactionNotFound {
                        operation: op,
                        txn,
                        resource: resource.to_string(),
                    });
                }
                Ok(match op.requested_mode() {
                    Some(mode) => self.lock(txn, resource, mode),
                    None => self.unlock(txn, resource),
                })
            }
            (op, Some(resource)) => Err(LockError::InvalidCommand(format!(
                "{} does not take a resource (got '{}')",
                op, resource
            ))),
            (op, None) => Err(LockError::InvalidCommand(format!(
                "{} requires a resource name",
                op
            ))),
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn is_active(&self, txn: TxnId) -> bool {
        self.active.contains(&txn)
    }

    /// Active transactions in ascending id order.
    pub fn active_transactions(&self) -> Vec<TxnId> {
        self.active.iter().copied().collect()
    }

    /// Holder-set classification of `resource`.
    pub fn state(&self, resource: &str) -> HolderState {
        self.table.state(resource)
    }

    /// Holders of `resource` in grant order.
    pub fn holders(&self, resource: &str) -> Vec<(TxnId, Mode)> {
        self.table.holders(resource).collect()
    }

    /// Resources held by `txn` in acquisition order.
    pub fn held_by(&self, txn: TxnId) -> Vec<(String, Mode)> {
        self.table
            .held_by(txn)
            .map(|(resource, mode)| (resource.to_string(), mode))
            .collect()
    }

    pub fn mode_held(&self, txn: TxnId, resource: &str) -> Option<Mode> {
        self.table.mode(txn, resource)
    }

    /// Waiters on `resource` in arrival order.
    pub fn waiters(&self, resource: &str) -> Vec<(TxnId, Mode)> {
        self.queues.waiters(resource).collect()
    }

    /// Resources currently tracked by the lock table or the wait queues.
    pub fn tracked_resources(&self) -> BTreeSet<String> {
        self.table
            .resources()
            .chain(self.queues.resources())
            .map(str::to_string)
            .collect()
    }

    /// Audit the structural invariants, describing the first violation found.
    ///
    /// Checked: holder sets are empty, a single exclusive holder, or shared
    /// holders only; both lock-table views agree; only active transactions hold
    /// or wait; a waiter never already holds what it waits for, except a shared
    /// holder waiting to upgrade.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        for resource in self.tracked_resources() {
            let holders = self.holders(&resource);
            let exclusive = holders
                .iter()
                .filter(|(_, mode)| *mode == Mode::Exclusive)
                .count();
            if exclusive > 1 || (exclusive == 1 && holders.len() > 1) {
                return Err(format!(
                    "resource {} has incompatible holders {:?}",
                    resource, holders
                ));
            }

            for (txn, mode) in &holders {
                if !self.is_active(*txn) {
                    return Err(format!("inactive transaction {} holds {}", txn, resource));
                }
                if !self
                    .table
                    .held_by(*txn)
                    .any(|(r, m)| r == resource && m == *mode)
                {
                    return Err(format!(
                        "lock table views disagree on {} holding {}",
                        txn, resource
                    ));
                }
            }

            for (txn, requested) in self.waiters(&resource) {
                if !self.is_active(txn) {
                    return Err(format!("inactive transaction {} waits on {}", txn, resource));
                }
                match (self.table.mode(txn, &resource), requested) {
                    (None, _) | (Some(Mode::Shared), Mode::Exclusive) => {}
                    (Some(held), _) => {
                        return Err(format!(
                            "transaction {} waits for {} on {} while holding {}",
                            txn, requested, resource, held
                        ));
                    }
                }
            }
        }

        for txn in self.table.transactions() {
            for (resource, mode) in self.table.held_by(txn) {
                if self.table.mode(txn, resource) != Some(mode) {
                    return Err(format!(
                        "lock table views disagree on {} holding {}",
                        txn, resource
                    ));
                }
            }
        }

        Ok(())
    }
}
