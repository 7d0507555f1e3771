//! lockman: a strict two-phase lock manager.
//!
//! The core is [`manager::LockManager`], which grants shared and exclusive
//! locks on named resources to active transactions, queues conflicting
//! requests in FIFO order, upgrades sole shared holders in place, and releases
//! everything a transaction holds when it ends.
//!
//! Around the core sit a text codec for the `<Operation> <Txn> [<Resource>]`
//! line protocol, a streaming line processor, YAML configuration, and an
//! optional NDJSON audit log.

pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod manager;
pub mod stream;

pub use error::{LockError, Result};
pub use manager::{LockManager, Mode, Operation, Outcome, SharedLockManager, TxnId};
