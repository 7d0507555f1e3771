//! Thread-shareable handle around a [`LockManager`].

use super::{LockManager, Outcome, TxnId};
use crate::error::Result;
use std::sync::{Arc, Mutex, MutexGuard};

/// A [`LockManager`] behind one mutex.
///
/// Every request runs inside the critical section, so concurrent callers see
/// the same serial order of requests a single caller would produce.
#[derive(Debug, Clone, Default)]
pub struct SharedLockManager {
    inner: Arc<Mutex<LockManager>>,
}

impl SharedLockManager {
    pub fn new(manager: LockManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// See [`LockManager::process_request`].
    pub fn process_request(
        &self,
        operation: &str,
        txn: TxnId,
        resource: Option<&str>,
    ) -> Result<Vec<Outcome>> {
        self.lock().process_request(operation, txn, resource)
    }

    /// Run `f` with exclusive access to the manager.
    pub fn with<R>(&self, f: impl FnOnce(&mut LockManager) -> R) -> R {
        f(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, LockManager> {
        // Requests are atomic; a poisoned lock still guards consistent state.
        self.inner.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}
