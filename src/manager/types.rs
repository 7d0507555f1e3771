//! Core value types: transaction ids, lock modes, operations, and outcome records.

use crate::error::LockError;
use std::fmt;
use std::str::FromStr;

/// Transaction identifier.
pub type TxnId = u64;

/// Lock mode held on, or requested for, a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Compatible with other shared holders.
    Shared,
    /// Incompatible with any other holder.
    Exclusive,
}

impl Mode {
    /// Single-letter form used in status lines (`S` / `X`).
    pub fn short(&self) -> &'static str {
        match self {
            Mode::Shared => "S",
            Mode::Exclusive => "X",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short())
    }
}

/// Request operation tags. Parsing is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Start,
    End,
    SLock,
    XLock,
    Unlock,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Start => "Start",
            Operation::End => "End",
            Operation::SLock => "SLock",
            Operation::XLock => "XLock",
            Operation::Unlock => "Unlock",
        }
    }

    /// The mode a lock operation asks for; `None` for the others.
    pub fn requested_mode(&self) -> Option<Mode> {
        match self {
            Operation::SLock => Some(Mode::Shared),
            Operation::XLock => Some(Mode::Exclusive),
            _ => None,
        }
    }

    /// Whether the operation addresses a resource rather than a transaction.
    pub fn targets_resource(&self) -> bool {
        matches!(self, Operation::SLock | Operation::XLock | Operation::Unlock)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = LockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Start" => Ok(Operation::Start),
            "End" => Ok(Operation::End),
            "SLock" => Ok(Operation::SLock),
            "XLock" => Ok(Operation::XLock),
            "Unlock" => Ok(Operation::Unlock),
            other => Err(LockError::InvalidCommand(other.to_string())),
        }
    }
}

/// Result of a single state transition.
///
/// A request produces an ordered sequence of these. `AlreadyHeld`,
/// `NotLockedByCaller` and `NothingToUnlock` are rejections: the request
/// changed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    TransactionStarted,
    TransactionEnded,
    LockGranted(Mode),
    LockGrantedToWaiter { txn: TxnId, mode: Mode },
    LockUpgraded,
    LockUpgradedForWaiter(TxnId),
    Unlocked(Mode),
    Waiting {
        mode: Mode,
        blocker: TxnId,
        blocker_mode: Mode,
    },
    WaitingForUpgrade(TxnId),
    AlreadyHeld(Mode),
    NotLockedByCaller,
    NothingToUnlock,
    /// An outcome produced while `End` released `resource`.
    Release {
        resource: String,
        outcome: Box<Outcome>,
    },
}

impl Outcome {
    pub(crate) fn released(resource: &str, outcome: Outcome) -> Self {
        Outcome::Release {
            resource: resource.to_string(),
            outcome: Box::new(outcome),
        }
    }

    /// True for outcomes that reject the request without mutating state.
    pub fn is_rejection(&self) -> bool {
        match self {
            Outcome::AlreadyHeld(_) | Outcome::NotLockedByCaller | Outcome::NothingToUnlock => {
                true
            }
            Outcome::Release { outcome, .. } => outcome.is_rejection(),
            _ => false,
        }
    }

    /// The waiter granted by this outcome, if it is a grant to a queued transaction.
    pub fn granted_waiter(&self) -> Option<TxnId> {
        match self {
            Outcome::LockGrantedToWaiter { txn, .. } | Outcome::LockUpgradedForWaiter(txn) => {
                Some(*txn)
            }
            Outcome::Release { outcome, .. } => outcome.granted_waiter(),
            _ => None,
        }
    }
}
