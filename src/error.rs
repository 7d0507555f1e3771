//! Error types for lockman.
//!
//! Uses thiserror for derive macros. Request-level errors render as the
//! status line a caller would expect for the rejected command.

use crate::exit_codes;
use crate::manager::{Operation, TxnId};
use thiserror::Error;

/// Main error type for lockman operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// The operation tag is not one of the known operations, or does not fit
    /// the presence/absence of a resource name.
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// A lock or unlock request named a transaction that is not active.
    #[error("{operation} {txn} {resource}: Transaction {txn} not found")]
    TransactionNotFound {
        operation: Operation,
        txn: TxnId,
        resource: String,
    },

    /// `Start` for a transaction that is already active.
    #[error("Start {0} : Transaction {0} already exists")]
    AlreadyStarted(TxnId),

    /// `End` for a transaction that was never started (or already ended).
    #[error("End {0} : Transaction {0} not found")]
    NotStarted(TxnId),

    /// A command line did not match `<Operation> <TransactionId> [<ResourceName>]`.
    #[error("Text '{0}' doesn't match expected format: <Operation> <TransactionId> [<ResourceName>]")]
    Parse(String),

    /// The command input could not be opened.
    #[error("{0}")]
    Input(String),

    /// Configuration could not be read, parsed, or validated.
    #[error("{0}")]
    Config(String),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl LockError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LockError::InvalidCommand(_)
            | LockError::TransactionNotFound { .. }
            | LockError::AlreadyStarted(_)
            | LockError::NotStarted(_)
            | LockError::Parse(_)
            | LockError::Input(_)
            | LockError::Config(_) => exit_codes::USER_ERROR,
            LockError::Io(_) => exit_codes::IO_FAILURE,
        }
    }

    /// Whether this error came from a single request rather than the
    /// environment. Request errors never stop a stream.
    pub fn is_request_error(&self) -> bool {
        !matches!(
            self,
            LockError::Input(_) | LockError::Config(_) | LockError::Io(_)
        )
    }
}

impl From<std::io::Error> for LockError {
    fn from(e: std::io::Error) -> Self {
        LockError::Io(e.to_string())
    }
}

/// Result type alias for lockman operations.
pub type Result<T> = std::result::Result<T, LockError>;
