//! Command line parsing.

use crate::error::{LockError, Result};
use crate::manager::TxnId;
use regex::Regex;
use std::sync::LazyLock;

/// Shape of a command line: operation word, transaction id, optional resource.
static REQUEST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+) (\d+)(?: ([A-Za-z0-9]+))?$").expect("Invalid request regex")
});

/// A command line split into its fields.
///
/// The operation is kept as written; the lock manager validates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub operation: String,
    pub txn: TxnId,
    pub resource: Option<String>,
}

impl Request {
    pub fn new(operation: impl Into<String>, txn: TxnId, resource: Option<&str>) -> Self {
        Self {
            operation: operation.into(),
            txn,
            resource: resource.map(str::to_string),
        }
    }

    /// `<Operation> <TransactionId> [<ResourceName>]`, as it would be typed.
    pub fn command(&self) -> String {
        match &self.resource {
            Some(resource) => format!("{} {} {}", self.operation, self.txn, resource),
            None => format!("{} {}", self.operation, self.txn),
        }
    }
}

/// Parse one command line. Trailing whitespace (including `\r`) is ignored.
pub fn parse_request(line: &str) -> Result<Request> {
    let line = line.trim_end();
    let captures = REQUEST_REGEX
        .captures(line)
        .ok_or_else(|| LockError::Parse(line.to_string()))?;

    let txn = captures[2]
        .parse::<TxnId>()
        .map_err(|_| LockError::Parse(line.to_string()))?;

    Ok(Request {
        operation: captures[1].to_string(),
        txn,
        resource: captures.get(3).map(|m| m.as_str().to_string()),
    })
}
