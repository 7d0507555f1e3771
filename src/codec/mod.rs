//! Text codec for the line protocol.
//!
//! A command line has the shape `<Operation> <TransactionId> [<ResourceName>]`.
//! Parsing only checks that shape; whether the operation word is known is
//! decided by the lock manager. Rendering turns outcome records back into the
//! human-readable status lines.

mod parse;
mod render;


pub use parse::{Request, parse_request};
pub use render::{render_outcome, render_outcomes};

use crate::error::Result;
use crate::manager::{LockManager, Operation};

/// Run a parsed request against `manager` and render the resulting lines.
pub fn execute(manager: &mut LockManager, request: &Request) -> Result<(Operation, Vec<String>)> {
    let operation = request.operation.parse::<Operation>()?;
    let outcomes = manager.process(operation, request.txn, request.resource.as_deref())?;
    Ok((operation, render_outcomes(request, &outcomes)))
}
