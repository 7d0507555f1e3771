//! Outcome rendering.

use super::parse::Request;
use crate::manager::{Mode, Outcome};

/// Render every outcome of `request`, one status line each.
pub fn render_outcomes(request: &Request, outcomes: &[Outcome]) -> Vec<String> {
    outcomes
        .iter()
        .map(|outcome| render_outcome(request, outcome))
        .collect()
}

/// Render a single outcome of `request` as a status line.
pub fn render_outcome(request: &Request, outcome: &Outcome) -> String {
    let txn = request.txn;
    let prefix = request.command();

    match outcome {
        Outcome::TransactionStarted => format!("Start {} : Transaction {} started", txn, txn),
        Outcome::TransactionEnded => format!("End {} : Transaction {} ended", txn, txn),
        Outcome::LockGranted(_) => format!("{}: Lock granted", prefix),
        Outcome::LockUpgraded => format!("{}: Lock upgraded", prefix),
        Outcome::AlreadyHeld(_) => format!("{}: Lock already held", prefix),
        Outcome::Waiting {
            blocker,
            blocker_mode,
            ..
        } => format!(
            "{}: Waiting for lock ({}-lock held by: {})",
            prefix, blocker_mode, blocker
        ),
        Outcome::WaitingForUpgrade(blocker) => format!(
            "{}: Waiting for lock upgrade ({}-lock held by: {})",
            prefix,
            Mode::Shared,
            blocker
        ),
        Outcome::Unlocked(_) => format!("{}: Lock released", prefix),
        Outcome::NotLockedByCaller => {
            format!("{}: Lock not held by transaction {}", prefix, txn)
        }
        Outcome::NothingToUnlock => match &request.resource {
            Some(resource) => format!("{}: No lock held on {}", prefix, resource),
            None => format!("{}: No lock held", prefix),
        },
        Outcome::LockGrantedToWaiter { txn, mode } => format!("{}-Lock granted to {}", mode, txn),
        Outcome::LockUpgradedForWaiter(txn) => {
            format!("{}-Lock upgraded for {}", Mode::Exclusive, txn)
        }
        Outcome::Release { resource, outcome } => render_release(request, resource, outcome),
    }
}

fn render_release(request: &Request, resource: &str, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Unlocked(mode) => format!("Release {}-lock on {}", mode, resource),
        Outcome::LockGrantedToWaiter { txn, mode } => {
            format!("{}-Lock on {} granted to {}", mode, resource, txn)
        }
        Outcome::LockUpgradedForWaiter(txn) => {
            format!("{}-Lock on {} upgraded for {}", Mode::Exclusive, resource, txn)
        }
        other => render_outcome(
            &Request::new("Unlock", request.txn, Some(resource)),
            other,
        ),
    }
}
