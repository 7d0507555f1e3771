//! Append-only audit log of processed requests.
//!
//! Each processed command line becomes one JSON object on its own line
//! (NDJSON) in the configured events file.
//!
//! # Event Format
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: `start`, `end`, `s_lock`, `x_lock`, `unlock`, or `rejected`
//! - `actor`: the owner string (e.g., `user@HOST`)
//! - `txn`: transaction id, when the line could be parsed
//! - `resource`: resource name, when present
//! - `details`: `{"output": [...]}` for handled requests, `{"error": "..."}` for
//!   rejected ones

use crate::codec::Request;
use crate::error::{LockError, Result};
use crate::manager::{Operation, TxnId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    Start,
    End,
    SLock,
    XLock,
    Unlock,
    /// The line was malformed or the request failed.
    Rejected,
}

impl From<Operation> for EventAction {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Start => EventAction::Start,
            Operation::End => EventAction::End,
            Operation::SLock => EventAction::SLock,
            Operation::XLock => EventAction::XLock,
            Operation::Unlock => EventAction::Unlock,
        }
    }
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Start => write!(f, "start"),
            EventAction::End => write!(f, "end"),
            EventAction::SLock => write!(f, "s_lock"),
            EventAction::XLock => write!(f, "x_lock"),
            EventAction::Unlock => write!(f, "unlock"),
            EventAction::Rejected => write!(f, "rejected"),
        }
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    pub action: EventAction,

    /// The actor running the lock manager (e.g., `user@HOST`).
    pub actor: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub txn: Option<TxnId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event with the given action.
    ///
    /// The timestamp is set to the current time, and the actor is
    /// determined from the environment (USER@HOSTNAME).
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            txn: None,
            resource: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Event for a request that was handled, carrying its rendered output.
    pub fn handled(request: &Request, operation: Operation, output: &[String]) -> Self {
        Self::new(operation.into())
            .with_request(request)
            .with_details(json!({ "output": output }))
    }

    /// Event for a line that was rejected, with the request if it parsed.
    pub fn rejected(request: Option<&Request>, line: &str, error: &LockError) -> Self {
        let event = Self::new(EventAction::Rejected).with_details(json!({
            "line": line,
            "error": error.to_string(),
        }));
        match request {
            Some(request) => event.with_request(request),
            None => event,
        }
    }

    pub fn with_request(mut self, request: &Request) -> Self {
        self.txn = Some(request.txn);
        self.resource = request.resource.clone();
        self
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| LockError::Io(format!("failed to serialize event to JSON: {}", e)))
    }
}

/// Get the actor string for event metadata.
fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok();
    let host = hostname::get()
        .ok()
        .map(|h| h.to_string_lossy().to_string());

    format_actor(user, host)
}

fn format_actor(user: Option<String>, host: Option<String>) -> String {
    format!(
        "{}@{}",
        user.unwrap_or_else(|| "unknown".to_string()),
        host.unwrap_or_else(|| "unknown".to_string())
    )
}

/// NDJSON events file.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event as one JSON line, creating the file and its parent
    /// directory if needed.
    pub fn append(&self, event: &Event) -> Result<()> {
        let json_line = event.to_ndjson_line()?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                LockError::Io(format!(
                    "failed to create events directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                LockError::Io(format!(
                    "failed to open events file '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;

        writeln!(file, "{}", json_line).map_err(|e| {
            LockError::Io(format!(
                "failed to write event to '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Append an event, downgrading failure to a warning on stderr.
    pub fn record(&self, event: &Event) {
        if let Err(e) = self.append(event) {
            eprintln!("Warning: {}", e);
        }
    }

    /// Read all events back, oldest first.
    pub fn read_all(&self) -> Result<Vec<Event>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            LockError::Io(format!(
                "failed to read events file '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .map_err(|e| LockError::Io(format!("failed to parse event line: {}", e)))
            })
            .collect()
    }
}
