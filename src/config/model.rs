//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a lockman run.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Grant sweep policy applied when a lock is released.
    #[serde(default)]
    pub grant_policy: GrantPolicy,

    /// Drop lock-table and wait-queue entries of resources that no longer
    /// have holders or waiters.
    #[serde(default = "default_true")]
    pub compact_idle_resources: bool,

    /// Print a short prompt on stderr when reading commands from a terminal.
    #[serde(default = "default_true")]
    pub interactive_banner: bool,

    /// Append an NDJSON audit record per processed line to this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grant_policy: GrantPolicy::default(),
            compact_idle_resources: default_true(),
            interactive_banner: default_true(),
            events_path: None,
        }
    }
}
