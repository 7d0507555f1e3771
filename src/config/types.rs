//! Configuration types and defaults for lockman.

use serde::{Deserialize, Serialize};

/// How many waiters a single grant sweep may admit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GrantPolicy {
    /// Grant a run of consecutive shared waiters together; an exclusive
    /// waiter is granted alone and ends the sweep.
    #[default]
    BatchShared,
    /// Grant at most one waiter per release.
    Single,
}

impl GrantPolicy {
    /// Parse a grant policy from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "batch_shared" => Some(Self::BatchShared),
            "single" => Some(Self::Single),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BatchShared => "batch_shared",
            Self::Single => "single",
        }
    }
}

// Default value functions for serde
pub(crate) fn default_true() -> bool {
    true
}
