//! Lifecycle state definitions for audit batches

use std::fmt;

/// Represents the current state of a batch of runs
///
/// There is no failed state for a batch: a batch whose runs all failed is
/// still completed, with its `failed` counter equal to its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchStatus {
    /// Batch is created, processing has not started yet
    Queued,

    /// Runs are being dispatched
    Running,

    /// Every run reached a terminal state
    Completed,
}

impl BatchStatus {
    /// Returns true if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns true if moving from `self` to `next` is a forward transition
    pub fn can_transition_to(&self, next: BatchStatus) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Running) | (Self::Running, Self::Completed)
        )
    }

    /// Converts the batch status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
        }
    }

    /// Parses a batch status from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "QUEUED" => Some(Self::Queued),
            "RUNNING" => Some(Self::Running),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
