/// Task status definitions for tracking crawl progress
///
/// A task moves through its states strictly in order and never goes back.
use std::fmt;

/// Represents the lifecycle state of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskStatus {
    /// Task has been created but its workers have not been launched
    NotStarted,

    /// Header row is written and workers are running
    InProgress,

    /// Every worker has returned; the result buffer is final
    Completed,
}

impl TaskStatus {
    /// Returns true if the result buffer will no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns true if `next` is the single state that may follow this one
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::InProgress) | (Self::InProgress, Self::Completed)
        )
    }

    /// Human-readable status string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
