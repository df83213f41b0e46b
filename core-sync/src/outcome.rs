use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Created,
    Updated,
    Deleted,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Target already matches
    NoChanges,
    /// Nothing links the record to the other system
    NotLinked,
    /// Create requested for a record that already has a counterpart
    AlreadyLinked,
    /// Delete found no counterpart
    NothingToDelete,
    /// Record vanished before it could be read
    NotFound,
    /// Live record listed alongside deleted ones
    NotDeleted,
}

impl SyncOutcome {
    pub fn action(&self) -> String {
        self.to_string()
    }

    pub fn is_write(&self) -> bool {
        !matches!(self, SyncOutcome::Skipped(_))
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Created => write!(f, "created"),
            SyncOutcome::Updated => write!(f, "updated"),
            SyncOutcome::Deleted => write!(f, "deleted"),
            SyncOutcome::Skipped(reason) => write!(f, "skipped:{}", reason),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::NoChanges => "no_changes",
            SkipReason::NotLinked => "not_linked",
            SkipReason::AlreadyLinked => "already_linked",
            SkipReason::NothingToDelete => "nothing_to_delete",
            SkipReason::NotFound => "not_found",
            SkipReason::NotDeleted => "not_deleted",
        };
        write!(f, "{}", text)
    }
}
