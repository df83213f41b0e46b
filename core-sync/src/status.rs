//! Sync status marker shared by both systems.
//!
//! Each side carries a free-text status field rewritten by whichever side
//! wrote last. It holds either a timestamped success marker or an error marker
//! naming the offending value.

use bridge_traits::Clock;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

/// Token that marks a status text as an error.
pub const ERROR_TOKEN: &str = "Error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Rendered as `Last synced: <RFC 3339 timestamp>`
    Synced(DateTime<Utc>),
    /// Rendered as `Error: <message>`
    Error(String),
}

impl SyncStatus {
    pub fn synced_now(clock: &dyn Clock) -> Self {
        SyncStatus::Synced(clock.now())
    }

    /// Error marker for a primary e-mail the CRM cannot hold.
    pub fn invalid_email(value: &str) -> Self {
        SyncStatus::Error(format!("Invalid email {}", value))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SyncStatus::Error(_))
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Synced(at) => write!(
                f,
                "Last synced: {}",
                at.to_rfc3339_opts(SecondsFormat::Micros, true)
            ),
            SyncStatus::Error(message) => write!(f, "{}: {}", ERROR_TOKEN, message),
        }
    }
}

/// Whether a raw status text carries the error token.
pub fn is_error_text(text: &str) -> bool {
    text.contains(ERROR_TOKEN)
}
