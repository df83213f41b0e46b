//! Change Notifications
//!
//! Out-of-band change notifications delivered by either system's webhooks.
//! Delivery is at-least-once and unordered across unrelated records.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// What happened to the referenced record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Created,
    Updated,
    Deleted,
}

/// System that owns the referenced record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSystem {
    /// Booking system; `record_ref` is a customer URI
    Booking,
    /// CRM; `record_ref` is a contact id
    Crm,
}

impl fmt::Display for RecordSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSystem::Booking => write!(f, "booking"),
            RecordSystem::Crm => write!(f, "crm"),
        }
    }
}

/// A single change notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub record_ref: String,
    pub system: RecordSystem,
}

impl Notification {
    pub fn booking(kind: NotificationKind, uri: impl Into<String>) -> Self {
        Self {
            kind,
            record_ref: uri.into(),
            system: RecordSystem::Booking,
        }
    }

    pub fn crm(kind: NotificationKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            record_ref: id.into(),
            system: RecordSystem::Crm,
        }
    }
}

/// Lazy, unbounded sequence of notification deliveries.
///
/// Each call yields one delivery (a batch as received from a webhook call).
/// `Ok(None)` means the source is exhausted.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    async fn next_delivery(&self) -> Result<Option<Vec<Notification>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_constructors() {
        let booking = Notification::booking(NotificationKind::Updated, "uri-1");
        assert_eq!(booking.system, RecordSystem::Booking);
        assert_eq!(booking.record_ref, "uri-1");

        let crm = Notification::crm(NotificationKind::Deleted, "501");
        assert_eq!(crm.system, RecordSystem::Crm);
        assert_eq!(crm.kind, NotificationKind::Deleted);
        assert_eq!(crm.system.to_string(), "crm");
    }
}
