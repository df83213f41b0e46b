//! # Event Bus System
//!
//! Provides an event-driven view of the reconciliation engine using `tokio::sync::broadcast`.
//! Hosts subscribe to observe sweeps and per-record outcomes (including deliberate
//! no-ops) without coupling to the engine's return values.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchy for sync activity
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     emit      ┌───────────┐
//! │ Coordinator  ├──────────────>│           │     subscribe    ┌────────────┐
//! └──────────────┘               │ EventBus  ├─────────────────>│ Subscriber │
//! ┌──────────────┐     emit      │ (broadcast│                  └────────────┘
//! │ Dispatcher   ├──────────────>│  channel) │
//! └──────────────┘               └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, SyncDirection, SyncEvent};
//!
//! let event_bus = EventBus::new(100);
//! let event = CoreEvent::Sync(SyncEvent::RecordSynced {
//!     direction: SyncDirection::Outbound,
//!     record: "https://10to8.com/api/enterprise/v2/customer/1/".to_string(),
//!     action: "skipped:no_changes".to_string(),
//! });
//!
//! // Emission never blocks; with no subscribers the event is dropped.
//! event_bus.emit(event).ok();
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   This is non-fatal; the subscriber can continue receiving new events.
//! - **`RecvError::Closed`**: All senders have been dropped. This indicates shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Sync-related events
    Sync(SyncEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Sync(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Sync(SyncEvent::RecordFailed { .. })
            | CoreEvent::Sync(SyncEvent::SweepFailed { .. }) => EventSeverity::Error,
            CoreEvent::Sync(SyncEvent::SweepCancelled { .. }) => EventSeverity::Warning,
            CoreEvent::Sync(SyncEvent::NotificationsProcessed { failed, .. }) if *failed > 0 => {
                EventSeverity::Warning
            }
            CoreEvent::Sync(SyncEvent::SweepCompleted { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Sync Events
// ============================================================================

/// Direction of propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    /// Booking system to CRM
    Outbound,
    /// CRM to booking system
    Inbound,
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncDirection::Outbound => write!(f, "outbound"),
            SyncDirection::Inbound => write!(f, "inbound"),
        }
    }
}

/// One cursor space walked by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepLeg {
    /// Live booking customers pushed to the CRM
    OutboundLive,
    /// Deleted booking customers archived in the CRM
    OutboundDeleted,
    /// Live CRM contacts pulled into the booking system
    InboundLive,
    /// Archived CRM contacts deleted from the booking system
    InboundArchived,
}

impl SweepLeg {
    /// Legs in the order a full sync runs them.
    pub const ALL: [SweepLeg; 4] = [
        SweepLeg::OutboundLive,
        SweepLeg::OutboundDeleted,
        SweepLeg::InboundLive,
        SweepLeg::InboundArchived,
    ];

    pub fn direction(&self) -> SyncDirection {
        match self {
            SweepLeg::OutboundLive | SweepLeg::OutboundDeleted => SyncDirection::Outbound,
            SweepLeg::InboundLive | SweepLeg::InboundArchived => SyncDirection::Inbound,
        }
    }

    /// Whether this leg walks removed (deleted/archived) records.
    pub fn removed(&self) -> bool {
        matches!(self, SweepLeg::OutboundDeleted | SweepLeg::InboundArchived)
    }
}

impl fmt::Display for SweepLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SweepLeg::OutboundLive => "outbound_live",
            SweepLeg::OutboundDeleted => "outbound_deleted",
            SweepLeg::InboundLive => "inbound_live",
            SweepLeg::InboundArchived => "inbound_archived",
        };
        f.write_str(name)
    }
}

/// Counters reported when a sweep leg finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepCounts {
    pub processed: u64,
    pub created: u64,
    pub updated: u64,
    pub deleted: u64,
    pub skipped: u64,
    pub failed: u64,
    pub pages: u64,
}

/// Events related to reconciliation between the two systems.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// A sweep leg started.
    SweepStarted {
        /// Identifier shared by every leg of one full sync.
        run_id: String,
        leg: SweepLeg,
    },
    /// A single record was reconciled.
    RecordSynced {
        direction: SyncDirection,
        /// Booking URI or CRM id of the source record.
        record: String,
        /// `created`, `updated`, `deleted` or `skipped:<reason>`.
        action: String,
    },
    /// A single record could not be reconciled; the sweep or batch continues.
    RecordFailed {
        direction: SyncDirection,
        record: String,
        message: String,
    },
    /// A sweep leg walked its whole cursor space.
    SweepCompleted {
        run_id: String,
        leg: SweepLeg,
        counts: SweepCounts,
    },
    /// A sweep leg stopped early because cancellation was requested.
    SweepCancelled {
        run_id: String,
        leg: SweepLeg,
        counts: SweepCounts,
    },
    /// A sweep leg stopped because a page could not be fetched.
    SweepFailed {
        run_id: String,
        leg: SweepLeg,
        counts: SweepCounts,
        message: String,
    },
    /// A batch of notifications finished.
    NotificationsProcessed { processed: u64, failed: u64 },
}

impl SyncEvent {
    fn description(&self) -> &str {
        match self {
            SyncEvent::SweepStarted { .. } => "Sweep started",
            SyncEvent::RecordSynced { .. } => "Record reconciled",
            SyncEvent::RecordFailed { .. } => "Record failed to reconcile",
            SyncEvent::SweepCompleted { .. } => "Sweep completed",
            SyncEvent::SweepCancelled { .. } => "Sweep cancelled",
            SyncEvent::SweepFailed { .. } => "Sweep aborted",
            SyncEvent::NotificationsProcessed { .. } => "Notification batch processed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// When a subscriber falls behind by more than `capacity` events it
    /// receives a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with additional filtering capabilities.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream, SyncEvent};
///
/// let event_bus = EventBus::new(100);
/// let failures = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Sync(SyncEvent::RecordFailed { .. })));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
