//! # Reconciliation Engine
//!
//! Keeps booking-system customers and CRM contacts in agreement.
//!
//! ## Overview
//!
//! Changes flow both ways. Booking customers are pushed into the CRM
//! (outbound) and CRM contacts are pulled into the booking system (inbound),
//! either by a full sweep over both collections or one record at a time in
//! response to change notifications.
//!
//! ## Components
//!
//! - **Record Translator** (`translator`): Pure field mapping between the two record shapes
//! - **Cross-references** (`identity`): Resolves which record on the other side a record is linked to
//! - **Validity Gate** (`validity`): Keeps invalid primary e-mails out of the CRM without losing them
//! - **Change Detector** (`change`): Suppresses no-op writes so the systems do not echo each other
//! - **Pagination Walker** (`pagination`): Drives cursor-paged listings with cancellation
//! - **Orchestrators** (`outbound`, `inbound`): Per-record decision trees for each direction
//! - **Notification Dispatcher** (`dispatcher`): Bounded-concurrency handling of webhook deliveries
//! - **Sync Coordinator** (`coordinator`): Full reconciliation over all four sweep legs

pub mod change;
pub mod context;
pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod identity;
pub mod inbound;
pub mod locks;
pub mod outbound;
pub mod outcome;
pub mod pagination;
pub mod source;
pub mod status;
pub mod translator;
pub mod validity;

pub use context::{SyncContext, SyncOptions};
pub use coordinator::{FullSyncReport, LegReport, SyncCoordinator};
pub use dispatcher::{BatchReport, NotificationDispatcher};
pub use error::{Result, SyncError};
pub use identity::{CrossReference, OutboundIdentity};
pub use inbound::InboundOrchestrator;
pub use outbound::OutboundOrchestrator;
pub use outcome::{SkipReason, SyncOutcome};
pub use pagination::{walk_pages, SweepStats};
pub use source::{notification_channel, ChannelNotificationSource, NotificationSender};
pub use status::SyncStatus;
pub use validity::GateVerdict;

pub use tokio_util::sync::CancellationToken;
