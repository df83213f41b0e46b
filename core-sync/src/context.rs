//! Shared state for the orchestrators, dispatcher and coordinator.

use crate::error::{Result, SyncError};
use crate::locks::RecordLocks;
use crate::outcome::SyncOutcome;
use bridge_traits::{BookingStore, Clock, CrmStore};
use chrono::{DateTime, Utc};
use core_runtime::config::SyncSettings;
use core_runtime::events::{CoreEvent, EventBus, SyncDirection, SyncEvent};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Engine behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Write each side's identifier into the other after a create
    pub track_external_ids: bool,
    /// Records requested per page during sweeps
    pub page_size: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            track_external_ids: true,
            page_size: 10,
        }
    }
}

impl From<&SyncSettings> for SyncOptions {
    fn from(settings: &SyncSettings) -> Self {
        Self {
            track_external_ids: settings.track_external_ids,
            page_size: settings.page_size,
        }
    }
}

/// Stores, clock, options and locks shared by every sync path.
pub struct SyncContext {
    pub(crate) booking: Arc<dyn BookingStore>,
    pub(crate) crm: Arc<dyn CrmStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) options: SyncOptions,
    pub(crate) locks: RecordLocks,
    pub(crate) event_bus: Arc<EventBus>,
}

impl SyncContext {
    pub fn new(
        booking: Arc<dyn BookingStore>,
        crm: Arc<dyn CrmStore>,
        clock: Arc<dyn Clock>,
        options: SyncOptions,
        event_bus: Arc<EventBus>,
    ) -> Result<Self> {
        if options.page_size == 0 {
            return Err(SyncError::Config(
                "page size must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            booking,
            crm,
            clock,
            options,
            locks: RecordLocks::new(),
            event_bus,
        })
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Log and publish the result of one record. Failures are contained here;
    /// the caller only learns whether the record succeeded.
    pub(crate) fn report(
        &self,
        direction: SyncDirection,
        record: &str,
        result: Result<SyncOutcome>,
    ) -> Option<SyncOutcome> {
        match result {
            Ok(outcome) => {
                if outcome.is_write() {
                    info!(%direction, record, action = %outcome, "Record reconciled");
                } else {
                    debug!(%direction, record, action = %outcome, "Record left unchanged");
                }
                self.event_bus
                    .emit(CoreEvent::Sync(SyncEvent::RecordSynced {
                        direction,
                        record: record.to_string(),
                        action: outcome.action(),
                    }))
                    .ok();
                Some(outcome)
            }
            Err(e) => {
                warn!(%direction, record, error = %e, "Record failed to reconcile");
                self.event_bus
                    .emit(CoreEvent::Sync(SyncEvent::RecordFailed {
                        direction,
                        record: record.to_string(),
                        message: e.to_string(),
                    }))
                    .ok();
                None
            }
        }
    }
}
