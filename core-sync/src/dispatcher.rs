//! # Notification Dispatcher
//!
//! Runs the single-record sync path for each change notification. A delivery
//! is processed with bounded concurrency; notifications for the same record
//! are serialized by the record locks, and a failing notification never
//! affects the others in its delivery.

use crate::context::SyncContext;
use crate::error::{Result, SyncError};
use crate::inbound::InboundOrchestrator;
use crate::outbound::OutboundOrchestrator;
use crate::outcome::SyncOutcome;
use bridge_traits::{Notification, NotificationKind, NotificationSource, RecordSystem};
use core_runtime::events::{CoreEvent, SyncDirection, SyncEvent};
use std::collections::HashSet;
use std::ops::AddAssign;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Totals for one or more deliveries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: u64,
    pub failed: u64,
}

impl AddAssign for BatchReport {
    fn add_assign(&mut self, other: Self) {
        self.processed += other.processed;
        self.failed += other.failed;
    }
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    ctx: Arc<SyncContext>,
    outbound: OutboundOrchestrator,
    inbound: InboundOrchestrator,
    permits: Arc<Semaphore>,
}

impl NotificationDispatcher {
    pub fn new(ctx: Arc<SyncContext>, max_concurrency: usize) -> Self {
        Self {
            outbound: OutboundOrchestrator::new(ctx.clone()),
            inbound: InboundOrchestrator::new(ctx.clone()),
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
            ctx,
        }
    }

    /// Route one notification to its sync path.
    pub async fn handle(&self, notification: &Notification) -> Result<SyncOutcome> {
        let record = notification.record_ref.trim();
        if record.is_empty() {
            return Err(SyncError::InvalidNotification(format!(
                "{} notification without a record reference",
                notification.system
            )));
        }

        match (notification.system, notification.kind) {
            (RecordSystem::Booking, NotificationKind::Deleted) => self.outbound.remove(record).await,
            (RecordSystem::Booking, _) => self.outbound.sync_by_uri(record).await,
            (RecordSystem::Crm, kind) => self.inbound.sync_by_id(record, kind).await,
        }
    }

    /// Process one delivery and wait for every notification in it.
    #[instrument(skip(self, delivery), fields(size = delivery.len()))]
    pub async fn dispatch(&self, delivery: Vec<Notification>) -> BatchReport {
        let mut seen = HashSet::new();
        let mut tasks = JoinSet::new();

        for notification in delivery {
            if !seen.insert(notification.clone()) {
                debug!(record = %notification.record_ref, "Duplicate notification in delivery");
                continue;
            }

            let Ok(permit) = self.permits.clone().acquire_owned().await else {
                break;
            };
            let worker = self.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let direction = match notification.system {
                    RecordSystem::Booking => SyncDirection::Outbound,
                    RecordSystem::Crm => SyncDirection::Inbound,
                };
                let result = worker.handle(&notification).await;
                worker
                    .ctx
                    .report(direction, &notification.record_ref, result)
                    .is_some()
            });
        }

        let mut report = BatchReport::default();
        while let Some(joined) = tasks.join_next().await {
            report.processed += 1;
            match joined {
                Ok(true) => {}
                Ok(false) => report.failed += 1,
                Err(e) => {
                    warn!(error = %e, "Notification task aborted");
                    report.failed += 1;
                }
            }
        }

        info!(
            processed = report.processed,
            failed = report.failed,
            "Notification delivery processed"
        );
        self.ctx
            .event_bus
            .emit(CoreEvent::Sync(SyncEvent::NotificationsProcessed {
                processed: report.processed,
                failed: report.failed,
            }))
            .ok();

        report
    }

    /// Drain `source` until it is exhausted or `cancel` fires.
    ///
    /// A delivery that has started is always finished.
    pub async fn run(
        &self,
        source: &dyn NotificationSource,
        cancel: &CancellationToken,
    ) -> Result<BatchReport> {
        let mut total = BatchReport::default();

        loop {
            let delivery = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Notification processing cancelled");
                    break;
                }
                delivery = source.next_delivery() => delivery?,
            };

            match delivery {
                Some(batch) => total += self.dispatch(batch).await,
                None => break,
            }
        }

        Ok(total)
    }
}
