//! # Sync Coordinator
//!
//! Runs a full reconciliation between the booking system and the CRM.
//!
//! ## Workflow
//!
//! A full sync walks four cursor spaces in order:
//! 1. Live booking customers, pushed to the CRM
//! 2. Deleted booking customers, archived in the CRM
//! 3. Live CRM contacts, pulled into the booking system
//! 4. Archived CRM contacts, deleted from the booking system
//!
//! Each leg reports its own [`SweepStats`]. A record that fails is logged and
//! counted and the leg carries on; a page that cannot be fetched ends its leg
//! and the next leg starts. Cancellation stops the sweep between records.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::SyncCoordinator;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(coordinator: SyncCoordinator) {
//! let cancel = CancellationToken::new();
//! let report = coordinator.full_sync(&cancel).await;
//! println!("{} records failed", report.totals().failed);
//! # }
//! ```

use crate::context::SyncContext;
use crate::error::Result;
use crate::inbound::InboundOrchestrator;
use crate::outbound::OutboundOrchestrator;
use crate::outcome::{SkipReason, SyncOutcome};
use crate::pagination::{walk_pages, SweepStats};
use bridge_traits::{BookingCustomer, CrmContact};
use core_runtime::events::{CoreEvent, SweepCounts, SweepLeg, SyncDirection, SyncEvent};
use futures::FutureExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Result of one sweep leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegReport {
    pub leg: SweepLeg,
    pub stats: SweepStats,
    /// Set when a page fetch ended the leg early
    pub error: Option<String>,
}

/// Result of a full sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullSyncReport {
    pub run_id: String,
    /// Legs that ran, in order
    pub legs: Vec<LegReport>,
}

impl FullSyncReport {
    pub fn leg(&self, leg: SweepLeg) -> Option<&LegReport> {
        self.legs.iter().find(|report| report.leg == leg)
    }

    pub fn cancelled(&self) -> bool {
        self.legs.iter().any(|report| report.stats.cancelled)
    }

    /// Counts summed over every leg.
    pub fn totals(&self) -> SweepCounts {
        self.legs
            .iter()
            .fold(SweepCounts::default(), |mut total, report| {
                let counts = &report.stats.counts;
                total.processed += counts.processed;
                total.created += counts.created;
                total.updated += counts.updated;
                total.deleted += counts.deleted;
                total.skipped += counts.skipped;
                total.failed += counts.failed;
                total.pages += counts.pages;
                total
            })
    }
}

#[derive(Clone)]
pub struct SyncCoordinator {
    ctx: Arc<SyncContext>,
    outbound: OutboundOrchestrator,
    inbound: InboundOrchestrator,
}

impl SyncCoordinator {
    pub fn new(ctx: Arc<SyncContext>) -> Self {
        Self {
            outbound: OutboundOrchestrator::new(ctx.clone()),
            inbound: InboundOrchestrator::new(ctx.clone()),
            ctx,
        }
    }

    /// Run every sweep leg in order.
    #[instrument(skip(self, cancel))]
    pub async fn full_sync(&self, cancel: &CancellationToken) -> FullSyncReport {
        let run_id = Uuid::new_v4().to_string();
        info!(%run_id, "Starting full reconciliation");

        let mut legs = Vec::with_capacity(SweepLeg::ALL.len());
        for leg in SweepLeg::ALL {
            let report = self.run_leg(&run_id, leg, cancel).await;
            let stop = report.stats.cancelled;
            legs.push(report);
            if stop {
                break;
            }
        }

        let report = FullSyncReport { run_id, legs };
        let totals = report.totals();
        info!(
            run_id = %report.run_id,
            processed = totals.processed,
            failed = totals.failed,
            cancelled = report.cancelled(),
            "Full reconciliation finished"
        );
        report
    }

    /// Run a single sweep leg.
    #[instrument(skip(self, cancel), fields(leg = %leg))]
    pub async fn run_leg(
        &self,
        run_id: &str,
        leg: SweepLeg,
        cancel: &CancellationToken,
    ) -> LegReport {
        self.emit(SyncEvent::SweepStarted {
            run_id: run_id.to_string(),
            leg,
        });

        let mut stats = SweepStats::default();
        let result = match leg.direction() {
            SyncDirection::Outbound => self.sweep_booking(leg.removed(), cancel, &mut stats).await,
            SyncDirection::Inbound => self.sweep_crm(leg.removed(), cancel, &mut stats).await,
        };

        let counts = stats.counts;
        let error = match result {
            Ok(()) if stats.cancelled => {
                warn!(processed = counts.processed, "Sweep leg cancelled");
                self.emit(SyncEvent::SweepCancelled {
                    run_id: run_id.to_string(),
                    leg,
                    counts,
                });
                None
            }
            Ok(()) => {
                info!(
                    pages = counts.pages,
                    processed = counts.processed,
                    created = counts.created,
                    updated = counts.updated,
                    deleted = counts.deleted,
                    failed = counts.failed,
                    "Sweep leg completed"
                );
                self.emit(SyncEvent::SweepCompleted {
                    run_id: run_id.to_string(),
                    leg,
                    counts,
                });
                None
            }
            Err(e) => {
                error!(error = %e, "Sweep leg aborted");
                self.emit(SyncEvent::SweepFailed {
                    run_id: run_id.to_string(),
                    leg,
                    counts,
                    message: e.to_string(),
                });
                Some(e.to_string())
            }
        };

        LegReport { leg, stats, error }
    }

    async fn sweep_booking(
        &self,
        deleted: bool,
        cancel: &CancellationToken,
        stats: &mut SweepStats,
    ) -> Result<()> {
        let booking = self.ctx.booking.as_ref();
        let page_size = self.ctx.options.page_size;
        let ctx = self.ctx.as_ref();
        let outbound = &self.outbound;

        walk_pages(
            None,
            |cursor| booking.fetch_page(cursor, page_size, deleted),
            |customer: BookingCustomer| {
                async move {
                    // The deleted listing repeats live customers
                    if deleted && !customer.deleted {
                        return Some(SyncOutcome::Skipped(SkipReason::NotDeleted));
                    }
                    let uri = customer.uri.clone();
                    let result = outbound.sync_customer(customer).await;
                    ctx.report(SyncDirection::Outbound, &uri, result)
                }
                .boxed()
            },
            cancel,
            stats,
        )
        .await
    }

    async fn sweep_crm(
        &self,
        archived: bool,
        cancel: &CancellationToken,
        stats: &mut SweepStats,
    ) -> Result<()> {
        let crm = self.ctx.crm.as_ref();
        let page_size = self.ctx.options.page_size;
        let ctx = self.ctx.as_ref();
        let inbound = &self.inbound;

        walk_pages(
            None,
            |cursor| crm.fetch_page(cursor, page_size, archived),
            |contact: CrmContact| {
                async move {
                    let id = contact.id.clone();
                    let result = inbound.sync_contact(contact).await;
                    ctx.report(SyncDirection::Inbound, &id, result)
                }
                .boxed()
            },
            cancel,
            stats,
        )
        .await
    }

    fn emit(&self, event: SyncEvent) {
        self.ctx.event_bus.emit(CoreEvent::Sync(event)).ok();
    }
}
