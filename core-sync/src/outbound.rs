//! # Outbound Orchestrator
//!
//! Propagates booking customers into the CRM.
//!
//! ## Paths
//!
//! - **Sweep** ([`OutboundOrchestrator::sync_customer`]): the listed snapshot
//!   is pushed as-is. A linked contact is rewritten unconditionally, the way a
//!   full resync is expected to repair drift.
//! - **Notification** ([`OutboundOrchestrator::sync_by_uri`]): the customer is
//!   re-read and the linked contact is only written when the Change Detector
//!   reports a material difference.
//!
//! Both paths create a new contact when the customer has no single CRM id,
//! and archive every contact pointing at a deleted customer.

use crate::change::needs_crm_write;
use crate::context::SyncContext;
use crate::error::Result;
use crate::identity::{resolve_outbound, OutboundIdentity};
use crate::locks::booking_key;
use crate::outcome::{SkipReason, SyncOutcome};
use crate::translator::booking_to_crm;
use crate::validity::gate_outbound;
use bridge_traits::{BookingAttributes, BookingCustomer, CrmProperties, Fetched};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Clone)]
pub struct OutboundOrchestrator {
    ctx: Arc<SyncContext>,
}

impl OutboundOrchestrator {
    pub fn new(ctx: Arc<SyncContext>) -> Self {
        Self { ctx }
    }

    /// Reconcile one customer from a sweep listing.
    #[instrument(skip(self, customer), fields(record = %customer.uri))]
    pub async fn sync_customer(&self, customer: BookingCustomer) -> Result<SyncOutcome> {
        let _guard = self.ctx.locks.acquire(&booking_key(&customer.uri)).await;

        if customer.deleted {
            return archive_counterparts(&self.ctx, &customer.uri).await;
        }

        let properties = self.gated_properties(&customer);

        match resolve_outbound(&customer) {
            OutboundIdentity::Linked(link) => {
                self.ctx.crm.update(&link.crm_id, &properties).await?;
                self.write_status(&customer.uri, &properties).await?;
                Ok(SyncOutcome::Updated)
            }
            identity => {
                self.create_counterpart(&customer.uri, &properties, &identity)
                    .await
            }
        }
    }

    /// Reconcile one customer named by a notification.
    #[instrument(skip(self))]
    pub async fn sync_by_uri(&self, uri: &str) -> Result<SyncOutcome> {
        let _guard = self.ctx.locks.acquire(&booking_key(uri)).await;

        let customer = match self.ctx.booking.fetch_one(uri).await? {
            Fetched::Found(customer) if !customer.deleted => customer,
            _ => {
                debug!("Customer gone from booking system");
                return archive_counterparts(&self.ctx, uri).await;
            }
        };

        let properties = self.gated_properties(&customer);
        let identity = resolve_outbound(&customer);

        if let Some(crm_id) = identity.crm_id() {
            match self.ctx.crm.fetch_one(crm_id, false).await? {
                Fetched::Found(current) => {
                    if !needs_crm_write(&current.properties, &properties) {
                        return Ok(SyncOutcome::Skipped(SkipReason::NoChanges));
                    }
                    self.ctx.crm.update(crm_id, &properties).await?;
                    self.write_status(uri, &properties).await?;
                    return Ok(SyncOutcome::Updated);
                }
                Fetched::NotFound => {
                    warn!(crm_id, "Linked contact no longer exists, creating a new one");
                }
            }
        }

        self.create_counterpart(uri, &properties, &identity).await
    }

    /// Archive every CRM contact linked to a removed customer.
    #[instrument(skip(self))]
    pub async fn remove(&self, uri: &str) -> Result<SyncOutcome> {
        let _guard = self.ctx.locks.acquire(&booking_key(uri)).await;
        archive_counterparts(&self.ctx, uri).await
    }

    fn gated_properties(&self, customer: &BookingCustomer) -> CrmProperties {
        let now = self.ctx.now();
        let mut properties = booking_to_crm(customer, now);
        gate_outbound(&mut properties, now);
        properties
    }

    async fn create_counterpart(
        &self,
        uri: &str,
        properties: &CrmProperties,
        identity: &OutboundIdentity,
    ) -> Result<SyncOutcome> {
        if let OutboundIdentity::Ambiguous(ids) = identity {
            warn!(?ids, "External ID names several contacts, creating a new one");
        }

        let crm_id = self.ctx.crm.create(properties).await?;
        debug!(%crm_id, "Created CRM contact");

        let mut attributes = status_of(properties);
        if self.ctx.options.track_external_ids {
            attributes = attributes.with_external_id(crm_id);
        }
        self.ctx.booking.update(uri, &attributes).await?;

        Ok(SyncOutcome::Created)
    }

    async fn write_status(&self, uri: &str, properties: &CrmProperties) -> Result<()> {
        self.ctx.booking.update(uri, &status_of(properties)).await?;
        Ok(())
    }
}

fn status_of(properties: &CrmProperties) -> BookingAttributes {
    BookingAttributes::status_only(properties.sync_status.clone().unwrap_or_default())
}

/// Archive the live CRM contacts whose cross-reference holds `uri`.
///
/// Callers must hold the record lock for `uri`.
pub(crate) async fn archive_counterparts(ctx: &SyncContext, uri: &str) -> Result<SyncOutcome> {
    let linked: Vec<_> = ctx
        .crm
        .find_by_cross_ref(uri)
        .await?
        .into_iter()
        .filter(|contact| !contact.archived)
        .collect();

    if linked.is_empty() {
        return Ok(SyncOutcome::Skipped(SkipReason::NothingToDelete));
    }

    for contact in &linked {
        ctx.crm.archive(&contact.id).await?;
        debug!(crm_id = %contact.id, "Archived CRM contact");
    }

    Ok(SyncOutcome::Deleted)
}
