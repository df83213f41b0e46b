//! # Inbound Orchestrator
//!
//! Propagates CRM contacts into the booking system.
//!
//! An archived contact removes its linked customer. An unlinked contact
//! creates one. A linked contact rewrites its customer when the Change
//! Detector reports a difference, and the outcome is written back into the
//! contact's sync status.
//!
//! A linked customer that has disappeared is treated as deleted only when a
//! notification names the contact. Sweeps skip it; the outbound deleted leg
//! mirrors booking deletions.

use crate::change::needs_booking_write;
use crate::context::SyncContext;
use crate::error::Result;
use crate::identity::resolve_inbound;
use crate::locks::{booking_key, crm_key, RecordGuard};
use crate::outbound::archive_counterparts;
use crate::outcome::{SkipReason, SyncOutcome};
use crate::translator::{crm_to_booking, InboundCandidate};
use crate::validity::gate_inbound;
use bridge_traits::{CrmContact, CrmProperties, Fetched, NotificationKind};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Clone)]
pub struct InboundOrchestrator {
    ctx: Arc<SyncContext>,
}

impl InboundOrchestrator {
    pub fn new(ctx: Arc<SyncContext>) -> Self {
        Self { ctx }
    }

    /// Reconcile one contact from a sweep listing.
    #[instrument(skip(self, contact), fields(record = %contact.id))]
    pub async fn sync_contact(&self, contact: CrmContact) -> Result<SyncOutcome> {
        let _contact_guard = self.ctx.locks.acquire(&crm_key(&contact.id)).await;
        let _customer_guard = self.lock_linked(&contact).await;

        self.reconcile(contact, false).await
    }

    /// Reconcile one contact named by a notification.
    ///
    /// The contact is re-read first; deletions read archived contacts too.
    #[instrument(skip(self))]
    pub async fn sync_by_id(&self, id: &str, kind: NotificationKind) -> Result<SyncOutcome> {
        let _contact_guard = self.ctx.locks.acquire(&crm_key(id)).await;

        let include_archived = kind == NotificationKind::Deleted;
        let Some(mut contact) = self.fetch_contact(id, include_archived).await? else {
            return Ok(SyncOutcome::Skipped(SkipReason::NotFound));
        };

        let customer_guard = self.lock_linked(&contact).await;
        if customer_guard.is_some() {
            // An outbound writer may have held the customer lock; read again
            match self.fetch_contact(id, include_archived).await? {
                Some(fresh) => contact = fresh,
                None => return Ok(SyncOutcome::Skipped(SkipReason::NotFound)),
            }
        }

        if kind == NotificationKind::Created && !contact.archived {
            let candidate = crm_to_booking(&contact, self.ctx.now());
            return self.create_customer(candidate).await;
        }

        self.reconcile(contact, true).await
    }

    async fn fetch_contact(&self, id: &str, include_archived: bool) -> Result<Option<CrmContact>> {
        Ok(self.ctx.crm.fetch_one(id, include_archived).await?.into_option())
    }

    async fn lock_linked(&self, contact: &CrmContact) -> Option<RecordGuard> {
        match contact.properties.linked_booking_uri() {
            Some(uri) => Some(self.ctx.locks.acquire(&booking_key(uri)).await),
            None => None,
        }
    }

    async fn reconcile(&self, contact: CrmContact, mirror_deletion: bool) -> Result<SyncOutcome> {
        if contact.archived {
            return self.remove_customer(&contact).await;
        }

        let candidate = crm_to_booking(&contact, self.ctx.now());
        match candidate.booking_uri.clone() {
            None => self.create_customer(candidate).await,
            Some(uri) => {
                self.update_customer(&contact, candidate, &uri, mirror_deletion)
                    .await
            }
        }
    }

    async fn remove_customer(&self, contact: &CrmContact) -> Result<SyncOutcome> {
        let Some(link) = resolve_inbound(contact) else {
            return Ok(SyncOutcome::Skipped(SkipReason::NotLinked));
        };

        match self.ctx.booking.delete(&link.booking_uri, true).await {
            Ok(()) => Ok(SyncOutcome::Deleted),
            Err(e) if e.is_not_found() => {
                debug!(uri = %link.booking_uri, "Customer already deleted");
                Ok(SyncOutcome::Skipped(SkipReason::NothingToDelete))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_customer(&self, candidate: InboundCandidate) -> Result<SyncOutcome> {
        if candidate.booking_uri.is_some() {
            return Ok(SyncOutcome::Skipped(SkipReason::AlreadyLinked));
        }

        let track = self.ctx.options.track_external_ids;
        let mut attributes = candidate.attributes;
        if !track {
            attributes.external_id = None;
        }

        let uri = self.ctx.booking.create(&attributes).await?;
        debug!(%uri, "Created booking customer");

        if track {
            let link = CrmProperties::link(uri, attributes.sync_status.clone());
            self.ctx.crm.update(&candidate.crm_id, &link).await?;
        }

        Ok(SyncOutcome::Created)
    }

    async fn update_customer(
        &self,
        contact: &CrmContact,
        mut candidate: InboundCandidate,
        uri: &str,
        mirror_deletion: bool,
    ) -> Result<SyncOutcome> {
        let current = match self.ctx.booking.fetch_one(uri).await? {
            Fetched::Found(customer) if !customer.deleted => customer,
            _ if mirror_deletion => {
                debug!(%uri, "Linked customer gone, mirroring the deletion");
                return archive_counterparts(&self.ctx, uri).await;
            }
            _ => {
                warn!(%uri, "Linked customer gone, skipping update");
                return Ok(SyncOutcome::Skipped(SkipReason::NotFound));
            }
        };

        gate_inbound(&mut candidate, contact.properties.email.as_deref(), &current);

        if !needs_booking_write(&current, &candidate.attributes) {
            return Ok(SyncOutcome::Skipped(SkipReason::NoChanges));
        }

        self.ctx.booking.update(uri, &candidate.attributes).await?;

        let status = CrmProperties::status_only(candidate.attributes.sync_status);
        self.ctx.crm.update(&contact.id, &status).await?;

        Ok(SyncOutcome::Updated)
    }
}
