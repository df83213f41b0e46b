//! Cross-reference resolution between the two systems.
//!
//! A booking customer points at CRM contacts through its `External ID` field;
//! a CRM contact points back through its booking URI property.

use bridge_traits::{BookingCustomer, CrmContact, EXTERNAL_ID_SEPARATOR};

/// A resolved one-to-one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReference {
    pub booking_uri: String,
    pub crm_id: String,
}

/// What a booking customer's external id says about its CRM counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundIdentity {
    /// Exactly one CRM id
    Linked(CrossReference),
    /// No CRM id recorded
    Unlinked,
    /// Several CRM ids, left behind by a merge
    Ambiguous(Vec<String>),
}

impl OutboundIdentity {
    pub fn crm_id(&self) -> Option<&str> {
        match self {
            OutboundIdentity::Linked(link) => Some(&link.crm_id),
            _ => None,
        }
    }
}

/// All CRM ids recorded on a booking customer.
pub fn crm_ids(customer: &BookingCustomer) -> Vec<String> {
    customer
        .external_id
        .as_deref()
        .map(|raw| {
            raw.split(EXTERNAL_ID_SEPARATOR)
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn resolve_outbound(customer: &BookingCustomer) -> OutboundIdentity {
    let mut ids = crm_ids(customer);
    match ids.len() {
        0 => OutboundIdentity::Unlinked,
        1 => OutboundIdentity::Linked(CrossReference {
            booking_uri: customer.uri.clone(),
            crm_id: ids.remove(0),
        }),
        _ => OutboundIdentity::Ambiguous(ids),
    }
}

pub fn resolve_inbound(contact: &CrmContact) -> Option<CrossReference> {
    contact
        .properties
        .linked_booking_uri()
        .map(|uri| CrossReference {
            booking_uri: uri.to_string(),
            crm_id: contact.id.clone(),
        })
}
