//! # Change Detector
//!
//! Decides whether a write is materially different from what the target
//! system already holds. Skipping no-op writes is what keeps the two systems
//! from ping-ponging notifications at each other.

use crate::status::is_error_text;
use crate::translator::crm_fields;
use bridge_traits::{BookingAttributes, BookingCustomer, ContactField, CrmProperties};

/// Whether any of `fields` differs between `current` and `candidate`.
///
/// A field that is unset on the current side and empty on the candidate side
/// counts as equal.
pub fn has_changed(current: &CrmProperties, candidate: &CrmProperties, fields: &[ContactField]) -> bool {
    fields.iter().any(|field| {
        let before = current.get(*field);
        let after = candidate.get(*field);
        match (before, after) {
            (None, Some("")) => false,
            _ => before != after,
        }
    })
}

/// Whether the status text differs and either side reports an error.
///
/// Timestamp-only changes between two success statuses do not count.
pub fn has_error_status_transitioned(current: Option<&str>, candidate: Option<&str>) -> bool {
    let (current, candidate) = (current.unwrap_or_default(), candidate.unwrap_or_default());
    current != candidate && (is_error_text(current) || is_error_text(candidate))
}

/// Whether a CRM contact needs rewriting with `candidate`.
pub fn needs_crm_write(current: &CrmProperties, candidate: &CrmProperties) -> bool {
    has_changed(current, candidate, &ContactField::COMPARABLE)
        || has_error_status_transitioned(
            current.sync_status.as_deref(),
            candidate.sync_status.as_deref(),
        )
}

/// Whether a booking customer needs rewriting with `candidate`.
///
/// Both sides are projected onto the CRM's contact fields so that formatting
/// differences the CRM cannot represent (extra spaces in names) do not count.
pub fn needs_booking_write(current: &BookingCustomer, candidate: &BookingAttributes) -> bool {
    let proposed = BookingCustomer {
        name: candidate.name.clone().unwrap_or_else(|| current.name.clone()),
        emails: candidate.emails.clone().unwrap_or_else(|| current.emails.clone()),
        phones: candidate.phones.clone().unwrap_or_else(|| current.phones.clone()),
        ..current.clone()
    };

    has_changed(
        &crm_fields(current),
        &crm_fields(&proposed),
        &ContactField::COMPARABLE,
    ) || has_error_status_transitioned(
        current.sync_status.as_deref(),
        Some(candidate.sync_status.as_str()),
    )
}
