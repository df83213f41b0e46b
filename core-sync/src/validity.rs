//! # Validity Gate
//!
//! The CRM rejects contacts whose primary e-mail is syntactically invalid,
//! while the booking system accepts anything. An invalid primary e-mail is
//! therefore never sent to the CRM: the contact goes out with a blank e-mail
//! and an error status, and the original value is protected from being
//! overwritten when the blank comes back inbound.

use crate::status::SyncStatus;
use crate::translator::InboundCandidate;
use bridge_traits::{BookingCustomer, CrmProperties};
use chrono::{DateTime, Utc};
use core_runtime::logging::redact_if_sensitive;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

const MAX_EMAIL_LEN: usize = 254;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
    )
    .expect("email pattern is valid")
});

/// Outcome of running a record through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateVerdict {
    Passed,
    /// The record carries an invalid primary e-mail
    Blocked { offending: String },
}

impl GateVerdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, GateVerdict::Blocked { .. })
    }
}

/// Syntactic e-mail check (no deliverability lookup).
pub fn is_valid_email(value: &str) -> bool {
    value.len() <= MAX_EMAIL_LEN && EMAIL_PATTERN.is_match(value)
}

/// Gate CRM-bound properties.
///
/// A non-empty invalid e-mail is blanked and the status becomes the
/// invalid-email error. Otherwise the status is a fresh success marker.
pub fn gate_outbound(properties: &mut CrmProperties, synced_at: DateTime<Utc>) -> GateVerdict {
    let offending = properties
        .email
        .as_deref()
        .filter(|email| !email.is_empty() && !is_valid_email(email))
        .map(str::to_string);

    match offending {
        Some(email) => {
            warn!(
                email = %redact_if_sensitive("email", &email),
                "Invalid primary e-mail withheld from CRM"
            );
            properties.email = Some(String::new());
            properties.sync_status = Some(SyncStatus::invalid_email(&email).to_string());
            GateVerdict::Blocked { offending: email }
        }
        None => {
            properties.sync_status = Some(SyncStatus::Synced(synced_at).to_string());
            GateVerdict::Passed
        }
    }
}

/// Gate a booking-bound write.
///
/// Only applies when the contact's primary e-mail is blank: if the booking
/// customer's current primary e-mail is invalid, it is put back at the head of
/// the candidate's e-mails and the status becomes the invalid-email error.
pub fn gate_inbound(
    candidate: &mut InboundCandidate,
    incoming_email: Option<&str>,
    current: &BookingCustomer,
) -> GateVerdict {
    if incoming_email.is_some_and(|email| !email.is_empty()) {
        return GateVerdict::Passed;
    }

    let Some(existing) = current.primary_email().filter(|email| !is_valid_email(email)) else {
        return GateVerdict::Passed;
    };

    warn!(
        record = %current.uri,
        email = %redact_if_sensitive("email", existing),
        "Keeping invalid booking e-mail the CRM could not store"
    );

    let emails = candidate.attributes.emails.get_or_insert_with(Vec::new);
    emails.insert(0, existing.to_string());
    candidate.attributes.sync_status = SyncStatus::invalid_email(existing).to_string();

    GateVerdict::Blocked {
        offending: existing.to_string(),
    }
}
