//! # Record Translator
//!
//! Pure field mapping between booking customers and CRM contacts. Nothing in
//! here performs I/O; the sync timestamp is passed in so results are
//! reproducible.

use crate::status::SyncStatus;
use bridge_traits::{
    BookingAttributes, BookingCustomer, CrmContact, CrmProperties, SECONDARY_VALUE_SEPARATOR,
};
use chrono::{DateTime, Utc};

/// A booking-side write derived from a CRM contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCandidate {
    pub crm_id: String,
    /// Linked booking URI carried by the contact, if any
    pub booking_uri: Option<String>,
    pub attributes: BookingAttributes,
}

/// Map a booking customer onto CRM contact properties.
///
/// The result carries the customer's URI as the cross-reference and a fresh
/// success status.
pub fn booking_to_crm(customer: &BookingCustomer, synced_at: DateTime<Utc>) -> CrmProperties {
    let mut properties = crm_fields(customer);
    properties.booking_uri = Some(customer.uri.clone());
    properties.sync_status = Some(SyncStatus::Synced(synced_at).to_string());
    properties
}

/// The comparable contact fields of a booking customer.
///
/// Missing primaries and empty secondary lists become empty strings.
pub fn crm_fields(customer: &BookingCustomer) -> CrmProperties {
    let (first_name, last_name) = split_name(&customer.name);

    CrmProperties {
        first_name: Some(first_name),
        last_name: Some(last_name),
        email: Some(customer.primary_email().unwrap_or_default().to_string()),
        phone: Some(customer.primary_phone().unwrap_or_default().to_string()),
        secondary_emails: Some(join_secondary(&customer.emails)),
        secondary_phones: Some(join_secondary(&customer.phones)),
        ..Default::default()
    }
}

/// Map a CRM contact onto a booking-side write.
///
/// The contact id becomes the external id; the primary value leads each list,
/// followed by the parsed secondary values.
pub fn crm_to_booking(contact: &CrmContact, synced_at: DateTime<Utc>) -> InboundCandidate {
    let properties = &contact.properties;

    let name = join_names(
        properties.first_name.as_deref().unwrap_or_default(),
        properties.last_name.as_deref().unwrap_or_default(),
    );
    let emails = with_primary(properties.email.as_deref(), properties.secondary_email_list());
    let phones = with_primary(properties.phone.as_deref(), properties.secondary_phone_list());

    InboundCandidate {
        crm_id: contact.id.clone(),
        booking_uri: properties.linked_booking_uri().map(str::to_string),
        attributes: BookingAttributes {
            name: Some(name),
            emails: Some(emails),
            phones: Some(phones),
            external_id: Some(contact.id.clone()),
            sync_status: SyncStatus::Synced(synced_at).to_string(),
        },
    }
}

/// Join first and last name with a single space, omitting the space when
/// either part is empty.
pub fn join_names(first: &str, last: &str) -> String {
    match (first.is_empty(), last.is_empty()) {
        (false, false) => format!("{} {}", first, last),
        (false, true) => first.to_string(),
        _ => last.to_string(),
    }
}

/// First whitespace-separated token is the first name, the rest (single-space
/// joined) is the last name.
fn split_name(name: &str) -> (String, String) {
    let mut tokens = name.split_whitespace();
    let first = tokens.next().unwrap_or_default().to_string();
    let last = tokens.collect::<Vec<_>>().join(" ");
    (first, last)
}

fn join_secondary(values: &[String]) -> String {
    values
        .iter()
        .skip(1)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(SECONDARY_VALUE_SEPARATOR)
}

fn with_primary(primary: Option<&str>, secondary: Vec<String>) -> Vec<String> {
    match primary.filter(|value| !value.is_empty()) {
        Some(value) => std::iter::once(value.to_string()).chain(secondary).collect(),
        None => secondary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn synced_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    fn customer() -> BookingCustomer {
        BookingCustomer {
            uri: "https://10to8.com/api/enterprise/v2/customer/7/".to_string(),
            name: "Ada King Lovelace".to_string(),
            emails: vec!["ada@example.com".to_string(), "ada@work.example".to_string()],
            phones: vec!["+441234".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_booking_to_crm_maps_fields() {
        let properties = booking_to_crm(&customer(), synced_at());

        assert_eq!(properties.first_name.as_deref(), Some("Ada"));
        assert_eq!(properties.last_name.as_deref(), Some("King Lovelace"));
        assert_eq!(properties.email.as_deref(), Some("ada@example.com"));
        assert_eq!(properties.phone.as_deref(), Some("+441234"));
        assert_eq!(properties.secondary_emails.as_deref(), Some("ada@work.example"));
        assert_eq!(properties.secondary_phones.as_deref(), Some(""));
        assert_eq!(
            properties.booking_uri.as_deref(),
            Some("https://10to8.com/api/enterprise/v2/customer/7/")
        );
        assert_eq!(
            properties.sync_status.as_deref(),
            Some("Last synced: 2024-03-01T09:30:00.000000Z")
        );
    }

    #[test]
    fn test_booking_to_crm_without_contact_details() {
        let bare = BookingCustomer {
            uri: "uri-1".to_string(),
            name: "Cher".to_string(),
            ..Default::default()
        };
        let properties = booking_to_crm(&bare, synced_at());

        assert_eq!(properties.first_name.as_deref(), Some("Cher"));
        assert_eq!(properties.last_name.as_deref(), Some(""));
        assert_eq!(properties.email.as_deref(), Some(""));
        assert_eq!(properties.phone.as_deref(), Some(""));
        assert_eq!(properties.secondary_emails.as_deref(), Some(""));
    }

    #[test]
    fn test_secondary_values_use_separator() {
        let mut many = customer();
        many.emails.push("third@example.com".to_string());

        let properties = crm_fields(&many);
        assert_eq!(
            properties.secondary_emails.as_deref(),
            Some("ada@work.example,\nthird@example.com")
        );
    }

    #[test]
    fn test_crm_to_booking_maps_fields() {
        let contact = CrmContact {
            id: "501".to_string(),
            archived: false,
            properties: CrmProperties {
                first_name: Some("Ada".to_string()),
                last_name: Some("Lovelace".to_string()),
                email: Some("ada@example.com".to_string()),
                phone: None,
                secondary_emails: Some("b@example.com,\nc@example.com".to_string()),
                booking_uri: Some("uri-7".to_string()),
                ..Default::default()
            },
        };

        let candidate = crm_to_booking(&contact, synced_at());

        assert_eq!(candidate.crm_id, "501");
        assert_eq!(candidate.booking_uri.as_deref(), Some("uri-7"));
        assert_eq!(candidate.attributes.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(
            candidate.attributes.emails,
            Some(vec![
                "ada@example.com".to_string(),
                "b@example.com".to_string(),
                "c@example.com".to_string()
            ])
        );
        assert_eq!(candidate.attributes.phones, Some(vec![]));
        assert_eq!(candidate.attributes.external_id.as_deref(), Some("501"));
    }

    #[test]
    fn test_crm_to_booking_without_link() {
        let contact = CrmContact {
            id: "9".to_string(),
            ..Default::default()
        };
        let candidate = crm_to_booking(&contact, synced_at());

        assert_eq!(candidate.booking_uri, None);
        assert_eq!(candidate.attributes.name.as_deref(), Some(""));
    }

    #[test]
    fn test_join_names() {
        assert_eq!(join_names("Ada", "Lovelace"), "Ada Lovelace");
        assert_eq!(join_names("Ada", ""), "Ada");
        assert_eq!(join_names("", "Lovelace"), "Lovelace");
        assert_eq!(join_names("", ""), "");
    }

    #[test]
    fn test_round_trip_preserves_two_part_name() {
        let original = BookingCustomer {
            uri: "uri-1".to_string(),
            name: "Grace Hopper".to_string(),
            emails: vec!["grace@example.com".to_string()],
            ..Default::default()
        };

        let contact = CrmContact {
            id: "1".to_string(),
            archived: false,
            properties: booking_to_crm(&original, synced_at()),
        };
        let candidate = crm_to_booking(&contact, synced_at());

        assert_eq!(candidate.attributes.name.as_deref(), Some("Grace Hopper"));
        assert_eq!(candidate.attributes.emails, Some(original.emails.clone()));
    }

    #[test]
    fn test_round_trip_preserves_contact_lists() {
        let original = BookingCustomer {
            uri: "uri-1".to_string(),
            name: "Grace Hopper".to_string(),
            emails: vec![
                "grace@example.com".to_string(),
                "g.hopper@navy.example".to_string(),
                "cobol@example.org".to_string(),
            ],
            phones: vec![
                "+1 555 0100".to_string(),
                "+1 555 0101".to_string(),
                "+1 555 0102".to_string(),
            ],
            ..Default::default()
        };

        let contact = CrmContact {
            id: "1".to_string(),
            archived: false,
            properties: booking_to_crm(&original, synced_at()),
        };
        let candidate = crm_to_booking(&contact, synced_at());

        assert_eq!(candidate.attributes.emails, Some(original.emails));
        assert_eq!(candidate.attributes.phones, Some(original.phones));
    }

    #[test]
    fn test_round_trip_without_phones() {
        let original = BookingCustomer {
            uri: "uri-1".to_string(),
            name: "Grace Hopper".to_string(),
            emails: vec![
                "grace@example.com".to_string(),
                "g.hopper@navy.example".to_string(),
            ],
            ..Default::default()
        };

        let properties = booking_to_crm(&original, synced_at());
        assert_eq!(properties.phone.as_deref(), Some(""));

        let contact = CrmContact {
            id: "1".to_string(),
            archived: false,
            properties,
        };
        let candidate = crm_to_booking(&contact, synced_at());

        assert_eq!(candidate.attributes.emails, Some(original.emails));
        assert_eq!(candidate.attributes.phones, Some(vec![]));
    }
}
