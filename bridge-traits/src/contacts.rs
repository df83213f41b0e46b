//! Record Model
//!
//! Snapshot types for the two systems being reconciled: customers held by the
//! booking system and contacts held by the CRM. Both sides are owned by their
//! remote system; the engine only reads these snapshots and writes individual
//! fields back through the store traits in [`crate::store`].

use serde::{Deserialize, Serialize};

/// Separator used by the CRM's secondary-value text fields.
pub const SECONDARY_VALUE_SEPARATOR: &str = ",\n";

/// Separator used by the booking system's `External ID` custom field when a
/// merged customer carries more than one CRM id.
pub const EXTERNAL_ID_SEPARATOR: &str = ", ";

// ============================================================================
// Booking system
// ============================================================================

/// A customer as held by the booking system.
///
/// `emails[0]` and `phones[0]` are the primary values, the rest are secondary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingCustomer {
    /// Stable resource URI, also used as the cross-reference on the CRM side
    pub uri: String,
    pub name: String,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    /// Raw `External ID` custom field (CRM ids, comma separated after merges)
    pub external_id: Option<String>,
    /// Raw `Sync Status` custom field
    pub sync_status: Option<String>,
    pub deleted: bool,
}

impl BookingCustomer {
    pub fn primary_email(&self) -> Option<&str> {
        self.emails.first().map(String::as_str)
    }

    pub fn primary_phone(&self) -> Option<&str> {
        self.phones.first().map(String::as_str)
    }
}

/// Field values written to the booking system on create or update.
///
/// `None` leaves the remote field untouched on update. The sync status is
/// always written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingAttributes {
    pub name: Option<String>,
    pub emails: Option<Vec<String>>,
    pub phones: Option<Vec<String>>,
    pub external_id: Option<String>,
    pub sync_status: String,
}

impl BookingAttributes {
    /// Attributes that only rewrite the sync status.
    pub fn status_only(sync_status: impl Into<String>) -> Self {
        Self {
            sync_status: sync_status.into(),
            ..Default::default()
        }
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    /// Number of attribute fields (besides the status) this write touches.
    pub fn field_count(&self) -> usize {
        [
            self.name.is_some(),
            self.emails.is_some(),
            self.phones.is_some(),
            self.external_id.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

// ============================================================================
// CRM
// ============================================================================

/// CRM contact properties, named as the CRM names them on the wire.
///
/// Every property is optional: the CRM reports unset values as `null`, and a
/// partial update only carries the properties being written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmProperties {
    #[serde(rename = "firstname", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(rename = "lastname", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(
        rename = "tte_customer_secondary_emails",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub secondary_emails: Option<String>,

    #[serde(
        rename = "tte_customer_secondary_phone",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub secondary_phones: Option<String>,

    /// URI of the linked booking-system customer
    #[serde(
        rename = "tte_customer_uri",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub booking_uri: Option<String>,

    #[serde(
        rename = "tte_customer_sync_status",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sync_status: Option<String>,
}

impl CrmProperties {
    /// Property names requested whenever contacts are read.
    pub const FETCHED: [&'static str; 9] = [
        "firstname",
        "lastname",
        "hs_object_id",
        "email",
        "phone",
        "tte_customer_uri",
        "tte_customer_secondary_emails",
        "tte_customer_secondary_phone",
        "tte_customer_sync_status",
    ];

    /// Value of a comparable field.
    pub fn get(&self, field: ContactField) -> Option<&str> {
        let value = match field {
            ContactField::FirstName => &self.first_name,
            ContactField::LastName => &self.last_name,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
            ContactField::SecondaryEmails => &self.secondary_emails,
            ContactField::SecondaryPhones => &self.secondary_phones,
        };
        value.as_deref()
    }

    /// Secondary e-mails split into individual non-empty values.
    pub fn secondary_email_list(&self) -> Vec<String> {
        split_secondary(self.secondary_emails.as_deref())
    }

    /// Secondary phones split into individual non-empty values.
    pub fn secondary_phone_list(&self) -> Vec<String> {
        split_secondary(self.secondary_phones.as_deref())
    }

    /// Non-empty linked booking URI.
    pub fn linked_booking_uri(&self) -> Option<&str> {
        self.booking_uri.as_deref().filter(|uri| !uri.is_empty())
    }

    /// Properties that only write the cross-reference and status.
    pub fn link(booking_uri: impl Into<String>, sync_status: impl Into<String>) -> Self {
        Self {
            booking_uri: Some(booking_uri.into()),
            sync_status: Some(sync_status.into()),
            ..Default::default()
        }
    }

    /// Properties that only write the status.
    pub fn status_only(sync_status: impl Into<String>) -> Self {
        Self {
            sync_status: Some(sync_status.into()),
            ..Default::default()
        }
    }
}

fn split_secondary(value: Option<&str>) -> Vec<String> {
    value
        .map(|text| {
            text.split(SECONDARY_VALUE_SEPARATOR)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A contact as held by the CRM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmContact {
    pub id: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub properties: CrmProperties,
}

/// Contact fields compared when deciding whether a CRM write is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    FirstName,
    LastName,
    Email,
    Phone,
    SecondaryEmails,
    SecondaryPhones,
}

impl ContactField {
    pub const COMPARABLE: [ContactField; 6] = [
        ContactField::FirstName,
        ContactField::LastName,
        ContactField::Email,
        ContactField::Phone,
        ContactField::SecondaryEmails,
        ContactField::SecondaryPhones,
    ];

    pub fn property_name(&self) -> &'static str {
        match self {
            ContactField::FirstName => "firstname",
            ContactField::LastName => "lastname",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::SecondaryEmails => "tte_customer_secondary_emails",
            ContactField::SecondaryPhones => "tte_customer_secondary_phone",
        }
    }
}

// ============================================================================
// Lookups
// ============================================================================

/// Result of fetching a single record by its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    Found(T),
    NotFound,
}

impl<T> Fetched<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Fetched::Found(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Fetched::Found(record) => Some(record),
            Fetched::NotFound => None,
        }
    }
}

impl<T> From<Option<T>> for Fetched<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(record) => Fetched::Found(record),
            None => Fetched::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crm_properties_wire_names() {
        let properties = CrmProperties {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            booking_uri: Some("https://10to8.com/api/enterprise/v2/customer/1/".to_string()),
            ..Default::default()
        };

        let value = serde_json::to_value(&properties).unwrap();
        assert_eq!(value["firstname"], "Ada");
        assert_eq!(value["lastname"], "Lovelace");
        assert_eq!(
            value["tte_customer_uri"],
            "https://10to8.com/api/enterprise/v2/customer/1/"
        );
        assert!(value.get("email").is_none());
    }

    #[test]
    fn test_crm_properties_accept_nulls_and_unknown_keys() {
        let json = r#"{
            "firstname": "Ada",
            "lastname": null,
            "hs_object_id": "501",
            "createdate": "2024-01-01T00:00:00Z"
        }"#;

        let properties: CrmProperties = serde_json::from_str(json).unwrap();
        assert_eq!(properties.first_name.as_deref(), Some("Ada"));
        assert_eq!(properties.last_name, None);
        assert_eq!(properties.email, None);
    }

    #[test]
    fn test_secondary_lists_skip_empty_tokens() {
        let properties = CrmProperties {
            secondary_emails: Some("b@x.com,\n,\nc@x.com".to_string()),
            secondary_phones: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(
            properties.secondary_email_list(),
            vec!["b@x.com".to_string(), "c@x.com".to_string()]
        );
        assert!(properties.secondary_phone_list().is_empty());
    }

    #[test]
    fn test_linked_booking_uri_ignores_blank() {
        let blank = CrmProperties {
            booking_uri: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(blank.linked_booking_uri(), None);

        let linked = CrmProperties::link("uri-1", "Last synced: t");
        assert_eq!(linked.linked_booking_uri(), Some("uri-1"));
        assert_eq!(linked.sync_status.as_deref(), Some("Last synced: t"));
    }

    #[test]
    fn test_booking_attributes_status_only() {
        let attributes = BookingAttributes::status_only("Last synced: t");
        assert_eq!(attributes.field_count(), 0);

        let attributes = attributes.with_external_id("501");
        assert_eq!(attributes.field_count(), 1);
    }

    #[test]
    fn test_fetched_from_option() {
        assert_eq!(Fetched::from(Some(1)), Fetched::Found(1));
        assert_eq!(Fetched::<u8>::from(None), Fetched::NotFound);
        assert!(Fetched::Found("x").is_found());
    }
}
