//! 10to8 API wire types
//!
//! Data structures for the Enterprise API v2 customer and subscription
//! resources.

use bridge_traits::{BookingAttributes, BookingCustomer};
use serde::{Deserialize, Serialize};

/// Scope used for customer subscriptions and their notifications.
pub const CUSTOMER_SCOPE: &str = "customer";

/// 10to8 customer resource
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerResource {
    pub resource_uri: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub emails: Vec<String>,

    /// Phone numbers
    #[serde(default)]
    pub numbers: Vec<String>,

    #[serde(default)]
    pub custom_fields: Option<CustomFields>,

    /// Set on deleted customers when the listing includes them
    #[serde(default)]
    pub deleted: bool,
}

/// Custom fields read back from a customer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomFields {
    #[serde(rename = "External ID", default)]
    pub external_id: Option<String>,

    #[serde(rename = "Sync Status", default)]
    pub sync_status: Option<String>,
}

impl From<CustomerResource> for BookingCustomer {
    fn from(resource: CustomerResource) -> Self {
        let custom_fields = resource.custom_fields.unwrap_or_default();

        BookingCustomer {
            uri: resource.resource_uri,
            name: resource.name.unwrap_or_default(),
            emails: resource.emails,
            phones: resource.numbers,
            external_id: custom_fields.external_id.filter(|id| !id.is_empty()),
            sync_status: custom_fields.sync_status,
            deleted: resource.deleted,
        }
    }
}

/// One page of the customer listing
#[derive(Debug, Deserialize)]
pub struct CustomerPage {
    #[serde(default)]
    pub results: Vec<CustomerResource>,

    /// Absolute URL of the next page
    #[serde(default)]
    pub next: Option<String>,
}

/// Body of a customer create or update call.
///
/// An update only carries the fields being written. The `Sync Status`
/// custom field is always present.
#[derive(Debug, Serialize)]
pub struct CustomerPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub emails: Option<&'a [String]>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub numbers: Option<&'a [String]>,

    pub custom_fields: CustomFieldsPayload<'a>,
}

#[derive(Debug, Serialize)]
pub struct CustomFieldsPayload<'a> {
    #[serde(rename = "Sync Status")]
    pub sync_status: &'a str,

    #[serde(rename = "External ID", skip_serializing_if = "Option::is_none")]
    pub external_id: Option<&'a str>,
}

impl<'a> CustomerPayload<'a> {
    /// Payload for a new customer; unset lists are sent empty.
    pub fn for_create(attributes: &'a BookingAttributes) -> Self {
        Self {
            name: Some(attributes.name.as_deref().unwrap_or_default()),
            emails: Some(attributes.emails.as_deref().unwrap_or_default()),
            numbers: Some(attributes.phones.as_deref().unwrap_or_default()),
            custom_fields: CustomFieldsPayload::from(attributes),
        }
    }

    pub fn for_update(attributes: &'a BookingAttributes) -> Self {
        Self {
            name: attributes.name.as_deref(),
            emails: attributes.emails.as_deref(),
            numbers: attributes.phones.as_deref(),
            custom_fields: CustomFieldsPayload::from(attributes),
        }
    }
}

impl<'a> From<&'a BookingAttributes> for CustomFieldsPayload<'a> {
    fn from(attributes: &'a BookingAttributes) -> Self {
        Self {
            sync_status: &attributes.sync_status,
            external_id: attributes.external_id.as_deref(),
        }
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

/// 10to8 subscription resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subscription {
    pub resource_uri: String,

    pub scope: String,

    #[serde(default)]
    pub callback_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionList {
    #[serde(default)]
    pub results: Vec<Subscription>,
}

#[derive(Debug, Serialize)]
pub struct NewSubscription<'a> {
    pub callback_url: &'a str,
    pub scope: &'a str,
}

/// Body posted to the callback URL when subscribed records change
#[derive(Debug, Deserialize)]
pub struct SubscriptionNotification {
    #[serde(default)]
    pub scope: Option<String>,

    /// URIs of the changed records
    #[serde(default)]
    pub items: Option<Vec<String>>,
}
