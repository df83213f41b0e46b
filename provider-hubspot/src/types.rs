//! HubSpot API wire types
//!
//! Data structures for the CRM v3 contact object endpoints. Contacts
//! deserialize straight into [`CrmContact`]; only the envelopes live here.
//!
//! See: https://developers.hubspot.com/docs/api/crm/contacts

use bridge_traits::{CrmContact, CrmProperties};
use serde::{Deserialize, Serialize};

/// Property holding the linked booking-system customer URI
pub const CROSS_REFERENCE_PROPERTY: &str = "tte_customer_uri";

/// Upper bound on contacts returned by a cross-reference search
pub const SEARCH_LIMIT: u32 = 20;

/// Contact list and search response
#[derive(Debug, Deserialize)]
pub struct ContactsPage {
    #[serde(default)]
    pub results: Vec<CrmContact>,

    #[serde(default)]
    pub paging: Option<Paging>,
}

impl ContactsPage {
    /// Cursor of the next page, if any
    pub fn next_after(&self) -> Option<String> {
        self.paging
            .as_ref()
            .and_then(|paging| paging.next.as_ref())
            .map(|next| next.after.clone())
            .filter(|after| !after.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<NextPage>,
}

#[derive(Debug, Deserialize)]
pub struct NextPage {
    pub after: String,
}

/// Response to a contact create
#[derive(Debug, Deserialize)]
pub struct CreatedContact {
    pub id: String,
}

/// Body of a create or update call
#[derive(Debug, Serialize)]
pub struct PropertiesPayload<'a> {
    pub properties: &'a CrmProperties,
}

/// Body of `POST /crm/v3/objects/contacts/search`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest<'a> {
    pub filter_groups: Vec<FilterGroup<'a>>,
    pub properties: &'a [&'a str],
    pub limit: u32,
    pub after: u32,
}

#[derive(Debug, Serialize)]
pub struct FilterGroup<'a> {
    pub filters: Vec<Filter<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter<'a> {
    pub property_name: &'a str,
    pub operator: &'a str,
    pub value: &'a str,
}

impl<'a> SearchRequest<'a> {
    /// First page of contacts whose cross-reference equals `booking_uri`.
    pub fn by_cross_reference(booking_uri: &'a str) -> Self {
        Self {
            filter_groups: vec![FilterGroup {
                filters: vec![Filter {
                    property_name: CROSS_REFERENCE_PROPERTY,
                    operator: "EQ",
                    value: booking_uri,
                }],
            }],
            properties: &CrmProperties::FETCHED,
            limit: SEARCH_LIMIT,
            after: 0,
        }
    }
}

// ============================================================================
// Webhooks
// ============================================================================

/// One event from a webhook delivery
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(default)]
    pub subscription_type: Option<String>,

    #[serde(default)]
    pub object_id: Option<ObjectId>,
}

/// Object ids arrive as numbers; tolerate strings too.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ObjectId {
    Number(u64),
    Text(String),
}

impl ObjectId {
    pub fn into_string(self) -> String {
        match self {
            ObjectId::Number(id) => id.to_string(),
            ObjectId::Text(id) => id,
        }
    }
}
