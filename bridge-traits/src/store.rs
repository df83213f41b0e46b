//! Record Store Abstractions
//!
//! The two remote systems as seen by the reconciliation engine. Providers
//! implement these over their REST APIs; tests implement them in memory.
//!
//! Every operation fails with [`BridgeError::Remote`](crate::error::BridgeError::Remote)
//! when the remote system answers with a non-2xx status.

use async_trait::async_trait;

use crate::contacts::{BookingAttributes, BookingCustomer, CrmContact, CrmProperties, Fetched};
use crate::error::Result;

/// Customer collection held by the booking system.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Fetch one page of customers. With `include_deleted` the listing also
    /// carries deleted customers, flagged by [`BookingCustomer::deleted`].
    ///
    /// `cursor` is the opaque value returned with the previous page, `None`
    /// for the first page. Returns the customers and the next cursor, `None`
    /// once the collection is exhausted.
    async fn fetch_page(
        &self,
        cursor: Option<String>,
        limit: usize,
        include_deleted: bool,
    ) -> Result<(Vec<BookingCustomer>, Option<String>)>;

    /// Fetch a single customer by URI.
    async fn fetch_one(&self, uri: &str) -> Result<Fetched<BookingCustomer>>;

    /// Create a customer and return its URI.
    async fn create(&self, attributes: &BookingAttributes) -> Result<String>;

    /// Update the supplied fields of a customer.
    async fn update(&self, uri: &str, attributes: &BookingAttributes) -> Result<()>;

    /// Delete a customer. With `force` the booking system skips its
    /// future-booking conflict check.
    async fn delete(&self, uri: &str, force: bool) -> Result<()>;
}

/// Contact collection held by the CRM.
#[async_trait]
pub trait CrmStore: Send + Sync {
    /// Fetch one page of contacts, either live (`archived = false`) or archived.
    async fn fetch_page(
        &self,
        cursor: Option<String>,
        limit: usize,
        archived: bool,
    ) -> Result<(Vec<CrmContact>, Option<String>)>;

    /// Fetch a single contact by id.
    async fn fetch_one(&self, id: &str, include_archived: bool) -> Result<Fetched<CrmContact>>;

    /// Find every contact whose cross-reference field holds `booking_uri`.
    async fn find_by_cross_ref(&self, booking_uri: &str) -> Result<Vec<CrmContact>>;

    /// Create a contact and return its id.
    async fn create(&self, properties: &CrmProperties) -> Result<String>;

    /// Write the supplied properties of a contact.
    async fn update(&self, id: &str, properties: &CrmProperties) -> Result<()>;

    /// Archive (soft-delete) a contact.
    async fn archive(&self, id: &str) -> Result<()>;
}
