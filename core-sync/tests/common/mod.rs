//! In-memory stores shared by the integration tests.
//!
//! Both fakes keep their records in sorted maps, page through them with
//! numeric cursors and log every mutation so tests can assert on exact
//! write sequences.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::{
    error::Result, BookingAttributes, BookingCustomer, BookingStore, BridgeError, CrmContact,
    CrmProperties, CrmStore, Fetched, FixedClock,
};
use chrono::{TimeZone, Utc};
use core_runtime::events::EventBus;
use core_sync::{SyncContext, SyncOptions};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

pub const SYNCED: &str = "Last synced: 2024-03-01T09:30:00.000000Z";

pub fn booking_uri(n: u32) -> String {
    format!("https://10to8.test/api/enterprise/v2/customer/{}/", n)
}

pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()))
}

pub fn context(booking: &Arc<FakeBooking>, crm: &Arc<FakeCrm>) -> Arc<SyncContext> {
    context_with(booking, crm, SyncOptions::default(), Arc::new(EventBus::default()))
}

pub fn context_with(
    booking: &Arc<FakeBooking>,
    crm: &Arc<FakeCrm>,
    options: SyncOptions,
    event_bus: Arc<EventBus>,
) -> Arc<SyncContext> {
    Arc::new(
        SyncContext::new(booking.clone(), crm.clone(), clock(), options, event_bus).unwrap(),
    )
}

fn page<T: Clone>(records: Vec<T>, cursor: Option<String>, limit: usize) -> (Vec<T>, Option<String>) {
    let start: usize = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
    let end = (start + limit).min(records.len());
    let items = records.get(start..end).map(<[T]>::to_vec).unwrap_or_default();
    let next = (end < records.len()).then(|| end.to_string());
    (items, next)
}

// ============================================================================
// Booking system
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingWrite {
    Create(BookingAttributes),
    Update(String, BookingAttributes),
    Delete(String, bool),
}

#[derive(Default)]
pub struct FakeBooking {
    customers: Mutex<BTreeMap<String, BookingCustomer>>,
    writes: Mutex<Vec<BookingWrite>>,
    next_id: Mutex<u32>,
    failing_cursor: Mutex<Option<String>>,
}

impl FakeBooking {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: Mutex::new(100),
            ..Default::default()
        })
    }

    pub fn insert(&self, customer: BookingCustomer) {
        self.customers
            .lock()
            .unwrap()
            .insert(customer.uri.clone(), customer);
    }

    pub fn get(&self, uri: &str) -> Option<BookingCustomer> {
        self.customers.lock().unwrap().get(uri).cloned()
    }

    pub fn writes(&self) -> Vec<BookingWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn fail_page_at(&self, cursor: &str) {
        *self.failing_cursor.lock().unwrap() = Some(cursor.to_string());
    }
}

#[async_trait]
impl BookingStore for FakeBooking {
    async fn fetch_page(
        &self,
        cursor: Option<String>,
        limit: usize,
        include_deleted: bool,
    ) -> Result<(Vec<BookingCustomer>, Option<String>)> {
        if cursor.is_some() && *self.failing_cursor.lock().unwrap() == cursor {
            return Err(BridgeError::remote(502, "bad gateway"));
        }
        let records: Vec<_> = self
            .customers
            .lock()
            .unwrap()
            .values()
            .filter(|customer| include_deleted || !customer.deleted)
            .cloned()
            .collect();
        Ok(page(records, cursor, limit))
    }

    async fn fetch_one(&self, uri: &str) -> Result<Fetched<BookingCustomer>> {
        Ok(self.get(uri).into())
    }

    async fn create(&self, attributes: &BookingAttributes) -> Result<String> {
        let uri = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            booking_uri(*next)
        };
        self.writes
            .lock()
            .unwrap()
            .push(BookingWrite::Create(attributes.clone()));
        self.insert(BookingCustomer {
            uri: uri.clone(),
            name: attributes.name.clone().unwrap_or_default(),
            emails: attributes.emails.clone().unwrap_or_default(),
            phones: attributes.phones.clone().unwrap_or_default(),
            external_id: attributes.external_id.clone(),
            sync_status: Some(attributes.sync_status.clone()),
            deleted: false,
        });
        Ok(uri)
    }

    async fn update(&self, uri: &str, attributes: &BookingAttributes) -> Result<()> {
        let mut customers = self.customers.lock().unwrap();
        let customer = customers
            .get_mut(uri)
            .ok_or_else(|| BridgeError::remote(404, "not found"))?;

        if let Some(name) = &attributes.name {
            customer.name = name.clone();
        }
        if let Some(emails) = &attributes.emails {
            customer.emails = emails.clone();
        }
        if let Some(phones) = &attributes.phones {
            customer.phones = phones.clone();
        }
        if let Some(external_id) = &attributes.external_id {
            customer.external_id = Some(external_id.clone());
        }
        customer.sync_status = Some(attributes.sync_status.clone());

        self.writes
            .lock()
            .unwrap()
            .push(BookingWrite::Update(uri.to_string(), attributes.clone()));
        Ok(())
    }

    async fn delete(&self, uri: &str, force: bool) -> Result<()> {
        self.customers
            .lock()
            .unwrap()
            .remove(uri)
            .ok_or_else(|| BridgeError::remote(404, "not found"))?;
        self.writes
            .lock()
            .unwrap()
            .push(BookingWrite::Delete(uri.to_string(), force));
        Ok(())
    }
}

// ============================================================================
// CRM
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrmWrite {
    Create(CrmProperties),
    Update(String, CrmProperties),
    Archive(String),
}

#[derive(Default)]
pub struct FakeCrm {
    contacts: Mutex<BTreeMap<String, CrmContact>>,
    writes: Mutex<Vec<CrmWrite>>,
    next_id: Mutex<u32>,
    failing_updates: Mutex<HashSet<String>>,
}

impl FakeCrm {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: Mutex::new(500),
            ..Default::default()
        })
    }

    pub fn insert(&self, contact: CrmContact) {
        self.contacts
            .lock()
            .unwrap()
            .insert(contact.id.clone(), contact);
    }

    pub fn get(&self, id: &str) -> Option<CrmContact> {
        self.contacts.lock().unwrap().get(id).cloned()
    }

    pub fn all(&self) -> Vec<CrmContact> {
        self.contacts.lock().unwrap().values().cloned().collect()
    }

    pub fn writes(&self) -> Vec<CrmWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn fail_updates_for(&self, id: &str) {
        self.failing_updates.lock().unwrap().insert(id.to_string());
    }
}

fn merge(target: &mut CrmProperties, update: &CrmProperties) {
    macro_rules! merge_fields {
        ($($field:ident),*) => {
            $(if let Some(value) = &update.$field {
                target.$field = Some(value.clone());
            })*
        };
    }
    merge_fields!(
        first_name,
        last_name,
        email,
        phone,
        secondary_emails,
        secondary_phones,
        booking_uri,
        sync_status
    );
}

#[async_trait]
impl CrmStore for FakeCrm {
    async fn fetch_page(
        &self,
        cursor: Option<String>,
        limit: usize,
        archived: bool,
    ) -> Result<(Vec<CrmContact>, Option<String>)> {
        let records: Vec<_> = self
            .all()
            .into_iter()
            .filter(|contact| contact.archived == archived)
            .collect();
        Ok(page(records, cursor, limit))
    }

    async fn fetch_one(&self, id: &str, include_archived: bool) -> Result<Fetched<CrmContact>> {
        Ok(self
            .get(id)
            .filter(|contact| include_archived || !contact.archived)
            .into())
    }

    async fn find_by_cross_ref(&self, booking_uri: &str) -> Result<Vec<CrmContact>> {
        Ok(self
            .all()
            .into_iter()
            .filter(|contact| {
                !contact.archived && contact.properties.booking_uri.as_deref() == Some(booking_uri)
            })
            .collect())
    }

    async fn create(&self, properties: &CrmProperties) -> Result<String> {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            next.to_string()
        };
        self.writes
            .lock()
            .unwrap()
            .push(CrmWrite::Create(properties.clone()));
        self.insert(CrmContact {
            id: id.clone(),
            archived: false,
            properties: properties.clone(),
        });
        Ok(id)
    }

    async fn update(&self, id: &str, properties: &CrmProperties) -> Result<()> {
        if self.failing_updates.lock().unwrap().contains(id) {
            return Err(BridgeError::remote(500, "internal error"));
        }
        let mut contacts = self.contacts.lock().unwrap();
        let contact = contacts
            .get_mut(id)
            .ok_or_else(|| BridgeError::remote(404, "not found"))?;
        merge(&mut contact.properties, properties);

        self.writes
            .lock()
            .unwrap()
            .push(CrmWrite::Update(id.to_string(), properties.clone()));
        Ok(())
    }

    async fn archive(&self, id: &str) -> Result<()> {
        let mut contacts = self.contacts.lock().unwrap();
        let contact = contacts
            .get_mut(id)
            .ok_or_else(|| BridgeError::remote(404, "not found"))?;
        contact.archived = true;

        self.writes
            .lock()
            .unwrap()
            .push(CrmWrite::Archive(id.to_string()));
        Ok(())
    }
}
