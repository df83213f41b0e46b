//! Exact remote-call expectations checked with mockall stores.

use async_trait::async_trait;
use bridge_traits::{
    error::Result, BookingAttributes, BookingCustomer, BookingStore, CrmContact, CrmProperties,
    CrmStore, Fetched, FixedClock,
};
use chrono::{TimeZone, Utc};
use core_runtime::events::{EventBus, SweepLeg};
use core_sync::{
    CancellationToken, OutboundOrchestrator, SyncContext, SyncCoordinator, SyncOptions,
    SyncOutcome,
};
use mockall::mock;
use mockall::predicate::eq;
use std::sync::Arc;

mock! {
    pub Booking {}

    #[async_trait]
    impl BookingStore for Booking {
        async fn fetch_page(
            &self,
            cursor: Option<String>,
            limit: usize,
            include_deleted: bool,
        ) -> Result<(Vec<BookingCustomer>, Option<String>)>;
        async fn fetch_one(&self, uri: &str) -> Result<Fetched<BookingCustomer>>;
        async fn create(&self, attributes: &BookingAttributes) -> Result<String>;
        async fn update(&self, uri: &str, attributes: &BookingAttributes) -> Result<()>;
        async fn delete(&self, uri: &str, force: bool) -> Result<()>;
    }
}

mock! {
    pub Crm {}

    #[async_trait]
    impl CrmStore for Crm {
        async fn fetch_page(
            &self,
            cursor: Option<String>,
            limit: usize,
            archived: bool,
        ) -> Result<(Vec<CrmContact>, Option<String>)>;
        async fn fetch_one(&self, id: &str, include_archived: bool) -> Result<Fetched<CrmContact>>;
        async fn find_by_cross_ref(&self, booking_uri: &str) -> Result<Vec<CrmContact>>;
        async fn create(&self, properties: &CrmProperties) -> Result<String>;
        async fn update(&self, id: &str, properties: &CrmProperties) -> Result<()>;
        async fn archive(&self, id: &str) -> Result<()>;
    }
}

const URI: &str = "https://10to8.com/api/enterprise/v2/customer/42/";

fn context(booking: MockBooking, crm: MockCrm) -> Arc<SyncContext> {
    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()));
    Arc::new(
        SyncContext::new(
            Arc::new(booking),
            Arc::new(crm),
            clock,
            SyncOptions::default(),
            Arc::new(EventBus::default()),
        )
        .unwrap(),
    )
}

#[tokio::test]
async fn test_archived_contact_issues_single_forced_delete() {
    let mut crm = MockCrm::new();
    crm.expect_fetch_page()
        .with(eq(None), eq(10usize), eq(true))
        .times(1)
        .returning(|_, _, _| {
            Ok((
                vec![CrmContact {
                    id: "501".to_string(),
                    archived: true,
                    properties: CrmProperties::link(URI, "Last synced: earlier"),
                }],
                None,
            ))
        });

    let mut booking = MockBooking::new();
    booking
        .expect_delete()
        .withf(|uri, force| uri == URI && *force)
        .times(1)
        .returning(|_, _| Ok(()));

    let report = SyncCoordinator::new(context(booking, crm))
        .run_leg("run", SweepLeg::InboundArchived, &CancellationToken::new())
        .await;

    assert_eq!(report.stats.counts.deleted, 1);
    assert_eq!(report.stats.counts.processed, 1);
}

#[tokio::test]
async fn test_new_customer_creates_contact_then_writes_back_id() {
    let mut crm = MockCrm::new();
    crm.expect_create()
        .withf(|properties| {
            properties.first_name.as_deref() == Some("Ada")
                && properties.last_name.as_deref() == Some("Lovelace")
                && properties.email.as_deref() == Some("ada@x.com")
                && properties.booking_uri.as_deref() == Some(URI)
        })
        .times(1)
        .returning(|_| Ok("501".to_string()));

    let mut booking = MockBooking::new();
    booking
        .expect_update()
        .withf(|uri, attributes| {
            uri == URI
                && attributes.external_id.as_deref() == Some("501")
                && attributes.sync_status == "Last synced: 2024-03-01T09:30:00.000000Z"
                && attributes.name.is_none()
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let customer = BookingCustomer {
        uri: URI.to_string(),
        name: "Ada Lovelace".to_string(),
        emails: vec!["ada@x.com".to_string()],
        ..Default::default()
    };

    let outcome = OutboundOrchestrator::new(context(booking, crm))
        .sync_customer(customer)
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Created);
}
