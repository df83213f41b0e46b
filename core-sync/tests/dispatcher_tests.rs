//! Notification dispatch against in-memory stores.

mod common;

use bridge_traits::{BookingCustomer, CrmContact, CrmProperties, Notification, NotificationKind};
use common::*;
use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
use core_sync::{
    notification_channel, BatchReport, CancellationToken, NotificationDispatcher, SyncError,
    SyncOptions, SyncOutcome,
};
use std::sync::Arc;
use std::time::Duration;

fn seed(booking: &FakeBooking, crm: &FakeCrm) -> String {
    let uri = booking_uri(1);
    booking.insert(BookingCustomer {
        uri: uri.clone(),
        name: "Ada Lovelace".to_string(),
        emails: vec!["ada@x.com".to_string()],
        external_id: Some("501".to_string()),
        sync_status: Some(SYNCED.to_string()),
        ..Default::default()
    });
    crm.insert(CrmContact {
        id: "501".to_string(),
        archived: false,
        properties: CrmProperties {
            first_name: Some("Ada".to_string()),
            last_name: Some("King".to_string()),
            email: Some("ada@x.com".to_string()),
            booking_uri: Some(uri.clone()),
            sync_status: Some(SYNCED.to_string()),
            ..Default::default()
        },
    });
    uri
}

#[tokio::test]
async fn test_dispatch_routes_by_system() {
    let booking = FakeBooking::new();
    let crm = FakeCrm::new();
    let uri = seed(&booking, &crm);

    let dispatcher = NotificationDispatcher::new(context(&booking, &crm), 4);

    let outcome = dispatcher
        .handle(&Notification::crm(NotificationKind::Updated, "501"))
        .await
        .unwrap();
    assert_eq!(outcome, SyncOutcome::Updated);
    assert_eq!(booking.get(&uri).unwrap().name, "Ada King");

    let outcome = dispatcher
        .handle(&Notification::booking(NotificationKind::Updated, uri.as_str()))
        .await
        .unwrap();
    assert!(matches!(outcome, SyncOutcome::Skipped(_)));
}

#[tokio::test]
async fn test_dispatch_rejects_blank_reference() {
    let booking = FakeBooking::new();
    let crm = FakeCrm::new();
    let dispatcher = NotificationDispatcher::new(context(&booking, &crm), 1);

    let error = dispatcher
        .handle(&Notification::crm(NotificationKind::Updated, "  "))
        .await
        .unwrap_err();
    assert!(matches!(error, SyncError::InvalidNotification(_)));
}

#[tokio::test]
async fn test_failed_notification_does_not_affect_others() {
    let booking = FakeBooking::new();
    let crm = FakeCrm::new();
    let uri = seed(&booking, &crm);

    let event_bus = Arc::new(EventBus::default());
    let mut events = event_bus.subscribe();
    let ctx = context_with(&booking, &crm, SyncOptions::default(), event_bus);
    let dispatcher = NotificationDispatcher::new(ctx, 2);

    let report = dispatcher
        .dispatch(vec![
            Notification::crm(NotificationKind::Updated, "501"),
            Notification::crm(NotificationKind::Updated, ""),
            Notification::booking(NotificationKind::Deleted, booking_uri(99)),
        ])
        .await;

    assert_eq!(
        report,
        BatchReport {
            processed: 3,
            failed: 1
        }
    );
    assert_eq!(booking.get(&uri).unwrap().name, "Ada King");

    let mut summary = None;
    while let Ok(event) = events.try_recv() {
        if let CoreEvent::Sync(SyncEvent::NotificationsProcessed { processed, failed }) = event {
            summary = Some((processed, failed));
        }
    }
    assert_eq!(summary, Some((3, 1)));
}

#[tokio::test]
async fn test_duplicate_notifications_are_collapsed() {
    let booking = FakeBooking::new();
    let crm = FakeCrm::new();
    seed(&booking, &crm);

    let dispatcher = NotificationDispatcher::new(context(&booking, &crm), 4);
    let report = dispatcher
        .dispatch(vec![
            Notification::crm(NotificationKind::Updated, "501"),
            Notification::crm(NotificationKind::Updated, "501"),
            Notification::crm(NotificationKind::Updated, "501"),
        ])
        .await;

    assert_eq!(report.processed, 1);
    assert_eq!(
        booking
            .writes()
            .iter()
            .filter(|write| matches!(write, BookingWrite::Update(..)))
            .count(),
        1
    );
}

#[tokio::test]
async fn test_concurrent_notifications_for_one_record_write_once() {
    let booking = FakeBooking::new();
    let crm = FakeCrm::new();
    let uri = seed(&booking, &crm);

    let dispatcher = NotificationDispatcher::new(context(&booking, &crm), 8);
    let report = dispatcher
        .dispatch(vec![
            Notification::crm(NotificationKind::Updated, "501"),
            Notification::crm(NotificationKind::Created, "501"),
            Notification::booking(NotificationKind::Updated, uri.as_str()),
        ])
        .await;

    assert_eq!(report.failed, 0);
    let booking_updates = booking
        .writes()
        .iter()
        .filter(|write| matches!(write, BookingWrite::Update(..)))
        .count();
    assert_eq!(booking_updates, 1);
}

#[tokio::test]
async fn test_run_drains_source_until_closed() {
    let booking = FakeBooking::new();
    let crm = FakeCrm::new();
    seed(&booking, &crm);

    let (sender, source) = notification_channel(4);
    sender
        .send(vec![Notification::crm(NotificationKind::Updated, "501")])
        .await
        .unwrap();
    sender
        .send(vec![Notification::crm(NotificationKind::Deleted, "404")])
        .await
        .unwrap();
    drop(sender);

    let dispatcher = NotificationDispatcher::new(context(&booking, &crm), 2);
    let total = dispatcher
        .run(&source, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        total,
        BatchReport {
            processed: 2,
            failed: 0
        }
    );
}

#[tokio::test]
async fn test_run_stops_on_cancel() {
    let booking = FakeBooking::new();
    let crm = FakeCrm::new();
    let (_sender, source) = notification_channel(1);

    let dispatcher = NotificationDispatcher::new(context(&booking, &crm), 1);
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let total = tokio::time::timeout(Duration::from_secs(5), dispatcher.run(&source, &cancel))
        .await
        .expect("run should stop once cancelled")
        .unwrap();
    assert_eq!(total, BatchReport::default());
}
