//! Core service façade and bootstrap helpers.
//!
//! This crate wires the runtime configuration into the provider connectors
//! and the reconciliation engine. Hosts build a [`SyncService`] once, then
//! call into it from their scheduler (full sweeps) and from their webhook
//! routes (notification bodies). Desktop hosts typically enable the
//! `desktop-shims` feature so the configuration supplies a reqwest-backed
//! HTTP client.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{BookingStore, Clock, CrmStore, Notification, NotificationSource, SystemClock};
use core_runtime::config::{SyncServiceConfig, SyncSettings};
use core_runtime::events::EventBus;
use core_sync::{
    BatchReport, CancellationToken, FullSyncReport, NotificationDispatcher, SyncContext,
    SyncCoordinator, SyncOptions,
};
use provider_hubspot::{parse_webhook_notifications, HubSpotConnector};
use provider_tentoeight::{parse_subscription_notification, RateLimiter, TenToEightConnector};
use tracing::{info, instrument};

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct SyncService {
    ctx: Arc<SyncContext>,
    coordinator: SyncCoordinator,
    dispatcher: NotificationDispatcher,
    /// Present when built from configuration; subscription setup needs it
    booking_connector: Option<TenToEightConnector>,
    booking_webhook_url: Option<String>,
    shutdown: CancellationToken,
}

impl SyncService {
    /// Build the service from a validated configuration.
    pub fn new(config: SyncServiceConfig) -> Result<Self> {
        config.validate()?;

        let booking = TenToEightConnector::new(config.http_client.clone(), &config.booking_api_key)
            .with_api_base(&config.booking_api_base)
            .with_rate_limiter(RateLimiter::new(config.booking_rate_limit_delay()))
            .with_timeout(config.request_timeout());

        let crm = HubSpotConnector::new(config.http_client.clone(), &config.crm_access_token)
            .with_api_base(&config.crm_api_base)
            .with_timeout(config.request_timeout());

        let mut service = Self::with_stores(
            Arc::new(booking.clone()),
            Arc::new(crm),
            Arc::new(SystemClock),
            config.sync,
        )?;
        service.booking_connector = Some(booking);
        service.booking_webhook_url = config.booking_webhook_url();

        info!(
            booking_api = %config.booking_api_base,
            crm_api = %config.crm_api_base,
            "Sync service initialised"
        );
        Ok(service)
    }

    /// Build the service over caller-supplied stores.
    ///
    /// Subscription setup is unavailable on a service built this way.
    pub fn with_stores(
        booking: Arc<dyn BookingStore>,
        crm: Arc<dyn CrmStore>,
        clock: Arc<dyn Clock>,
        settings: SyncSettings,
    ) -> Result<Self> {
        let ctx = Arc::new(SyncContext::new(
            booking,
            crm,
            clock,
            SyncOptions::from(&settings),
            Arc::new(EventBus::default()),
        )?);

        Ok(Self {
            coordinator: SyncCoordinator::new(ctx.clone()),
            dispatcher: NotificationDispatcher::new(
                ctx.clone(),
                settings.max_concurrent_notifications,
            ),
            ctx,
            booking_connector: None,
            booking_webhook_url: None,
            shutdown: CancellationToken::new(),
        })
    }

    /// Bus carrying sweep and per-record events.
    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(self.ctx.event_bus())
    }

    /// Reconcile both collections in full: booking customers outbound
    /// (live, then deleted), then CRM contacts inbound (live, then archived).
    pub async fn full_sync(&self) -> FullSyncReport {
        self.coordinator.full_sync(&self.shutdown).await
    }

    /// Process one delivery of notifications.
    pub async fn handle_notifications(&self, delivery: Vec<Notification>) -> BatchReport {
        self.dispatcher.dispatch(delivery).await
    }

    /// Process a booking-system subscription callback body.
    #[instrument(skip(self, body), fields(bytes = body.len()))]
    pub async fn handle_booking_webhook(&self, body: &[u8]) -> Result<BatchReport> {
        let delivery = parse_subscription_notification(body)?;
        Ok(self.handle_notifications(delivery).await)
    }

    /// Process a CRM webhook body.
    #[instrument(skip(self, body), fields(bytes = body.len()))]
    pub async fn handle_crm_webhook(&self, body: &[u8]) -> Result<BatchReport> {
        let delivery = parse_webhook_notifications(body)?;
        Ok(self.handle_notifications(delivery).await)
    }

    /// Pull deliveries from `source` until it is exhausted or the service
    /// shuts down.
    pub async fn run_notifications(&self, source: &dyn NotificationSource) -> Result<BatchReport> {
        Ok(self.dispatcher.run(source, &self.shutdown).await?)
    }

    /// Point the booking system's customer subscription at this service.
    #[instrument(skip(self))]
    pub async fn register_booking_subscription(&self) -> Result<()> {
        let connector = self
            .booking_connector
            .as_ref()
            .ok_or_else(|| CoreError::CapabilityMissing {
                capability: "TenToEightConnector".to_string(),
                message: "subscription setup needs a service built with SyncService::new"
                    .to_string(),
            })?;
        let callback_url = self.booking_webhook_url.as_deref().ok_or_else(|| {
            CoreError::Runtime(core_runtime::Error::Config(format!(
                "Webhook host is not configured. Set {} or use .webhook_host().",
                core_runtime::config::env_keys::WEBHOOK_HOST
            )))
        })?;

        connector.register_customer_subscription(callback_url).await?;
        Ok(())
    }

    /// Stop running sweeps and notification loops at their next checkpoint.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
