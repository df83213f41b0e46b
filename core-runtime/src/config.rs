//! # Sync Service Configuration
//!
//! Provides configuration management for the contact sync service.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `SyncServiceConfig` instance that holds every credential, endpoint and
//! tuning knob the service needs. It enforces fail-fast validation so a
//! misconfigured deployment stops at startup instead of failing per record.
//!
//! ## Required Settings
//!
//! - Booking system API key (`TTE_ENTERPRISE_API_KEY`)
//! - CRM access token (`HUBSPOT_ACCESS_TOKEN`)
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest)
//!
//! ## Usage
//!
//! ### From the environment
//!
//! ```ignore
//! use core_runtime::config::SyncServiceConfig;
//!
//! let config = SyncServiceConfig::from_env()?;
//! ```
//!
//! ### Explicit
//!
//! ```ignore
//! use core_runtime::config::SyncServiceConfig;
//! use std::sync::Arc;
//!
//! let config = SyncServiceConfig::builder()
//!     .booking_api_key("tte-key")
//!     .crm_access_token("pat-na1-token")
//!     .page_size(50)
//!     .http_client(Arc::new(MyHttpClient))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::HttpClient;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BOOKING_API_BASE: &str = "https://10to8.com";
pub const DEFAULT_CRM_API_BASE: &str = "https://api.hubapi.com";

/// Route on the webhook host that receives booking-system subscription callbacks.
pub const BOOKING_WEBHOOK_ROUTE: &str = "/tte/enterprise_api/webhook/customers/";

/// Environment variable names read by [`SyncServiceConfig::from_env`].
pub mod env_keys {
    pub const BOOKING_API_BASE: &str = "TTE_HOST";
    pub const BOOKING_API_KEY: &str = "TTE_ENTERPRISE_API_KEY";
    pub const CRM_API_BASE: &str = "HUBSPOT_API_BASE";
    pub const CRM_ACCESS_TOKEN: &str = "HUBSPOT_ACCESS_TOKEN";
    pub const WEBHOOK_HOST: &str = "WEBHOOK_HOST";
    pub const TRACK_EXTERNAL_IDS: &str = "TRACK_EXTERNAL_IDS";
    pub const PAGE_SIZE: &str = "SYNC_PAGE_SIZE";
    pub const RATE_LIMIT_DELAY_MS: &str = "TTE_RATE_LIMIT_DELAY_MS";
    pub const REQUEST_TIMEOUT_SECS: &str = "SYNC_REQUEST_TIMEOUT_SECS";
    pub const MAX_CONCURRENT_NOTIFICATIONS: &str = "SYNC_MAX_CONCURRENT_NOTIFICATIONS";
}

/// Configuration for the contact sync service.
///
/// Use [`SyncServiceConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct SyncServiceConfig {
    /// Base URL of the booking system API
    pub booking_api_base: String,

    /// Booking system enterprise API key
    pub booking_api_key: String,

    /// Base URL of the CRM API
    pub crm_api_base: String,

    /// CRM private-app access token
    pub crm_access_token: String,

    /// Public host that receives webhook callbacks
    pub webhook_host: Option<String>,

    /// Minimum spacing between booking system calls, in milliseconds
    pub booking_rate_limit_delay_ms: u64,

    /// Upper bound for every remote call, in seconds
    pub request_timeout_secs: u64,

    /// Engine behaviour
    pub sync: SyncSettings,

    /// HTTP client shared by both providers
    pub http_client: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for SyncServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncServiceConfig")
            .field("booking_api_base", &self.booking_api_base)
            .field("booking_api_key", &"[REDACTED]")
            .field("crm_api_base", &self.crm_api_base)
            .field("crm_access_token", &"[REDACTED]")
            .field("webhook_host", &self.webhook_host)
            .field(
                "booking_rate_limit_delay_ms",
                &self.booking_rate_limit_delay_ms,
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("sync", &self.sync)
            .field("http_client", &"HttpClient { ... }")
            .finish()
    }
}

/// Settings that shape how the engine reconciles records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// Write each side's identifier back into the other side
    pub track_external_ids: bool,

    /// Records requested per page during a sweep
    pub page_size: usize,

    /// Notifications processed concurrently
    pub max_concurrent_notifications: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            track_external_ids: true,
            page_size: 10,
            max_concurrent_notifications: 8,
        }
    }
}

impl SyncServiceConfig {
    /// Creates a new builder for constructing a `SyncServiceConfig`.
    pub fn builder() -> SyncServiceConfigBuilder {
        SyncServiceConfigBuilder::default()
    }

    /// Loads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        SyncServiceConfigBuilder::from_env()?.build()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn booking_rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.booking_rate_limit_delay_ms)
    }

    /// Callback URL registered with the booking system, if a webhook host is set.
    pub fn booking_webhook_url(&self) -> Option<String> {
        self.webhook_host.as_ref().map(|host| {
            format!("{}{}", host.trim_end_matches('/'), BOOKING_WEBHOOK_ROUTE)
        })
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.booking_api_base.trim().is_empty() {
            return Err(Error::Config(
                "Booking API base URL cannot be empty".to_string(),
            ));
        }

        if self.booking_api_key.trim().is_empty() {
            return Err(Error::Config(format!(
                "Booking API key cannot be empty. Set {} or use .booking_api_key().",
                env_keys::BOOKING_API_KEY
            )));
        }

        if self.crm_api_base.trim().is_empty() {
            return Err(Error::Config("CRM API base URL cannot be empty".to_string()));
        }

        if self.crm_access_token.trim().is_empty() {
            return Err(Error::Config(format!(
                "CRM access token cannot be empty. Set {} or use .crm_access_token().",
                env_keys::CRM_ACCESS_TOKEN
            )));
        }

        if self.sync.page_size == 0 || self.sync.page_size > 100 {
            return Err(Error::Config(
                "Page size must be between 1 and 100".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(Error::Config(
                "Request timeout must be between 1 and 300 seconds".to_string(),
            ));
        }

        if self.booking_rate_limit_delay_ms > 60_000 {
            return Err(Error::Config(
                "Rate limit delay exceeds maximum of 60 seconds (60,000ms)".to_string(),
            ));
        }

        if self.sync.max_concurrent_notifications == 0 {
            return Err(Error::Config(
                "At least one notification must be allowed in flight".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_timeout(timeout).map_err(|e| Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: e.to_string(),
    })?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required to reach the remote APIs. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default ReqwestHttpClient. \
                 Otherwise inject one with .http_client()."
            .to_string(),
    })
}

/// Builder for constructing [`SyncServiceConfig`] instances.
#[derive(Default)]
pub struct SyncServiceConfigBuilder {
    booking_api_base: Option<String>,
    booking_api_key: Option<String>,
    crm_api_base: Option<String>,
    crm_access_token: Option<String>,
    webhook_host: Option<String>,
    booking_rate_limit_delay_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    sync: SyncSettings,
    http_client: Option<Arc<dyn HttpClient>>,
}

impl SyncServiceConfigBuilder {
    /// Builder pre-populated from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builder pre-populated from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut builder = Self::default();
        builder.booking_api_base = get(env_keys::BOOKING_API_BASE);
        builder.booking_api_key = get(env_keys::BOOKING_API_KEY);
        builder.crm_api_base = get(env_keys::CRM_API_BASE);
        builder.crm_access_token = get(env_keys::CRM_ACCESS_TOKEN);
        builder.webhook_host = get(env_keys::WEBHOOK_HOST);

        if let Some(value) = get(env_keys::TRACK_EXTERNAL_IDS) {
            builder.sync.track_external_ids = parse_bool(env_keys::TRACK_EXTERNAL_IDS, &value)?;
        }
        if let Some(value) = get(env_keys::PAGE_SIZE) {
            builder.sync.page_size = parse_number(env_keys::PAGE_SIZE, &value)?;
        }
        if let Some(value) = get(env_keys::MAX_CONCURRENT_NOTIFICATIONS) {
            builder.sync.max_concurrent_notifications =
                parse_number(env_keys::MAX_CONCURRENT_NOTIFICATIONS, &value)?;
        }
        if let Some(value) = get(env_keys::RATE_LIMIT_DELAY_MS) {
            builder.booking_rate_limit_delay_ms =
                Some(parse_number(env_keys::RATE_LIMIT_DELAY_MS, &value)?);
        }
        if let Some(value) = get(env_keys::REQUEST_TIMEOUT_SECS) {
            builder.request_timeout_secs =
                Some(parse_number(env_keys::REQUEST_TIMEOUT_SECS, &value)?);
        }

        Ok(builder)
    }

    /// Sets the booking system base URL.
    ///
    /// Default: `https://10to8.com`
    pub fn booking_api_base(mut self, url: impl Into<String>) -> Self {
        self.booking_api_base = Some(url.into());
        self
    }

    /// Sets the booking system API key (required).
    pub fn booking_api_key(mut self, key: impl Into<String>) -> Self {
        self.booking_api_key = Some(key.into());
        self
    }

    /// Sets the CRM base URL.
    ///
    /// Default: `https://api.hubapi.com`
    pub fn crm_api_base(mut self, url: impl Into<String>) -> Self {
        self.crm_api_base = Some(url.into());
        self
    }

    /// Sets the CRM access token (required).
    pub fn crm_access_token(mut self, token: impl Into<String>) -> Self {
        self.crm_access_token = Some(token.into());
        self
    }

    /// Sets the public host used to build webhook callback URLs.
    pub fn webhook_host(mut self, host: impl Into<String>) -> Self {
        self.webhook_host = Some(host.into());
        self
    }

    /// Enables or disables writing identifiers back across systems.
    ///
    /// Default: true
    pub fn track_external_ids(mut self, enabled: bool) -> Self {
        self.sync.track_external_ids = enabled;
        self
    }

    /// Sets the sweep page size.
    ///
    /// Default: 10
    pub fn page_size(mut self, size: usize) -> Self {
        self.sync.page_size = size;
        self
    }

    /// Sets the maximum number of notifications handled concurrently.
    ///
    /// Default: 8
    pub fn max_concurrent_notifications(mut self, limit: usize) -> Self {
        self.sync.max_concurrent_notifications = limit;
        self
    }

    /// Sets the minimum delay before each booking system call.
    ///
    /// Default: 1000ms
    pub fn booking_rate_limit_delay_ms(mut self, delay_ms: u64) -> Self {
        self.booking_rate_limit_delay_ms = Some(delay_ms);
        self
    }

    /// Sets the timeout applied to every remote call.
    ///
    /// Default: 30 seconds
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) will be used when
    /// the `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the final `SyncServiceConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(SyncServiceConfig)` on success, or an error if:
    /// - Required credentials are missing
    /// - Configuration values are out of range
    /// - No `HttpClient` is available
    pub fn build(self) -> Result<SyncServiceConfig> {
        let booking_api_key = self.booking_api_key.ok_or_else(|| {
            Error::Config(format!(
                "Booking API key is required. Set {} or use .booking_api_key().",
                env_keys::BOOKING_API_KEY
            ))
        })?;
        let crm_access_token = self.crm_access_token.ok_or_else(|| {
            Error::Config(format!(
                "CRM access token is required. Set {} or use .crm_access_token().",
                env_keys::CRM_ACCESS_TOKEN
            ))
        })?;
        let request_timeout_secs = self.request_timeout_secs.unwrap_or(30);

        let config = SyncServiceConfig {
            booking_api_base: self
                .booking_api_base
                .unwrap_or_else(|| DEFAULT_BOOKING_API_BASE.to_string()),
            booking_api_key,
            crm_api_base: self
                .crm_api_base
                .unwrap_or_else(|| DEFAULT_CRM_API_BASE.to_string()),
            crm_access_token,
            webhook_host: self.webhook_host,
            booking_rate_limit_delay_ms: self.booking_rate_limit_delay_ms.unwrap_or(1000),
            request_timeout_secs,
            sync: self.sync,
            http_client: match self.http_client {
                Some(client) => client,
                None => provide_default_http_client(Duration::from_secs(request_timeout_secs))?,
            },
        };

        config.validate()?;
        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!(
            "{} must be a boolean (true/false), got '{}'",
            key, other
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::Config(format!(
            "{} must be a non-negative integer, got '{}'",
            key, value
        ))
    })
}
