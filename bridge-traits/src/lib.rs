//! # Host Bridge Traits
//!
//! Capability traits the reconciliation engine depends on.
//!
//! ## Overview
//!
//! This crate defines the contract between the sync engine and the concrete
//! collaborators around it. Each trait represents a capability that the core
//! requires but that is implemented elsewhere: HTTP transport by the host, the
//! record stores by the provider crates, notifications by a webhook front-end.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with timeouts and retry
//!
//! ### Records
//! - [`BookingStore`](store::BookingStore) - Customer collection of the booking system
//! - [`CrmStore`](store::CrmStore) - Contact collection of the CRM
//! - [`NotificationSource`](notifications::NotificationSource) - Change notifications
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. A remote
//! system answering with a non-2xx status is reported as
//! [`BridgeError::Remote`](error::BridgeError::Remote) carrying the status and
//! body. Single-record lookups report a missing record as
//! [`Fetched::NotFound`](contacts::Fetched::NotFound) rather than an error.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent usage
//! across async tasks.
//!
//! ## Examples
//!
//! ### Implementing HttpClient
//!
//! ```ignore
//! use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct MyHttpClient {
//!     client: reqwest::Client,
//! }
//!
//! #[async_trait]
//! impl HttpClient for MyHttpClient {
//!     async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
//!         // Implementation
//!         todo!()
//!     }
//! }
//! ```

pub mod contacts;
pub mod error;
pub mod http;
pub mod notifications;
pub mod store;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use contacts::{
    BookingAttributes, BookingCustomer, ContactField, CrmContact, CrmProperties, Fetched,
    EXTERNAL_ID_SEPARATOR, SECONDARY_VALUE_SEPARATOR,
};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use notifications::{Notification, NotificationKind, NotificationSource, RecordSystem};
pub use store::{BookingStore, CrmStore};
pub use time::{Clock, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
