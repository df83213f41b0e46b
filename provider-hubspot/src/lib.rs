//! # HubSpot Provider
//!
//! Implements `CrmStore` for the HubSpot CRM v3 contacts API.
//!
//! ## Overview
//!
//! This module provides:
//! - Contact listing with `after` cursors, live or archived
//! - Lookups by id and by the booking-system cross-reference property
//! - Contact creation, partial property updates and archiving
//! - Webhook body parsing into engine notifications

pub mod connector;
pub mod error;
pub mod types;
pub mod webhooks;

pub use connector::HubSpotConnector;
pub use error::{HubSpotError, Result};
pub use webhooks::parse_webhook_notifications;
