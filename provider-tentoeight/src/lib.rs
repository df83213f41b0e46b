//! # 10to8 Provider
//!
//! Implements `BookingStore` for the 10to8 Enterprise API v2.
//!
//! ## Overview
//!
//! This module provides:
//! - Customer listing with `next`-URL pagination, optionally including deleted customers
//! - Single customer lookups, creation, partial updates and forced deletes
//! - A shared rate limiter that spaces every call to the API
//! - Customer subscription registration and notification body parsing

pub mod connector;
pub mod error;
pub mod rate_limit;
pub mod subscriptions;
pub mod types;

pub use connector::TenToEightConnector;
pub use error::{Result, TenToEightError};
pub use rate_limit::RateLimiter;
pub use subscriptions::parse_subscription_notification;
