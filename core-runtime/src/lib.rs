//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the contact sync service:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the engine and the service
//! façade depend on. It establishes the logging conventions, the configuration
//! surface and the event broadcasting mechanism used throughout the workspace.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{SyncServiceConfig, SyncServiceConfigBuilder, SyncSettings};
pub use error::{Error, Result};
