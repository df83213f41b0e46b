//! Workspace umbrella crate.
//!
//! Exposes the feature flags of the individual workspace crates so a host
//! application can depend on `contact-sync-workspace` and enable the desktop
//! defaults without wiring `core-service` by hand.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
