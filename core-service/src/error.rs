use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Sync error: {0}")]
    Sync(#[from] core_sync::SyncError),

    #[error("Booking system error: {0}")]
    Booking(#[from] provider_tentoeight::TenToEightError),

    #[error("CRM error: {0}")]
    Crm(#[from] provider_hubspot::HubSpotError),

    #[error("Remote call failed: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
