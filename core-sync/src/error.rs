use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Remote store error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Page fetch failed after {pages} page(s): {source}")]
    Pagination {
        pages: u64,
        #[source]
        source: BridgeError,
    },

    #[error("Invalid notification: {0}")]
    InvalidNotification(String),

    #[error("Invalid sync configuration: {0}")]
    Config(String),
}

impl SyncError {
    /// HTTP status reported by the remote system, if any.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            SyncError::Bridge(e) | SyncError::Pagination { source: e, .. } => e.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
