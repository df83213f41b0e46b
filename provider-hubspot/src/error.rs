//! Error types for the HubSpot provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// HubSpot provider errors
#[derive(Error, Debug)]
pub enum HubSpotError {
    /// API request returned a non-2xx status
    #[error("HubSpot API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Webhook body could not be read
    #[error("Invalid webhook payload: {0}")]
    InvalidWebhook(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for HubSpot operations
pub type Result<T> = std::result::Result<T, HubSpotError>;

impl From<HubSpotError> for BridgeError {
    fn from(error: HubSpotError) -> Self {
        match error {
            HubSpotError::ApiError {
                status_code,
                message,
            } => BridgeError::remote(status_code, message),
            HubSpotError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            HubSpotError::InvalidWebhook(msg) => {
                BridgeError::OperationFailed(format!("Invalid webhook payload: {}", msg))
            }
            HubSpotError::BridgeError(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = HubSpotError::ApiError {
            status_code: 400,
            message: "Property values were not valid".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "HubSpot API error (status 400): Property values were not valid"
        );
    }

    #[test]
    fn test_error_conversion() {
        let bridge_error: BridgeError = HubSpotError::ApiError {
            status_code: 404,
            message: String::new(),
        }
        .into();
        assert!(bridge_error.is_not_found());

        let bridge_error: BridgeError = HubSpotError::ParseError("eof".to_string()).into();
        assert!(matches!(bridge_error, BridgeError::OperationFailed(_)));
    }
}
