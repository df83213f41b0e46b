//! Error types for the 10to8 provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// 10to8 provider errors
#[derive(Error, Debug)]
pub enum TenToEightError {
    /// API request returned a non-2xx status
    #[error("10to8 API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// A create call succeeded without telling us where the customer lives
    #[error("10to8 create response carried no Location header")]
    MissingLocation,

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Subscription notification body could not be read
    #[error("Invalid subscription notification: {0}")]
    InvalidNotification(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for 10to8 operations
pub type Result<T> = std::result::Result<T, TenToEightError>;

impl From<TenToEightError> for BridgeError {
    fn from(error: TenToEightError) -> Self {
        match error {
            TenToEightError::ApiError {
                status_code,
                message,
            } => BridgeError::remote(status_code, message),
            TenToEightError::MissingLocation => BridgeError::OperationFailed(
                "Customer created but no Location header returned".to_string(),
            ),
            TenToEightError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            TenToEightError::InvalidNotification(msg) => {
                BridgeError::OperationFailed(format!("Invalid notification: {}", msg))
            }
            TenToEightError::BridgeError(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = TenToEightError::ApiError {
            status_code: 409,
            message: "Customer has future events".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "10to8 API error (status 409): Customer has future events"
        );
    }

    #[test]
    fn test_api_error_keeps_status() {
        let error = TenToEightError::ApiError {
            status_code: 404,
            message: "Not found".to_string(),
        };
        let bridge_error: BridgeError = error.into();

        assert!(bridge_error.is_not_found());
    }

    #[test]
    fn test_error_conversion() {
        let bridge_error: BridgeError = TenToEightError::MissingLocation.into();

        assert!(matches!(bridge_error, BridgeError::OperationFailed(_)));
    }
}
