// Error handling module
// Defines the error taxonomy for transport and credential operations

use thiserror::Error;

/// API errors that can occur during request processing
#[derive(Error, Debug)]
pub enum ApiError {
    /// Server replied with a non-success status
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Transport-level failure (connect, timeout, decode)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Whether this error means the caller's credentials were rejected
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ApiError::Status {
            status: 404,
            message: "record not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 404 - record not found");

        let err = ApiError::Internal(anyhow::anyhow!("something went wrong"));
        assert_eq!(err.to_string(), "Internal error: something went wrong");
    }

    #[test]
    fn test_is_unauthorized() {
        let err = ApiError::Status {
            status: 401,
            message: "invalid token".to_string(),
        };
        assert!(err.is_unauthorized());

        let err = ApiError::Status {
            status: 500,
            message: "server error".to_string(),
        };
        assert!(!err.is_unauthorized());

        let err = ApiError::Internal(anyhow::anyhow!("boom"));
        assert!(!err.is_unauthorized());
    }
}
