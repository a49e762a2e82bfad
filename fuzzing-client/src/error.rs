//! Error types for the Taskcluster client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors returned by Taskcluster calls
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request never got a response (connection, TLS, timeout)
    #[error("Request to Taskcluster failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("Taskcluster returned {status}: {message}")]
    Status {
        status: u16,
        /// Taskcluster error code, e.g. `InsufficientScopes`
        code: Option<String>,
        message: String,
    },

    /// Success response with an unexpected body
    #[error("Unexpected Taskcluster response: {0}")]
    Body(String),
}

impl ClientError {
    pub fn status(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            code,
            message: message.into(),
        }
    }

    /// The named resource (secret, task) does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// The service refused the request itself (4xx); sending it again won't help
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Status { status, .. } if (400..500).contains(status))
    }

    /// The service failed (5xx) or could not be reached
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status >= 500,
            Self::Transport(_) => true,
            Self::Body(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let err = ClientError::status(404, Some("ResourceNotFound".to_string()), "no such secret");
        assert!(err.is_not_found());
        assert!(err.is_client_error());
        assert!(!err.is_unavailable());

        let err = ClientError::status(503, None, "unavailable");
        assert!(err.is_unavailable());
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "Taskcluster returned 503: unavailable");

        assert!(!ClientError::Body("{}".to_string()).is_unavailable());
    }
}
