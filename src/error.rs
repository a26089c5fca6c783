// Error types for placard.
// Splits request failures (retry taxonomy) from general application errors.

use thiserror::Error;

/// Failure of a single request against the remote API.
///
/// Cloneable so one resolved failure can be handed to every caller that
/// shared the same in-flight request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: HTTP {status}")]
    Server { status: u16, message: String },

    #[error("Client error: HTTP {status}")]
    Client { status: u16, message: String },

    #[error("Request timeout reported by server (HTTP 408)")]
    ClientTimeout,

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            408 => FetchError::ClientTimeout,
            500..=599 => FetchError::Server { status, message },
            _ => FetchError::Client { status, message },
        }
    }

    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchError::Network(_)
                | FetchError::Timeout
                | FetchError::Server { .. }
                | FetchError::ClientTimeout
        )
    }

    /// Short text for notifications.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Client { status: 404, .. } => "Resource not found",
            FetchError::Server { .. } => "Server error occurred",
            FetchError::Timeout | FetchError::ClientTimeout => "Request timeout",
            FetchError::Network(_) => "Network error - please check your connection",
            FetchError::Client { .. } | FetchError::Decode(_) => "An unexpected error occurred",
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum PlacardError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PlacardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(FetchError::from_status(408, ""), FetchError::ClientTimeout);
        assert!(matches!(
            FetchError::from_status(503, "down"),
            FetchError::Server { status: 503, .. }
        ));
        assert!(matches!(
            FetchError::from_status(404, ""),
            FetchError::Client { status: 404, .. }
        ));
    }

    #[test]
    fn test_retryable_taxonomy() {
        assert!(FetchError::Network("reset".into()).is_retryable());
        assert!(FetchError::Timeout.is_retryable());
        assert!(FetchError::ClientTimeout.is_retryable());
        assert!(FetchError::from_status(500, "").is_retryable());
        assert!(!FetchError::from_status(404, "").is_retryable());
        assert!(!FetchError::from_status(422, "").is_retryable());
        assert!(!FetchError::Decode("eof".into()).is_retryable());
    }

    #[test]
    fn test_user_message() {
        assert_eq!(
            FetchError::from_status(404, "").user_message(),
            "Resource not found"
        );
        assert_eq!(
            FetchError::from_status(500, "").user_message(),
            "Server error occurred"
        );
        assert_eq!(FetchError::Timeout.user_message(), "Request timeout");
    }
}
