//! Error types for pgrest

use thiserror::Error;

/// Result type alias for pgrest operations
pub type RestResult<T> = Result<T, RestError>;

/// Errors raised by the client and query builders.
///
/// Non-success HTTP statuses are *not* errors at this level: `execute()`
/// normalizes them into [`RestResponse::Failure`](crate::RestResponse::Failure).
/// Only the typed `fetch` helpers lift a failure into [`RestError::Api`].
#[derive(Debug, Error)]
pub enum RestError {
    /// Missing or invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection, timeout, or body read failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Invalid request URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Payload could not be serialized to JSON
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Response could not be decoded into the requested type
    #[error("Decode error: {0}")]
    Decode(String),

    /// The store answered with a non-success status
    #[error("REST API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl RestError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Check if this is a transport-level error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this is a store-reported error
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// HTTP status of a store-reported error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_status() {
        let err = RestError::Api {
            status: 409,
            message: "duplicate key".into(),
        };
        assert!(err.is_api());
        assert!(!err.is_transport());
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.to_string(), "REST API error (409): duplicate key");
    }

    #[test]
    fn config_error_has_no_status() {
        let err = RestError::config("missing SUPABASE_URL");
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "Configuration error: missing SUPABASE_URL");
    }
}
