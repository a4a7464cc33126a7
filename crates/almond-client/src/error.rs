//! Client error types.

use thiserror::Error;

/// Boxed error returned by token accessors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// `host + path` is not a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered with a status of 400 or above.
    #[error("HTTP status {status}: {reason}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },

    /// The token accessor failed or produced an unusable token.
    #[error("Authentication failed: {0}")]
    Auth(#[source] BoxError),

    /// Device configuration is not an object or has no `kind`.
    #[error("Invalid device configuration: {0}")]
    InvalidDevice(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a status error from a response status code.
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        Error::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    /// HTTP status code, if this error came from a failed response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Status { status: 404, .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_)) || matches!(self, Error::Status { status: 401, .. })
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Status { status: 429, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Status { status, .. } if *status >= 500)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_uses_canonical_reason() {
        let err = Error::from_status(StatusCode::NOT_FOUND);
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP status 404: Not Found");
    }

    #[test]
    fn test_classification() {
        assert!(Error::from_status(StatusCode::UNAUTHORIZED).is_auth_error());
        assert!(Error::from_status(StatusCode::TOO_MANY_REQUESTS).is_rate_limited());
        assert!(Error::from_status(StatusCode::BAD_GATEWAY).is_server_error());
        assert!(!Error::from_status(StatusCode::BAD_REQUEST).is_server_error());

        let auth = Error::Auth("token expired".into());
        assert!(auth.is_auth_error());
        assert_eq!(auth.status(), None);
    }

    #[test]
    fn test_auth_error_keeps_source() {
        use std::error::Error as _;

        let err = Error::Auth("session expired".into());
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "session expired");
    }
}
