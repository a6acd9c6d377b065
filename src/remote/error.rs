//! Error types for the remote progress store

use thiserror::Error;

/// Errors that can occur when talking to the remote store
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The identity has no bearer token
    #[error("No access token for user {user_id}")]
    MissingToken {
        /// User the request was made for
        user_id: String,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Token was rejected
    #[error("Unauthorized: access token rejected")]
    Unauthorized,

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Store is unreachable
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
}

impl RemoteError {
    /// Check if this error requires signing in again
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            RemoteError::MissingToken { .. }
                | RemoteError::Unauthorized
                | RemoteError::ApiError { status: 401, .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_requires_reauth() {
        assert!(RemoteError::Unauthorized.requires_reauth());
        assert!(RemoteError::MissingToken { user_id: "u".into() }.requires_reauth());
        assert!(!RemoteError::Unavailable("down".into()).requires_reauth());
    }

    #[test]
    fn api_error_message_includes_status() {
        let err = RemoteError::ApiError { status: 503, message: "maintenance".into() };
        assert_eq!(err.to_string(), "API error (503): maintenance");
    }
}
