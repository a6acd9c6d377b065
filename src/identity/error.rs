//! Error types for identity and credential handling

use thiserror::Error;

/// Errors that can occur when storing or restoring credentials
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No credentials have been stored
    #[error("Not signed in. Run `learnpath login` to sign in")]
    NotSignedIn,

    /// Failed to access system keyring
    #[error("Failed to access keyring: {0}")]
    KeyringError(String),

    /// User id was empty or contained whitespace
    #[error("Invalid user id: {0:?}")]
    InvalidUserId(String),

    /// Stored credentials could not be parsed
    #[error("Stored credentials are malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}
