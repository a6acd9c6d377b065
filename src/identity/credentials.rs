//! Identity persistence using the system keyring

use keyring::Entry;

use super::Identity;
use super::error::IdentityError;

/// Service name for keyring storage
const SERVICE_NAME: &str = "learnpath";
/// Entry name for the signed-in identity
const IDENTITY_ENTRY: &str = "session";

/// Stores the signed-in identity in the system keyring
pub struct CredentialStore;

impl CredentialStore {
    fn entry() -> Result<Entry, IdentityError> {
        Entry::new(SERVICE_NAME, IDENTITY_ENTRY)
            .map_err(|e| IdentityError::KeyringError(e.to_string()))
    }

    /// Restore the stored identity
    pub fn load() -> Result<Identity, IdentityError> {
        let raw = Self::entry()?.get_password().map_err(|e| match e {
            keyring::Error::NoEntry => IdentityError::NotSignedIn,
            _ => IdentityError::KeyringError(e.to_string()),
        })?;

        Ok(serde_json::from_str(&raw)?)
    }

    /// Restore the stored identity, treating any failure as anonymous
    pub fn load_optional() -> Option<Identity> {
        match Self::load() {
            Ok(identity) => Some(identity),
            Err(IdentityError::NotSignedIn) => None,
            Err(e) => {
                tracing::warn!("Continuing anonymously: {}", e);
                None
            }
        }
    }

    /// Persist an identity
    pub fn save(identity: &Identity) -> Result<(), IdentityError> {
        if !Self::validate_user_id(&identity.user_id) {
            return Err(IdentityError::InvalidUserId(identity.user_id.clone()));
        }

        let raw = serde_json::to_string(identity)?;
        Self::entry()?.set_password(&raw).map_err(|e| IdentityError::KeyringError(e.to_string()))
    }

    /// Delete the stored identity
    pub fn delete() -> Result<(), IdentityError> {
        Self::entry()?.delete_credential().map_err(|e| match e {
            keyring::Error::NoEntry => IdentityError::NotSignedIn,
            _ => IdentityError::KeyringError(e.to_string()),
        })
    }

    fn validate_user_id(user_id: &str) -> bool {
        !user_id.is_empty() && !user_id.chars().any(char::is_whitespace)
    }

    /// Mask a token for display (show first and last 4 chars)
    pub fn mask_token(token: &str) -> String {
        let len = token.chars().count();
        if len <= 12 {
            return "*".repeat(len);
        }
        let prefix: String = token.chars().take(4).collect();
        let suffix: String = token.chars().skip(len - 4).collect();
        format!("{}...{}", prefix, suffix)
    }
}
