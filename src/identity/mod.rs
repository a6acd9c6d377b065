//! Learner identity
//!
//! An identity is either absent (anonymous, local-only progress) or a
//! resolved user id with an optional bearer token. Stores reload whenever
//! the identity changes between the two.

pub mod credentials;
pub mod error;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

pub use credentials::CredentialStore;
pub use error::IdentityError;

/// A resolved learner identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    /// Bearer token for the progress API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), token: None }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Source of the current identity, with change notification
#[derive(Debug)]
pub struct IdentityProvider {
    tx: watch::Sender<Option<Identity>>,
}

impl Default for IdentityProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl IdentityProvider {
    pub fn new(initial: Option<Identity>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// The identity right now, if any
    pub fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    /// Sign in. Subscribers are only notified when the identity changes.
    pub fn set(&self, identity: Identity) {
        let changed = self.tx.send_if_modified(|current| {
            if current.as_ref() == Some(&identity) {
                return false;
            }
            *current = Some(identity.clone());
            true
        });
        if changed {
            info!("Signed in as {}", identity.user_id);
        }
    }

    /// Sign out
    pub fn clear(&self) {
        let changed = self.tx.send_if_modified(|current| current.take().is_some());
        if changed {
            info!("Signed out");
        }
    }

    /// Receive identity transitions
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}
