use std::sync::Arc;

use tokio::sync::watch;

use super::types::Identity;
use crate::storage::{Storage, REFRESH_TOKEN_KEY, TOKEN_KEY, USER_KEY};

/// Persisted credential pair plus the observable authenticated identity.
///
/// The access and refresh credentials are written and cleared together, and
/// the identity channel always mirrors the persisted `user` key, so the
/// observable state and storage can never disagree.
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    identity_tx: watch::Sender<Option<Identity>>,
}

impl SessionStore {
    /// Create a session store over the given storage, hydrating the
    /// observable identity from a previously persisted session
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let initial = match (storage.get(TOKEN_KEY), storage.get(USER_KEY)) {
            (Some(_), Some(raw)) => match serde_json::from_str(&raw) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    tracing::warn!("Ignoring unparsable persisted identity: {}", e);
                    None
                }
            },
            _ => None,
        };

        let (identity_tx, _) = watch::channel(initial);

        Self {
            storage,
            identity_tx,
        }
    }

    /// Current access credential, if any
    pub fn access_token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    /// Current refresh credential, if any
    pub fn refresh_token(&self) -> Option<String> {
        self.storage.get(REFRESH_TOKEN_KEY)
    }

    /// Whether an access credential is currently persisted
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Persist a new credential pair. A missing refresh credential keeps the
    /// previous one (the server does not always rotate it)
    pub fn store_tokens(&self, access_token: &str, refresh_token: Option<&str>) {
        self.storage.set(TOKEN_KEY, access_token);
        if let Some(refresh_token) = refresh_token {
            self.storage.set(REFRESH_TOKEN_KEY, refresh_token);
        }
    }

    /// Persist the identity and publish it to every subscriber
    pub fn store_identity(&self, identity: &Identity) {
        match serde_json::to_string(identity) {
            Ok(raw) => self.storage.set(USER_KEY, &raw),
            Err(e) => tracing::error!("Failed to serialize identity: {}", e),
        }
        self.identity_tx.send_replace(Some(identity.clone()));
    }

    /// Snapshot of the current identity
    pub fn identity(&self) -> Option<Identity> {
        self.identity_tx.borrow().clone()
    }

    /// Subscribe to identity changes. Last write wins; every live receiver
    /// observes the change
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity_tx.subscribe()
    }

    /// Remove every persisted value and reset the observable state to
    /// unauthenticated. Safe to call when already logged out
    pub fn clear(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(REFRESH_TOKEN_KEY);
        self.storage.remove(USER_KEY);
        self.identity_tx.send_replace(None);
    }
}
