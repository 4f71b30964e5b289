//! In-memory session state backed by a [`CredentialStore`].
//!
//! LIFECYCLE
//! =========
//! `restore` (startup) -> authenticated <-> unauthenticated -> drop.
//!
//! The store never calls the network. A stored token is trusted until some
//! later API call is rejected by the server.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::Arc;

use super::storage::{CredentialStore, TokenSource};
use crate::error::StorageError;
use crate::net::types::Principal;

/// Current authenticated identity plus its durable backing.
pub struct SessionStore {
    storage: Arc<dyn CredentialStore>,
    principal: Option<Principal>,
}

impl SessionStore {
    /// Load whatever session a previous run left in `storage`.
    ///
    /// Unreadable or malformed data is treated as "no session": the
    /// identity stays empty, the leftover pair is erased, and the problem is
    /// only logged.
    pub fn restore(storage: Arc<dyn CredentialStore>) -> Self {
        let principal = match load_principal(storage.as_ref()) {
            Ok(principal) => principal,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unusable stored session");
                if let Err(e) = storage.erase_pair() {
                    tracing::warn!(error = %e, "failed to erase unusable stored session");
                }
                None
            }
        };
        if let Some(p) = &principal {
            tracing::info!(user = %p.email, role = %p.role, "session restored");
        }
        Self { storage, principal }
    }

    /// Persist the credential pair, then adopt `principal` as the identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the pair cannot be written; the in-memory identity
    /// is left untouched in that case.
    pub fn login(&mut self, token: &str, principal: Principal) -> Result<(), StorageError> {
        let snapshot = serde_json::to_string(&principal)?;
        self.storage.store_pair(token, &snapshot)?;
        tracing::info!(user = %principal.email, role = %principal.role, "signed in");
        self.principal = Some(principal);
        Ok(())
    }

    /// Clear the identity and erase the credential pair.
    ///
    /// The in-memory identity is cleared even when erasing fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored pair cannot be removed.
    pub fn logout(&mut self) -> Result<(), StorageError> {
        if let Some(p) = self.principal.take() {
            tracing::info!(user = %p.email, "signed out");
        }
        self.storage.erase_pair()
    }

    #[must_use]
    pub fn current_principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Read-only token handle for the API client.
    #[must_use]
    pub fn token_source(&self) -> Arc<dyn TokenSource> {
        self.storage.clone()
    }
}

fn load_principal(storage: &dyn CredentialStore) -> Result<Option<Principal>, StorageError> {
    let has_token = storage.token()?.is_some_and(|t| !t.is_empty());
    let Some(raw) = storage.principal_raw()? else {
        if has_token {
            return Err(StorageError::Corrupt("token stored without a principal".to_owned()));
        }
        return Ok(None);
    };
    let principal: Principal = serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt(e.to_string()))?;
    if !has_token {
        return Err(StorageError::Corrupt("principal stored without a token".to_owned()));
    }
    Ok(Some(principal))
}
