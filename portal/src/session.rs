//! Session identity derived from storage.
//!
//! DESIGN
//! ======
//! Nothing is cached: every read goes back to storage, so a login written by
//! one handle is visible to every other handle sharing the same stores.
//! Durable storage holds `uid` + `cookieid`; the impersonation target lives
//! in ephemeral storage so it never outlives the process.

use std::sync::Arc;

use tracing::info;

use crate::storage::{MemoryStorage, Storage, StorageError};

pub const KEY_UID: &str = "uid";
pub const KEY_COOKIE: &str = "cookieid";
pub const KEY_IMPERSONATE: &str = "impersonateid";

/// Identity attached to outbound requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub uid: String,
    pub cookie: String,
    /// Customer account an admin is acting as, if any.
    pub impersonate: Option<String>,
}

pub struct SessionContext {
    durable: Arc<dyn Storage>,
    ephemeral: Arc<dyn Storage>,
}

impl SessionContext {
    #[must_use]
    pub fn new(durable: Arc<dyn Storage>, ephemeral: Arc<dyn Storage>) -> Self {
        Self { durable, ephemeral }
    }

    /// Session backed only by process memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
    }

    /// Current credentials, or `None` when either half of the identity is missing.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        let uid = non_empty(self.durable.get(KEY_UID))?;
        let cookie = non_empty(self.durable.get(KEY_COOKIE))?;
        Some(Credentials { uid, cookie, impersonate: self.impersonating() })
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.credentials().is_some()
    }

    #[must_use]
    pub fn impersonating(&self) -> Option<String> {
        non_empty(self.ephemeral.get(KEY_IMPERSONATE))
    }

    /// Persist a freshly issued identity.
    ///
    /// # Errors
    ///
    /// Returns an error if durable storage cannot be written.
    pub fn login(&self, uid: &str, cookie: &str) -> Result<(), StorageError> {
        self.durable.set(KEY_UID, uid)?;
        self.durable.set(KEY_COOKIE, cookie)?;
        info!(%uid, "session established");
        Ok(())
    }

    /// Forget the identity and any impersonation.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be cleared.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.ephemeral.remove(KEY_IMPERSONATE)?;
        self.durable.remove(KEY_COOKIE)?;
        self.durable.remove(KEY_UID)?;
        info!("session cleared");
        Ok(())
    }

    /// Act as `account_id` for the rest of this process.
    ///
    /// # Errors
    ///
    /// Returns an error if ephemeral storage cannot be written.
    pub fn impersonate(&self, account_id: &str) -> Result<(), StorageError> {
        self.ephemeral.set(KEY_IMPERSONATE, account_id)?;
        info!(%account_id, "impersonation started");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if ephemeral storage cannot be cleared.
    pub fn stop_impersonating(&self) -> Result<(), StorageError> {
        self.ephemeral.remove(KEY_IMPERSONATE)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
