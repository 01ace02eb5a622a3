//! Navigation guard and auto-saving editor sessions.
//!
//! DESIGN
//! ======
//! At most one guard predicate is installed at a time. Registering a new one
//! replaces the old. The [`GuardHandle`] returned by `register` uninstalls its
//! predicate on drop, but only if that predicate is still the installed one,
//! so a stale handle never removes a newer guard.
//!
//! A navigation proceeds only when the predicate resolves to `Ok(true)`.
//! `Ok(false)` and `Err(_)` both block it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use futures::future::BoxFuture;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info};

use crate::error::ClientError;

pub type GuardFuture = BoxFuture<'static, Result<bool, ClientError>>;
pub type GuardPredicate = Arc<dyn Fn() -> GuardFuture + Send + Sync>;

/// Performs the actual route change once a guard allows it.
pub trait Navigator: Send + Sync {
    fn go(&self, to: &str);
}

/// Navigator that only records where it was sent.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    visited: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.visited.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }
}

impl Navigator for HistoryNavigator {
    fn go(&self, to: &str) {
        self.visited.lock().unwrap_or_else(PoisonError::into_inner).push(to.to_owned());
    }
}

// =============================================================================
// GUARD
// =============================================================================

struct Installed {
    id: u64,
    predicate: GuardPredicate,
}

#[derive(Default)]
pub struct NavigationGuard {
    installed: Mutex<Option<Installed>>,
    next_id: AtomicU64,
}

impl NavigationGuard {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Install `predicate`, replacing any existing guard.
    #[must_use = "dropping the handle uninstalls the guard"]
    pub fn register(self: &Arc<Self>, predicate: GuardPredicate) -> GuardHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let previous = self
            .installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Installed { id, predicate });
        debug!(id, replaced = previous.is_some(), "navigation guard registered");
        GuardHandle { guard: Arc::downgrade(self), id }
    }

    /// Remove whatever guard is installed.
    pub fn clear(&self) {
        self.installed.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.installed.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Run the installed predicate, if any. No guard means navigation is allowed.
    pub async fn can_navigate(&self) -> bool {
        let predicate = self
            .installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|installed| Arc::clone(&installed.predicate));
        let Some(predicate) = predicate else {
            return true;
        };
        match predicate().await {
            Ok(allowed) => {
                if !allowed {
                    debug!("navigation blocked by guard");
                }
                allowed
            }
            Err(e) => {
                debug!(error = %e, "navigation guard failed; blocking");
                false
            }
        }
    }

    /// Navigate to `to` if the guard allows it. Returns whether navigation happened.
    pub async fn navigate(&self, navigator: &dyn Navigator, to: &str) -> bool {
        if !self.can_navigate().await {
            return false;
        }
        navigator.go(to);
        true
    }

    fn release(&self, id: u64) {
        let mut installed = self.installed.lock().unwrap_or_else(PoisonError::into_inner);
        if installed.as_ref().is_some_and(|i| i.id == id) {
            *installed = None;
        }
    }
}

/// Keeps a registered guard alive. Dropping it uninstalls the guard.
pub struct GuardHandle {
    guard: Weak<NavigationGuard>,
    id: u64,
}

impl Drop for GuardHandle {
    fn drop(&mut self) {
        if let Some(guard) = self.guard.upgrade() {
            guard.release(self.id);
        }
    }
}

// =============================================================================
// EDITOR SESSION
// =============================================================================

/// Persists a draft and returns the stored copy (with any server-assigned id).
#[async_trait::async_trait]
pub trait DraftSaver<T>: Send + Sync {
    async fn save(&self, draft: &T) -> Result<T, ClientError>;
}

struct Draft<T> {
    value: T,
    revision: u64,
    saved_revision: u64,
}

impl<T> Draft<T> {
    fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }
}

/// An editing view over one draft value.
///
/// The first edit arms a navigation guard that auto-saves before leaving.
/// A successful save clears the dirty flag and disarms the guard; a failed
/// save leaves both in place and blocks the navigation.
pub struct EditorSession<T> {
    draft: Arc<AsyncMutex<Draft<T>>>,
    saver: Arc<dyn DraftSaver<T>>,
    guard: Arc<NavigationGuard>,
    handle: Mutex<Option<GuardHandle>>,
}

impl<T> EditorSession<T>
where
    T: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(initial: T, saver: Arc<dyn DraftSaver<T>>, guard: Arc<NavigationGuard>) -> Self {
        Self {
            draft: Arc::new(AsyncMutex::new(Draft { value: initial, revision: 0, saved_revision: 0 })),
            saver,
            guard,
            handle: Mutex::new(None),
        }
    }

    pub async fn draft(&self) -> T {
        self.draft.lock().await.value.clone()
    }

    pub async fn is_dirty(&self) -> bool {
        self.draft.lock().await.is_dirty()
    }

    /// Apply `change` to the draft and arm the auto-save guard.
    pub async fn edit<F>(&self, change: F)
    where
        F: FnOnce(&mut T),
    {
        {
            let mut draft = self.draft.lock().await;
            change(&mut draft.value);
            draft.revision += 1;
        }
        self.arm();
    }

    /// Persist the draft now.
    ///
    /// # Errors
    ///
    /// Propagates the saver's error; the draft stays dirty.
    pub async fn save(&self) -> Result<T, ClientError> {
        let saved = save_draft(&self.draft, self.saver.as_ref()).await?;
        if !self.is_dirty().await {
            self.disarm();
        }
        Ok(saved)
    }

    fn arm(&self) {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if handle.is_some() && self.guard.is_armed() {
            return;
        }
        let draft = Arc::clone(&self.draft);
        let saver = Arc::clone(&self.saver);
        let predicate: GuardPredicate = Arc::new(move || -> GuardFuture {
            let draft = Arc::clone(&draft);
            let saver = Arc::clone(&saver);
            Box::pin(async move {
                if !draft.lock().await.is_dirty() {
                    return Ok(true);
                }
                info!("auto-saving draft before navigation");
                save_draft(&draft, saver.as_ref()).await?;
                Ok(true)
            })
        });
        *handle = Some(self.guard.register(predicate));
    }

    fn disarm(&self) {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

/// Save the current revision. The saved copy replaces the draft only if no
/// edit landed while the save was in flight.
async fn save_draft<T: Clone>(
    draft: &AsyncMutex<Draft<T>>,
    saver: &dyn DraftSaver<T>,
) -> Result<T, ClientError> {
    let (snapshot, revision) = {
        let draft = draft.lock().await;
        (draft.value.clone(), draft.revision)
    };
    let saved = saver.save(&snapshot).await?;
    let mut draft = draft.lock().await;
    if draft.revision == revision {
        draft.value = saved.clone();
    }
    draft.saved_revision = draft.saved_revision.max(revision);
    Ok(saved)
}

#[cfg(test)]
#[path = "navigation_test.rs"]
mod tests;
