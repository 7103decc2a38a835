//! Context providers: reactive sources of computed commands.

use std::fmt;
use std::sync::mpsc;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::core::Command;

pub trait ContextProvider: Send + Sync {
    fn id(&self) -> &str;

    /// Pure snapshot of the commands this provider currently contributes.
    fn commands(&self) -> Vec<Command>;

    /// Hook `refresh` into whatever event source drives this provider.
    fn subscribe(&self, refresh: RefreshHandle) -> Option<Subscription> {
        let _ = refresh;
        None
    }
}

/// Queues a refresh for one provider. Refreshes run on the registry's next
/// `process_pending_refreshes`, never inside the caller.
#[derive(Clone)]
pub struct RefreshHandle {
    provider_id: String,
    tx: mpsc::Sender<String>,
}

impl RefreshHandle {
    pub(super) fn new(provider_id: String, tx: mpsc::Sender<String>) -> Self {
        Self { provider_id, tx }
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Returns `false` once the registry is gone.
    pub fn request(&self) -> bool {
        self.tx.send(self.provider_id.clone()).is_ok()
    }
}

impl fmt::Debug for RefreshHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshHandle")
            .field("provider_id", &self.provider_id)
            .finish()
    }
}

/// Idempotent unsubscribe. Runs at most once, on `cancel` or drop.
pub struct Subscription {
    cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    pub fn cancel(&self) {
        let cancel = self.cancel.lock().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.lock().is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

pub(super) struct ProviderRecord {
    pub(super) provider: Box<dyn ContextProvider>,
    pub(super) owned: FxHashSet<String>,
    pub(super) subscription: Option<Subscription>,
}
