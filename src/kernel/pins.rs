//! Pinned command ids, persisted.
//!
//! Mutations are synchronous and in-memory; `persist` flushes to storage and
//! `emit` hands every subscriber its own copy of the current set.

use std::sync::Arc;

use crate::core::StorageError;
use crate::kernel::services::ports::{
    load_json, save_json, KeyValueStore, MemoryStore, PINNED_COMMANDS_KEY,
};

pub type PinListener = Box<dyn Fn(Vec<String>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinSubscription(u64);

pub struct PinStore {
    ids: Vec<String>,
    storage: Arc<dyn KeyValueStore>,
    listeners: Vec<(u64, PinListener)>,
    next_listener: u64,
    ready: bool,
    dirty: bool,
}

impl PinStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            ids: Vec::new(),
            storage,
            listeners: Vec::new(),
            next_listener: 0,
            ready: false,
            dirty: false,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Load persisted pins. Pins changed before hydration are kept on top of
    /// the stored ones.
    pub async fn hydrate(&mut self) -> Result<(), StorageError> {
        let stored: Vec<String> = load_json(self.storage.as_ref(), PINNED_COMMANDS_KEY)
            .await?
            .unwrap_or_default();
        let mut merged = Vec::with_capacity(stored.len() + self.ids.len());
        for id in stored.into_iter().chain(self.ids.drain(..)) {
            if !merged.contains(&id) {
                merged.push(id);
            }
        }
        self.ids = merged;
        self.ready = true;
        tracing::debug!(count = self.ids.len(), "pins hydrated");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|pinned| pinned == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn pin(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id.to_string());
        self.dirty = true;
        true
    }

    pub fn unpin(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|pinned| pinned != id);
        let changed = self.ids.len() != before;
        self.dirty |= changed;
        changed
    }

    /// Returns the new pinned state.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.unpin(id) {
            false
        } else {
            self.pin(id)
        }
    }

    /// Drop pins `keep` rejects. Returns the number removed.
    pub fn prune(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| keep(id));
        let removed = before - self.ids.len();
        if removed > 0 {
            self.dirty = true;
        }
        removed
    }

    pub async fn persist(&mut self) -> Result<(), StorageError> {
        save_json(self.storage.as_ref(), PINNED_COMMANDS_KEY, &self.ids).await?;
        self.dirty = false;
        Ok(())
    }

    pub fn emit(&self) {
        for (_, listener) in &self.listeners {
            listener(self.ids.clone());
        }
    }

    pub fn subscribe(&mut self, listener: PinListener) -> PinSubscription {
        let id = self.next_listener;
        self.next_listener += 1;
        listener(self.ids.clone());
        self.listeners.push((id, listener));
        PinSubscription(id)
    }

    pub fn unsubscribe(&mut self, subscription: PinSubscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription.0);
        self.listeners.len() != before
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/pins.rs"]
mod tests;
