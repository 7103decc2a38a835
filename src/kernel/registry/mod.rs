//! Command registry: the catalog, its tags, pins, and context providers.

mod provider;
mod store;
mod tags;

use std::sync::mpsc;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::{Category, Command, ROOT_CATEGORY_ID};
use crate::kernel::pins::PinStore;

pub use provider::{ContextProvider, RefreshHandle, Subscription};
pub use store::{CommandList, RegistryListener, RegistryStore, RegistrySubscription};
pub use tags::{merge_tags, normalize_tag, Tag, TagIndex};

use provider::ProviderRecord;

pub const ROOT_CATEGORY_LABEL: &str = "All Commands";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    pub preserve_pin: bool,
}

pub struct CommandRegistry {
    store: RegistryStore,
    tags: TagIndex,
    pins: PinStore,
    providers: FxHashMap<String, ProviderRecord>,
    refresh_tx: mpsc::Sender<String>,
    refresh_rx: mpsc::Receiver<String>,
}

impl CommandRegistry {
    pub fn new(pins: PinStore) -> Self {
        let (refresh_tx, refresh_rx) = mpsc::channel();
        let mut store = RegistryStore::new();
        store.insert_category(Category::new(ROOT_CATEGORY_ID, ROOT_CATEGORY_LABEL));
        Self {
            store,
            tags: TagIndex::default(),
            pins,
            providers: FxHashMap::default(),
            refresh_tx,
            refresh_rx,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(PinStore::in_memory())
    }

    pub fn version(&self) -> u64 {
        self.store.version()
    }

    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    pub fn pins(&self) -> &PinStore {
        &self.pins
    }

    pub fn pins_mut(&mut self) -> &mut PinStore {
        &mut self.pins
    }

    // ---------------------------------------------------------------------
    // Categories
    // ---------------------------------------------------------------------

    /// Upserts a category. A parent assignment that would close a cycle is
    /// rejected and nothing changes.
    pub fn register_category(&mut self, category: Category) -> bool {
        if self.would_cycle(&category.id, category.parent_id.as_deref()) {
            tracing::warn!(
                category_id = %category.id,
                parent_id = ?category.parent_id,
                "category parent would create a cycle"
            );
            return false;
        }
        tracing::debug!(category_id = %category.id, "category registered");
        self.store.insert_category(category);
        true
    }

    fn would_cycle(&self, id: &str, parent_id: Option<&str>) -> bool {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut cursor = parent_id;
        while let Some(current) = cursor {
            if current == id {
                return true;
            }
            if !seen.insert(current) {
                return false;
            }
            cursor = self
                .store
                .category(current)
                .and_then(|category| category.parent_id.as_deref());
        }
        false
    }

    pub fn ensure_category(&mut self, id: &str) {
        if self.store.category(id).is_none() {
            self.store.insert_category(Category::from_id(id));
        }
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.store.category(id)
    }

    pub fn child_categories(&self, id: &str) -> Vec<&Category> {
        self.store.child_categories(id)
    }

    /// Top-most ancestor first, ending with `id` itself.
    pub fn category_path(&self, id: &str) -> Vec<Category> {
        let mut path = Vec::new();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut cursor = self.store.category(id);
        while let Some(category) = cursor {
            if !seen.insert(category.id.clone()) {
                break;
            }
            path.push(category.clone());
            cursor = category
                .parent_id
                .as_deref()
                .and_then(|parent| self.store.category(parent));
        }
        path.reverse();
        path
    }

    /// A category is drillable if it has child categories or commands.
    pub fn category_has_children(&self, id: &str) -> bool {
        self.store.category(id).is_some()
            && (!self.store.child_categories(id).is_empty()
                || !self.store.list_by_category(id).is_empty())
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    /// Upsert by id. Pin state survives re-registration.
    pub fn register_command(&mut self, mut command: Command) {
        if command.category_id.trim().is_empty() {
            command.category_id = ROOT_CATEGORY_ID.to_string();
        }
        self.ensure_category(&command.category_id);

        let defaults = self
            .store
            .category(&command.category_id)
            .map(|category| category.default_tags.clone())
            .unwrap_or_default();
        command.tags = merge_tags(&command.tags, &defaults);

        if let Some(previous) = self.store.command(&command.id) {
            self.tags.remove(&previous.tags);
        }
        self.tags.add(&command.tags);

        let id = command.id.clone();
        self.store.insert_command(command);
        tracing::debug!(command_id = %id, version = self.store.version(), "command registered");
    }

    pub fn remove_command(&mut self, id: &str, options: RemoveOptions) -> bool {
        let Some(removed) = self.store.remove_command(id) else {
            return false;
        };
        self.tags.remove(&removed.tags);
        if !options.preserve_pin {
            self.pins.unpin(id);
        }
        tracing::debug!(command_id = %id, version = self.store.version(), "command removed");
        true
    }

    pub fn command(&self, id: &str) -> Option<Arc<Command>> {
        self.store.command(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.store.contains_command(id)
    }

    pub fn list_commands(&self) -> CommandList {
        self.store.list_all()
    }

    pub fn list_commands_by_category(&self, category_id: &str) -> CommandList {
        self.store.list_by_category(category_id)
    }

    pub fn list_commands_in_tree(&self, category_id: &str) -> CommandList {
        self.store.list_in_tree(category_id)
    }

    pub fn search_text(&self, id: &str) -> Option<Arc<str>> {
        self.store.search_text(id)
    }

    pub fn tag(&self, raw: &str) -> Option<&Tag> {
        self.tags.get(raw)
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.tags.list()
    }

    // ---------------------------------------------------------------------
    // Pins
    // ---------------------------------------------------------------------

    pub fn is_pinned(&self, id: &str) -> bool {
        self.pins.contains(id)
    }

    /// Returns the new pinned state and notifies pin subscribers.
    pub fn toggle_pinned(&mut self, id: &str) -> bool {
        let pinned = self.pins.toggle(id);
        self.pins.emit();
        pinned
    }

    /// Pinned commands that are currently registered, in pin order.
    pub fn pinned_commands(&self) -> Vec<Arc<Command>> {
        self.pins
            .ids()
            .iter()
            .filter_map(|id| self.store.command(id))
            .collect()
    }

    /// Drop pins that reference unregistered commands.
    pub fn prune_pins(&mut self) -> usize {
        let store = &self.store;
        let removed = self.pins.prune(|id| store.contains_command(id));
        if removed > 0 {
            tracing::debug!(removed, "stale pins pruned");
            self.pins.emit();
        }
        removed
    }

    // ---------------------------------------------------------------------
    // Context providers
    // ---------------------------------------------------------------------

    /// Registers (or replaces) a provider and pulls its first snapshot.
    pub fn register_context_provider(&mut self, provider: Box<dyn ContextProvider>) {
        let id = provider.id().to_string();
        self.unregister_context_provider(&id);

        let handle = provider::RefreshHandle::new(id.clone(), self.refresh_tx.clone());
        let subscription = provider.subscribe(handle);
        self.providers.insert(
            id.clone(),
            ProviderRecord {
                provider,
                owned: FxHashSet::default(),
                subscription,
            },
        );
        self.refresh_context_provider(&id);
    }

    /// Tear down everything the provider contributed and rebuild it from a
    /// fresh snapshot. Pins on ids that disappear are dropped.
    pub fn refresh_context_provider(&mut self, id: &str) -> bool {
        let Some(record) = self.providers.get_mut(id) else {
            return false;
        };
        let commands = record.provider.commands();
        let previous = std::mem::take(&mut record.owned);

        let pinned_before: Vec<String> = previous
            .iter()
            .filter(|owned| self.pins.contains(owned))
            .cloned()
            .collect();

        for owned in &previous {
            self.remove_command(owned, RemoveOptions { preserve_pin: true });
        }

        let mut owned = FxHashSet::default();
        for command in commands {
            owned.insert(command.id.clone());
            self.register_command(command);
        }

        let mut unpinned = false;
        for stale in pinned_before.iter().filter(|id| !owned.contains(*id)) {
            unpinned |= self.pins.unpin(stale);
        }
        if unpinned {
            self.pins.emit();
        }

        tracing::debug!(
            provider_id = %id,
            retracted = previous.len(),
            contributed = owned.len(),
            "context provider refreshed"
        );
        if let Some(record) = self.providers.get_mut(id) {
            record.owned = owned;
        }
        true
    }

    pub fn unregister_context_provider(&mut self, id: &str) -> bool {
        let Some(record) = self.providers.remove(id) else {
            return false;
        };
        if let Some(subscription) = &record.subscription {
            subscription.cancel();
        }
        for owned in &record.owned {
            self.remove_command(owned, RemoveOptions::default());
        }
        tracing::debug!(provider_id = %id, "context provider unregistered");
        true
    }

    pub fn provider_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Run refreshes queued through `RefreshHandle`s, once per provider.
    pub fn process_pending_refreshes(&mut self) -> usize {
        let mut pending: Vec<String> = Vec::new();
        while let Ok(id) = self.refresh_rx.try_recv() {
            if !pending.contains(&id) {
                pending.push(id);
            }
        }
        pending
            .iter()
            .filter(|id| self.refresh_context_provider(id))
            .count()
    }

    // ---------------------------------------------------------------------
    // Listeners
    // ---------------------------------------------------------------------

    pub fn subscribe_registry(&mut self, listener: RegistryListener) -> RegistrySubscription {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe_registry(&mut self, subscription: RegistrySubscription) -> bool {
        self.store.unsubscribe(subscription)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/registry.rs"]
mod tests;
