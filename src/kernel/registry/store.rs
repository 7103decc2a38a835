//! Versioned command/category catalog with derived views.
//!
//! Every mutation bumps `version` before returning, which drops the list
//! caches and notifies listeners. Cached views carry the version they were
//! computed against and are never served across a bump.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::{Category, Command, ROOT_CATEGORY_ID};

pub type CommandList = Arc<[Arc<Command>]>;
pub type RegistryListener = Box<dyn Fn(u64) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrySubscription(u64);

#[derive(Default)]
struct ViewCache {
    version: u64,
    all: Option<CommandList>,
    by_category: FxHashMap<String, CommandList>,
    by_tree: FxHashMap<String, CommandList>,
}

impl ViewCache {
    fn sync(&mut self, version: u64) {
        if self.version != version {
            self.version = version;
            self.all = None;
            self.by_category.clear();
            self.by_tree.clear();
        }
    }
}

pub struct RegistryStore {
    commands: FxHashMap<String, Arc<Command>>,
    categories: FxHashMap<String, Category>,
    version: u64,
    views: Mutex<ViewCache>,
    search_text: Mutex<FxHashMap<String, Arc<str>>>,
    listeners: Vec<(u64, RegistryListener)>,
    next_listener: u64,
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryStore {
    pub fn new() -> Self {
        Self {
            commands: FxHashMap::default(),
            categories: FxHashMap::default(),
            version: 0,
            views: Mutex::new(ViewCache::default()),
            search_text: Mutex::new(FxHashMap::default()),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version += 1;
        self.views.get_mut().sync(self.version);
        for (_, listener) in &self.listeners {
            listener(self.version);
        }
    }

    pub fn insert_command(&mut self, command: Command) -> Option<Arc<Command>> {
        let id = command.id.clone();
        let text = build_search_text(&command);
        let previous = self.commands.insert(id.clone(), Arc::new(command));
        self.search_text.get_mut().insert(id, text);
        self.bump();
        previous
    }

    pub fn remove_command(&mut self, id: &str) -> Option<Arc<Command>> {
        let removed = self.commands.remove(id)?;
        self.search_text.get_mut().remove(id);
        self.bump();
        Some(removed)
    }

    pub fn insert_category(&mut self, category: Category) -> Option<Category> {
        let previous = self.categories.insert(category.id.clone(), category);
        self.bump();
        previous
    }

    pub fn command(&self, id: &str) -> Option<Arc<Command>> {
        self.commands.get(id).cloned()
    }

    pub fn contains_command(&self, id: &str) -> bool {
        self.commands.contains_key(id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.get(id)
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Direct children. Categories without a parent hang off the root.
    pub fn child_categories(&self, id: &str) -> Vec<&Category> {
        let mut children: Vec<&Category> = self
            .categories
            .values()
            .filter(|category| category.id != ROOT_CATEGORY_ID)
            .filter(|category| category.parent_id.as_deref().unwrap_or(ROOT_CATEGORY_ID) == id)
            .collect();
        children.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
        children
    }

    /// Memoized `label description shortcut keywords tags`, lowercased.
    pub fn search_text(&self, id: &str) -> Option<Arc<str>> {
        if let Some(text) = self.search_text.lock().get(id) {
            return Some(text.clone());
        }
        let command = self.commands.get(id)?;
        let text = build_search_text(command);
        self.search_text
            .lock()
            .insert(id.to_string(), text.clone());
        Some(text)
    }

    pub fn list_all(&self) -> CommandList {
        let mut views = self.views.lock();
        views.sync(self.version);
        if let Some(list) = &views.all {
            return list.clone();
        }
        let list = sorted(self.commands.values().cloned().collect());
        views.all = Some(list.clone());
        list
    }

    pub fn list_by_category(&self, category_id: &str) -> CommandList {
        let mut views = self.views.lock();
        views.sync(self.version);
        if let Some(list) = views.by_category.get(category_id) {
            return list.clone();
        }
        let list = sorted(
            self.commands
                .values()
                .filter(|command| command.category_id == category_id)
                .cloned()
                .collect(),
        );
        views
            .by_category
            .insert(category_id.to_string(), list.clone());
        list
    }

    /// Every command whose category lies in the subtree rooted at
    /// `category_id`.
    pub fn list_in_tree(&self, category_id: &str) -> CommandList {
        let mut views = self.views.lock();
        views.sync(self.version);
        if let Some(list) = views.by_tree.get(category_id) {
            return list.clone();
        }
        let ids = self.subtree_ids(category_id);
        let list = sorted(
            self.commands
                .values()
                .filter(|command| ids.contains(command.category_id.as_str()))
                .cloned()
                .collect(),
        );
        views.by_tree.insert(category_id.to_string(), list.clone());
        list
    }

    fn subtree_ids(&self, category_id: &str) -> FxHashSet<String> {
        let mut children: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
        for category in self.categories.values() {
            if category.id == ROOT_CATEGORY_ID {
                continue;
            }
            let parent = category.parent_id.as_deref().unwrap_or(ROOT_CATEGORY_ID);
            children.entry(parent).or_default().push(&category.id);
        }

        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(category_id);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id.to_string()) {
                continue;
            }
            if let Some(kids) = children.get(id) {
                queue.extend(kids.iter().copied());
            }
        }
        seen
    }

    /// The listener sees the current version immediately.
    pub fn subscribe(&mut self, listener: RegistryListener) -> RegistrySubscription {
        let id = self.next_listener;
        self.next_listener += 1;
        listener(self.version);
        self.listeners.push((id, listener));
        RegistrySubscription(id)
    }

    pub fn unsubscribe(&mut self, subscription: RegistrySubscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription.0);
        self.listeners.len() != before
    }
}

fn sorted(mut commands: Vec<Arc<Command>>) -> CommandList {
    commands.sort_by_cached_key(|command| (command.label.to_lowercase(), command.id.clone()));
    commands.into()
}

fn build_search_text(command: &Command) -> Arc<str> {
    let mut parts: Vec<&str> = Vec::with_capacity(3 + command.keywords.len() + command.tags.len());
    parts.push(&command.label);
    if let Some(description) = command.description.as_deref() {
        parts.push(description);
    }
    if let Some(shortcut) = command.shortcut.as_deref() {
        parts.push(shortcut);
    }
    parts.extend(command.keywords.iter().map(String::as_str));
    parts.extend(command.tags.iter().map(String::as_str));
    let text = parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    Arc::from(text)
}
