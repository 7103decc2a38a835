//! Most-recently-used command ids, newest first.

use std::sync::Arc;

use crate::core::StorageError;
use crate::kernel::services::ports::settings::DEFAULT_RECENT_LIMIT;
use crate::kernel::services::ports::{load_json, save_json, KeyValueStore, RECENT_COMMANDS_KEY};

pub const RERUN_LAST_COMMAND_ID: &str = "command-palette-rerun-last";

/// Meta-commands that never enter the list, so "re-run last" cannot target
/// itself.
pub const RECENT_SKIP_IDS: &[&str] = &[RERUN_LAST_COMMAND_ID];

fn is_skipped(id: &str) -> bool {
    RECENT_SKIP_IDS.contains(&id)
}

pub struct RecentStore {
    ids: Vec<String>,
    limit: usize,
    storage: Arc<dyn KeyValueStore>,
}

impl RecentStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_limit(storage, DEFAULT_RECENT_LIMIT)
    }

    pub fn with_limit(storage: Arc<dyn KeyValueStore>, limit: usize) -> Self {
        Self {
            ids: Vec::new(),
            limit: limit.max(1),
            storage,
        }
    }

    pub async fn hydrate(&mut self) -> Result<(), StorageError> {
        let stored: Vec<String> = load_json(self.storage.as_ref(), RECENT_COMMANDS_KEY)
            .await?
            .unwrap_or_default();
        let mut ids: Vec<String> = Vec::with_capacity(stored.len());
        for id in stored {
            if !is_skipped(&id) && !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids.truncate(self.limit);
        self.ids = ids;
        Ok(())
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 0 = most recent.
    pub fn rank_of(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|recent| recent == id)
    }

    /// Move `id` to the front (or insert it), truncate, and persist.
    pub async fn record(&mut self, id: &str) -> Result<(), StorageError> {
        if is_skipped(id) {
            return Ok(());
        }
        self.ids.retain(|recent| recent != id);
        self.ids.insert(0, id.to_string());
        self.ids.truncate(self.limit);
        save_json(self.storage.as_ref(), RECENT_COMMANDS_KEY, &self.ids).await
    }

    pub fn newest(&self, exclude: Option<&str>) -> Option<&str> {
        self.ids
            .iter()
            .map(String::as_str)
            .find(|id| Some(*id) != exclude && !is_skipped(id))
    }

    pub fn prune(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| keep(id));
        before - self.ids.len()
    }

    pub async fn persist(&self) -> Result<(), StorageError> {
        save_json(self.storage.as_ref(), RECENT_COMMANDS_KEY, &self.ids).await
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/recents.rs"]
mod tests;
