//! Key-value storage backed by a single JSON object file.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::core::{BoxFuture, StorageError};
use crate::kernel::services::ports::KeyValueStore;

/// Every `set`/`remove` rewrites the whole file before returning. Reads are
/// served from memory once the file has been loaded.
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<Option<Map<String, Value>>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<Map<String, Value>, StorageError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Map::new());
            }
            Err(error) => return Err(error.into()),
        };
        if data.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&data)? {
            Value::Object(map) => Ok(map),
            _ => Err(StorageError::Unavailable(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
        }
    }

    async fn write_file(&self, entries: &Map<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn update(
        &self,
        apply: impl FnOnce(&mut Map<String, Value>) -> bool,
    ) -> Result<(), StorageError> {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(self.read_file().await?);
        }
        let Some(entries) = guard.as_mut() else {
            return Ok(());
        };
        if apply(entries) {
            self.write_file(entries).await?;
        }
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>, StorageError>> {
        Box::pin(async move {
            let mut guard = self.entries.lock().await;
            if guard.is_none() {
                *guard = Some(self.read_file().await?);
            }
            Ok(guard.as_ref().and_then(|entries| entries.get(key).cloned()))
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.update(|entries| {
                entries.insert(key.to_string(), value);
                true
            })
            .await
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move { self.update(|entries| entries.remove(key).is_some()).await })
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/storage.rs"]
mod tests;
