//! User-defined commands and macros.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{Command, StorageError, ValidationError};
use crate::kernel::resolvers::normalize_url;
use crate::kernel::services::ports::{load_json, save_json, KeyValueStore, CUSTOM_COMMANDS_KEY};

pub const CUSTOM_COMMAND_PREFIX: &str = "custom-";
pub const CUSTOM_CATEGORY_ID: &str = "custom-commands";
pub const CUSTOM_TAG: &str = "custom";

pub fn is_custom_id(id: &str) -> bool {
    id.starts_with(CUSTOM_COMMAND_PREFIX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CustomAction {
    #[serde(rename_all = "camelCase")]
    Command { command_id: String },
    Settings { route: String },
    #[serde(rename_all = "camelCase")]
    Url {
        url: String,
        #[serde(default)]
        open_external: bool,
    },
    Macro { steps: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomCommandDef {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub show_confirmation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_id: Option<String>,
    pub action: CustomAction,
}

impl CustomCommandDef {
    pub fn new(id: impl Into<String>, label: impl Into<String>, action: CustomAction) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            keywords: Vec::new(),
            category_id: None,
            show_confirmation: false,
            icon_id: None,
            action,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.label.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "label".to_string(),
            });
        }
        match &self.action {
            CustomAction::Command { command_id } if command_id.trim().is_empty() => {
                Err(ValidationError::MissingField {
                    field: "command".to_string(),
                })
            }
            CustomAction::Settings { route } if route.trim().is_empty() => {
                Err(ValidationError::MissingField {
                    field: "settings".to_string(),
                })
            }
            CustomAction::Url { url, .. } => normalize_url(url).map(|_| ()),
            CustomAction::Macro { steps } if steps.is_empty() => {
                Err(ValidationError::MissingField {
                    field: "steps".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Registry entry for this definition. Execution is owned by the palette,
    /// so the command carries no handler.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(self.id.clone(), self.label.clone())
            .in_category(
                self.category_id
                    .clone()
                    .unwrap_or_else(|| CUSTOM_CATEGORY_ID.to_string()),
            )
            .with_keywords(self.keywords.iter().cloned())
            .with_tags([CUSTOM_TAG]);
        command.description = self.description.clone();
        if self.show_confirmation {
            command = command.danger();
        }
        command
    }
}

/// Ensure `id` carries the custom prefix.
pub fn custom_id(id: &str) -> String {
    if is_custom_id(id) {
        id.to_string()
    } else {
        format!("{CUSTOM_COMMAND_PREFIX}{id}")
    }
}

pub struct CustomCommandStore {
    defs: Vec<CustomCommandDef>,
    storage: Arc<dyn KeyValueStore>,
}

impl CustomCommandStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            defs: Vec::new(),
            storage,
        }
    }

    /// Definitions that fail to deserialize are skipped with a warning.
    pub async fn hydrate(&mut self) -> Result<(), StorageError> {
        let raw: Vec<serde_json::Value> = load_json(self.storage.as_ref(), CUSTOM_COMMANDS_KEY)
            .await?
            .unwrap_or_default();
        let mut defs = Vec::with_capacity(raw.len());
        for value in raw {
            match serde_json::from_value::<CustomCommandDef>(value) {
                Ok(mut def) => {
                    def.id = custom_id(&def.id);
                    defs.push(def);
                }
                Err(error) => tracing::warn!(%error, "skipping malformed custom command"),
            }
        }
        self.defs = defs;
        Ok(())
    }

    pub fn list(&self) -> &[CustomCommandDef] {
        &self.defs
    }

    pub fn get(&self, id: &str) -> Option<&CustomCommandDef> {
        self.defs.iter().find(|def| def.id == id)
    }

    /// Validates, prefixes the id and replaces any definition with that id.
    pub fn upsert(
        &mut self,
        mut def: CustomCommandDef,
    ) -> Result<&CustomCommandDef, ValidationError> {
        def.validate()?;
        def.id = custom_id(&def.id);
        let index = match self.defs.iter().position(|existing| existing.id == def.id) {
            Some(index) => {
                self.defs[index] = def;
                index
            }
            None => {
                self.defs.push(def);
                self.defs.len() - 1
            }
        };
        Ok(&self.defs[index])
    }

    pub fn remove(&mut self, id: &str) -> Option<CustomCommandDef> {
        let index = self.defs.iter().position(|def| def.id == id)?;
        Some(self.defs.remove(index))
    }

    pub async fn persist(&self) -> Result<(), StorageError> {
        save_json(self.storage.as_ref(), CUSTOM_COMMANDS_KEY, &self.defs).await
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/custom.rs"]
mod tests;
