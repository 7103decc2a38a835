use rustc_hash::FxHashMap;

use crate::core::PageSpec;
use crate::kernel::query::QueryIntent;

/// Where the palette currently is. `Category` carries the full stack of
/// levels above it, so going back never walks the category tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NavigationLevel {
    #[default]
    Root,
    Category {
        category_id: String,
        parent_levels: Vec<NavigationLevel>,
    },
}

impl NavigationLevel {
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    pub fn category_id(&self) -> Option<&str> {
        match self {
            Self::Root => None,
            Self::Category { category_id, .. } => Some(category_id),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Self::Root => 0,
            Self::Category { parent_levels, .. } => parent_levels.len(),
        }
    }

    /// The level `drill` pushes from here.
    pub fn child(&self, category_id: impl Into<String>) -> Self {
        let mut parent_levels = match self {
            Self::Root => Vec::new(),
            Self::Category { parent_levels, .. } => parent_levels.clone(),
        };
        parent_levels.push(self.clone());
        Self::Category {
            category_id: category_id.into(),
            parent_levels,
        }
    }

    pub fn parent(&self) -> Self {
        match self {
            Self::Root => Self::Root,
            Self::Category { parent_levels, .. } => {
                parent_levels.last().cloned().unwrap_or_default()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptState {
    pub command_id: String,
    pub placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub command_id: String,
    pub spec: PageSpec,
    pub values: FxHashMap<String, String>,
}

impl PageState {
    pub fn value(&self, field_id: &str) -> &str {
        self.values.get(field_id).map(String::as_str).unwrap_or("")
    }

    pub fn missing_required(&self) -> Option<&str> {
        self.spec
            .fields
            .iter()
            .find(|field| field.required && self.value(&field.id).trim().is_empty())
            .map(|field| field.label.as_str())
    }
}

/// The single pending multi-step flow. Setting a new one replaces the old.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedFlow {
    MoveNote { note_id: String, note_title: String },
    Reschedule { message_id: String },
    CancelScheduled { message_id: String },
}

impl StagedFlow {
    pub fn intent(&self) -> QueryIntent {
        match self {
            Self::MoveNote { .. } => QueryIntent::MoveNote,
            Self::Reschedule { .. } => QueryIntent::RescheduleMessage,
            Self::CancelScheduled { .. } => QueryIntent::CancelScheduledMessage,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteState {
    pub visible: bool,
    pub query: String,
    pub selected: usize,
    /// Set once the user moves the selection by keyboard.
    pub selection_touched: bool,
    pub level: NavigationLevel,
    pub prompt: Option<PromptState>,
    pub page: Option<PageState>,
    pub staged: Option<StagedFlow>,
}

impl PaletteState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn clear_input(&mut self) {
        self.query.clear();
        self.prompt = None;
        self.selected = 0;
        self.selection_touched = false;
    }

    pub fn at_root(&self) -> bool {
        self.level.is_root()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/state.rs"]
mod tests;
