//! Commands, categories and the actions a command exposes.

use rustc_hash::FxHashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::error::ExecutionError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type HandlerResult = Result<(), ExecutionError>;

pub type CommandHandler =
    Arc<dyn Fn(CommandInvocation) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

pub type ActionsProvider = Arc<dyn Fn(&ActionContext) -> Vec<ActionDefinition> + Send + Sync>;

pub const ROOT_CATEGORY_ID: &str = "root";

/// Arguments a handler runs with. Plain commands get an empty invocation;
/// prompt commands carry `argument`, page commands carry `fields`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandInvocation {
    pub command_id: String,
    pub action_id: Option<String>,
    pub argument: Option<String>,
    pub fields: FxHashMap<String, String>,
}

impl CommandInvocation {
    pub fn new(command_id: impl Into<String>) -> Self {
        Self {
            command_id: command_id.into(),
            ..Self::default()
        }
    }

    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = Some(argument.into());
        self
    }

    pub fn with_fields(mut self, fields: FxHashMap<String, String>) -> Self {
        self.fields = fields;
        self
    }
}

pub fn handler_fn<F, Fut>(f: F) -> CommandHandler
where
    F: Fn(CommandInvocation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |invocation| Box::pin(f(invocation)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageField {
    pub id: String,
    pub label: String,
    pub required: bool,
    pub placeholder: Option<String>,
}

impl PageField {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            required: false,
            placeholder: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    pub title: String,
    pub fields: Vec<PageField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CommandInput {
    #[default]
    None,
    Prompt {
        placeholder: String,
    },
    Page(PageSpec),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionIntent {
    ExecutePrimary,
    ExecuteSecondary { action_key: Option<String> },
    TogglePin,
    Drilldown { category_id: String },
    GoBack,
    GoRoot,
    SubmitPage,
    CopyText { text: String },
}

#[derive(Clone)]
pub struct ActionDefinition {
    pub id: String,
    pub label: String,
    pub shortcut: Option<String>,
    pub intent: ActionIntent,
    pub danger: bool,
    pub handler: Option<CommandHandler>,
}

impl ActionDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>, intent: ActionIntent) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            shortcut: None,
            intent,
            danger: false,
            handler: None,
        }
    }

    /// A secondary action reachable through `action_key`, running `handler`.
    pub fn secondary(
        id: impl Into<String>,
        label: impl Into<String>,
        action_key: impl Into<String>,
        handler: CommandHandler,
    ) -> Self {
        let mut action = Self::new(
            id,
            label,
            ActionIntent::ExecuteSecondary {
                action_key: Some(action_key.into()),
            },
        );
        action.handler = Some(handler);
        action
    }

    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn danger(mut self) -> Self {
        self.danger = true;
        self
    }
}

impl fmt::Debug for ActionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDefinition")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("shortcut", &self.shortcut)
            .field("intent", &self.intent)
            .field("danger", &self.danger)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

/// What a command's `actions` callback sees when the palette asks for them.
#[derive(Debug, Clone, Default)]
pub struct ActionContext {
    pub pinned: bool,
    pub query: String,
    pub category_id: Option<String>,
}

#[derive(Clone)]
pub struct Command {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub tags: Vec<String>,
    pub category_id: String,
    pub shortcut: Option<String>,
    pub handler: Option<CommandHandler>,
    pub actions: Option<ActionsProvider>,
    pub drilldown_category_id: Option<String>,
    pub input: CommandInput,
    pub hidden_in_search: bool,
    pub danger: bool,
}

impl Command {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            keywords: Vec::new(),
            tags: Vec::new(),
            category_id: ROOT_CATEGORY_ID.to_string(),
            shortcut: None,
            handler: None,
            actions: None,
            drilldown_category_id: None,
            input: CommandInput::None,
            hidden_in_search: false,
            danger: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn in_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = category_id.into();
        self
    }

    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn with_handler<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(CommandInvocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handler = Some(handler_fn(f));
        self
    }

    pub fn with_actions<F>(mut self, f: F) -> Self
    where
        F: Fn(&ActionContext) -> Vec<ActionDefinition> + Send + Sync + 'static,
    {
        self.actions = Some(Arc::new(f));
        self
    }

    pub fn drilldown(mut self, category_id: impl Into<String>) -> Self {
        self.drilldown_category_id = Some(category_id.into());
        self
    }

    pub fn with_prompt(mut self, placeholder: impl Into<String>) -> Self {
        self.input = CommandInput::Prompt {
            placeholder: placeholder.into(),
        };
        self
    }

    pub fn with_page(mut self, page: PageSpec) -> Self {
        self.input = CommandInput::Page(page);
        self
    }

    pub fn hidden_in_search(mut self) -> Self {
        self.hidden_in_search = true;
        self
    }

    pub fn danger(mut self) -> Self {
        self.danger = true;
        self
    }

    pub fn is_folder(&self) -> bool {
        self.drilldown_category_id.is_some()
    }

    pub fn contributed_actions(&self, context: &ActionContext) -> Vec<ActionDefinition> {
        self.actions
            .as_ref()
            .map(|actions| actions(context))
            .unwrap_or_default()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("category_id", &self.category_id)
            .field("tags", &self.tags)
            .field("shortcut", &self.shortcut)
            .field("drilldown_category_id", &self.drilldown_category_id)
            .field("input", &self.input)
            .field("hidden_in_search", &self.hidden_in_search)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    pub default_tags: Vec<String>,
    pub weight: i64,
}

impl Category {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            parent_id: None,
            default_tags: Vec::new(),
            weight: 0,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_default_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    /// `"channel-tools"` → `"Channel Tools"`; used for auto-created categories.
    pub fn from_id(id: &str) -> Self {
        Self::new(id, label_case(id))
    }
}

pub fn label_case(id: &str) -> String {
    id.split(|c: char| c == '-' || c == '_' || c == '.' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "../../tests/unit/core/command.rs"]
mod tests;
