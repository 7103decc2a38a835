//! Invocation-key → action resolution.
//!
//! Keyboard chords, action-menu clicks and row activation all funnel through
//! [`resolve_invocation`], a pure function of the row, the requested key and
//! the UI context.

use crate::core::{
    chords_equal, normalize_chord, ActionContext, ActionDefinition, ActionIntent, Command,
    CommandInput,
};
use crate::kernel::services::ports::PaletteSettings;

pub const PRIMARY_ACTION_KEY: &str = "primary";
pub const EXECUTE_ACTION_ID: &str = "execute";
pub const OPEN_ACTION_ID: &str = "open";
pub const TOGGLE_PIN_ACTION_ID: &str = "toggle-pin";

const BACK_CHORD: &str = "esc";
const ROOT_CHORD: &str = "meta+esc";
const EXECUTE_CHORD: &str = "enter";
const OPEN_CHORD: &str = "right";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    IntentActionKey,
    Shortcut,
    Id,
}

impl MatchSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IntentActionKey => "intent-action-key",
            Self::Shortcut => "shortcut",
            Self::Id => "id",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ActionMatch<'a> {
    pub action: &'a ActionDefinition,
    pub source: MatchSource,
}

/// Three passes, first hit wins: secondary intents by `action_key`, then
/// `shortcut`, then `id`.
pub fn resolve_action_by_action_key<'a>(
    actions: &'a [ActionDefinition],
    key: &str,
) -> Option<ActionMatch<'a>> {
    let wanted = normalize_chord(key);
    if wanted.is_empty() {
        return None;
    }

    let by_intent = actions.iter().find(|action| match &action.intent {
        ActionIntent::ExecuteSecondary {
            action_key: Some(action_key),
        } => normalize_chord(action_key) == wanted,
        _ => false,
    });
    if let Some(action) = by_intent {
        return Some(ActionMatch {
            action,
            source: MatchSource::IntentActionKey,
        });
    }

    let by_shortcut = actions.iter().find(|action| {
        action
            .shortcut
            .as_deref()
            .is_some_and(|shortcut| normalize_chord(shortcut) == wanted)
    });
    if let Some(action) = by_shortcut {
        return Some(ActionMatch {
            action,
            source: MatchSource::Shortcut,
        });
    }

    actions
        .iter()
        .find(|action| normalize_chord(&action.id) == wanted)
        .map(|action| ActionMatch {
            action,
            source: MatchSource::Id,
        })
}

/// `"primary"` always means [`ActionIntent::ExecutePrimary`].
pub fn resolve_action_intent_by_action_key(
    actions: &[ActionDefinition],
    key: &str,
) -> Option<ActionIntent> {
    if key.trim() == PRIMARY_ACTION_KEY {
        return Some(ActionIntent::ExecutePrimary);
    }
    resolve_action_by_action_key(actions, key).map(|found| found.action.intent.clone())
}

/// Built-in actions followed by whatever the command contributes.
pub fn command_actions(
    command: &Command,
    drilldown: Option<&str>,
    context: &ActionContext,
    settings: &PaletteSettings,
) -> Vec<ActionDefinition> {
    let mut actions = Vec::new();
    let run_label = if drilldown.is_some() { "Open" } else { "Run" };
    actions.push(
        ActionDefinition::new(EXECUTE_ACTION_ID, run_label, ActionIntent::ExecutePrimary)
            .with_shortcut(EXECUTE_CHORD),
    );
    if let Some(category_id) = drilldown {
        actions.push(
            ActionDefinition::new(
                OPEN_ACTION_ID,
                "Open",
                ActionIntent::Drilldown {
                    category_id: category_id.to_string(),
                },
            )
            .with_shortcut(OPEN_CHORD),
        );
    }
    let pin_label = if context.pinned { "Unpin" } else { "Pin" };
    actions.push(
        ActionDefinition::new(TOGGLE_PIN_ACTION_ID, pin_label, ActionIntent::TogglePin)
            .with_shortcut(settings.pin_toggle_chord.clone()),
    );
    actions.extend(command.contributed_actions(context));
    actions
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiContext {
    pub at_root: bool,
    pub page_open: bool,
    pub prompt_open: bool,
}

#[derive(Clone, Copy)]
pub enum RowTarget<'a> {
    Command {
        command: &'a Command,
        drilldown: Option<&'a str>,
        context: &'a ActionContext,
    },
    Calculator {
        result: &'a str,
    },
    Candidate,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    ExecutePrimary,
    ExecuteSecondary { action_id: String },
    TogglePin,
    Drilldown { category_id: String },
    GoBack,
    GoRoot,
    OpenPrompt,
    OpenPage,
    SubmitPage,
    CopyText { text: String },
    SelectCandidate,
    Unhandled,
}

pub fn resolve_invocation(
    target: RowTarget<'_>,
    key: &str,
    ui: UiContext,
    settings: &PaletteSettings,
) -> Resolution {
    if chords_equal(key, ROOT_CHORD) {
        return Resolution::GoRoot;
    }
    if chords_equal(key, BACK_CHORD) {
        return Resolution::GoBack;
    }

    let is_primary = key.trim() == PRIMARY_ACTION_KEY || chords_equal(key, EXECUTE_CHORD);
    match target {
        RowTarget::Command {
            command,
            drilldown,
            context,
        } => {
            let actions = command_actions(command, drilldown, context, settings);
            let Some(intent) = resolve_action_intent_by_action_key(&actions, key) else {
                return Resolution::Unhandled;
            };
            let action_id = resolve_action_by_action_key(&actions, key)
                .map(|found| found.action.id.clone())
                .unwrap_or_default();
            resolve_intent(command, drilldown, intent, action_id, ui)
        }
        RowTarget::Calculator { result } if is_primary => Resolution::CopyText {
            text: result.to_string(),
        },
        RowTarget::Candidate if is_primary => Resolution::SelectCandidate,
        RowTarget::Empty if is_primary && ui.page_open => Resolution::SubmitPage,
        _ => Resolution::Unhandled,
    }
}

fn resolve_intent(
    command: &Command,
    drilldown: Option<&str>,
    intent: ActionIntent,
    action_id: String,
    ui: UiContext,
) -> Resolution {
    match intent {
        ActionIntent::ExecutePrimary => {
            if ui.page_open {
                return Resolution::SubmitPage;
            }
            if ui.prompt_open {
                return Resolution::ExecutePrimary;
            }
            if let Some(category_id) = drilldown {
                return Resolution::Drilldown {
                    category_id: category_id.to_string(),
                };
            }
            match command.input {
                CommandInput::None => Resolution::ExecutePrimary,
                CommandInput::Prompt { .. } => Resolution::OpenPrompt,
                CommandInput::Page(_) => Resolution::OpenPage,
            }
        }
        ActionIntent::ExecuteSecondary { .. } => Resolution::ExecuteSecondary { action_id },
        ActionIntent::TogglePin => Resolution::TogglePin,
        ActionIntent::Drilldown { category_id } => Resolution::Drilldown { category_id },
        ActionIntent::GoBack => Resolution::GoBack,
        ActionIntent::GoRoot => Resolution::GoRoot,
        ActionIntent::SubmitPage => Resolution::SubmitPage,
        ActionIntent::CopyText { text } => Resolution::CopyText { text },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/routing.rs"]
mod tests;
