//! Palette state machine.
//!
//! Pure and synchronous: reducers mutate `PaletteState` and describe any
//! follow-up work as `Effect`s. Everything that needs the registry or the host
//! lives in `Palette`.

mod reducers;

use super::{Action, Effect, PaletteState};
use crate::kernel::query::parse_query;

pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    fn unchanged() -> Self {
        Self {
            effects: Vec::new(),
            state_changed: false,
        }
    }

    fn changed(state_changed: bool) -> Self {
        Self {
            effects: Vec::new(),
            state_changed,
        }
    }
}

pub struct Store {
    state: PaletteState,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(PaletteState::default())
    }
}

impl Store {
    pub fn new(state: PaletteState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &PaletteState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::Open => {
                if self.state.visible {
                    return DispatchResult::unchanged();
                }
                self.state.reset();
                self.state.visible = true;
                DispatchResult::changed(true)
            }
            Action::Close => {
                if !self.state.visible {
                    return DispatchResult::unchanged();
                }
                self.state.reset();
                DispatchResult {
                    effects: vec![Effect::Closed],
                    state_changed: true,
                }
            }
            Action::SetQuery(_)
            | Action::Append(_)
            | Action::Backspace
            | Action::MoveSelection(_)
            | Action::OpenPrompt { .. }
            | Action::SubmitPrompt
            | Action::OpenPage { .. }
            | Action::PageSetField { .. }
            | Action::SubmitPage => self.reduce_input_action(action),
            Action::Drilldown { .. }
            | Action::Back
            | Action::GoRoot
            | Action::Stage(_)
            | Action::ClearStaged => self.reduce_navigation_action(action),
        }
    }

    /// A parsed intent unrelated to the pending staged flow cancels it.
    fn clear_staged_on_unrelated_intent(&mut self) -> bool {
        let Some(staged) = &self.state.staged else {
            return false;
        };
        match parse_query(&self.state.query) {
            Some(parsed) if parsed.intent != staged.intent() => {
                tracing::debug!(
                    staged = ?staged,
                    intent = parsed.intent.as_str(),
                    "staged flow cleared by unrelated intent"
                );
                self.state.staged = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
