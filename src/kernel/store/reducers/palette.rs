use unicode_segmentation::UnicodeSegmentation;

use crate::core::{CommandInvocation, ValidationError};
use crate::kernel::services::ports::Notice;
use crate::kernel::state::{PageState, PromptState};
use crate::kernel::store::{DispatchResult, Store};
use crate::kernel::{Action, Effect};

impl Store {
    pub(in crate::kernel::store) fn reduce_input_action(
        &mut self,
        action: Action,
    ) -> DispatchResult {
        if !self.state.visible {
            return DispatchResult::unchanged();
        }

        match action {
            Action::SetQuery(query) => {
                if self.state.query == query {
                    return DispatchResult::unchanged();
                }
                self.state.query = query;
                self.state.selected = 0;
                self.clear_staged_on_unrelated_intent();
                DispatchResult::changed(true)
            }
            Action::Append(ch) => {
                self.state.query.push(ch);
                self.state.selected = 0;
                self.clear_staged_on_unrelated_intent();
                DispatchResult::changed(true)
            }
            Action::Backspace => {
                let removed = match self.state.query.grapheme_indices(true).next_back() {
                    Some((start, _)) => {
                        self.state.query.truncate(start);
                        true
                    }
                    None => false,
                };
                if removed {
                    self.state.selected = 0;
                    self.clear_staged_on_unrelated_intent();
                }
                DispatchResult::changed(removed)
            }
            Action::MoveSelection(delta) => {
                if delta == 0 {
                    return DispatchResult::unchanged();
                }
                let selected = &mut self.state.selected;
                if delta > 0 {
                    *selected = selected.saturating_add(delta.unsigned_abs());
                } else {
                    *selected = selected.saturating_sub(delta.unsigned_abs());
                }
                self.state.selection_touched = true;
                DispatchResult::changed(true)
            }
            Action::OpenPrompt {
                command_id,
                placeholder,
            } => {
                self.state.clear_input();
                self.state.page = None;
                self.state.prompt = Some(PromptState {
                    command_id,
                    placeholder,
                });
                DispatchResult::changed(true)
            }
            Action::SubmitPrompt => {
                let Some(prompt) = &self.state.prompt else {
                    return DispatchResult::unchanged();
                };
                let argument = self.state.query.trim().to_string();
                if argument.is_empty() {
                    return DispatchResult {
                        effects: vec![Effect::Notify(Notice::failure(
                            ValidationError::EmptyContent.to_string(),
                        ))],
                        state_changed: false,
                    };
                }
                let invocation =
                    CommandInvocation::new(prompt.command_id.clone()).with_argument(argument);
                self.state.clear_input();
                DispatchResult {
                    effects: vec![Effect::RunCommand(invocation)],
                    state_changed: true,
                }
            }
            Action::OpenPage { command_id, page } => {
                self.state.clear_input();
                self.state.page = Some(PageState {
                    command_id,
                    spec: page,
                    values: Default::default(),
                });
                DispatchResult::changed(true)
            }
            Action::PageSetField { field_id, value } => {
                let Some(page) = self.state.page.as_mut() else {
                    return DispatchResult::unchanged();
                };
                if !page.spec.fields.iter().any(|field| field.id == field_id) {
                    return DispatchResult::unchanged();
                }
                let changed = page.values.get(&field_id) != Some(&value);
                page.values.insert(field_id, value);
                DispatchResult::changed(changed)
            }
            Action::SubmitPage => {
                let Some(page) = &self.state.page else {
                    return DispatchResult::unchanged();
                };
                if let Some(field) = page.missing_required() {
                    let error = ValidationError::MissingField {
                        field: field.to_string(),
                    };
                    return DispatchResult {
                        effects: vec![Effect::Notify(Notice::failure(error.to_string()))],
                        state_changed: false,
                    };
                }
                let invocation = CommandInvocation::new(page.command_id.clone())
                    .with_fields(page.values.clone());
                self.state.page = None;
                self.state.clear_input();
                DispatchResult {
                    effects: vec![Effect::RunCommand(invocation)],
                    state_changed: true,
                }
            }
            _ => unreachable!("non-input action passed to reduce_input_action"),
        }
    }
}
