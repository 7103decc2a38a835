use crate::kernel::state::NavigationLevel;
use crate::kernel::store::{DispatchResult, Store};
use crate::kernel::{Action, Effect};

impl Store {
    pub(in crate::kernel::store) fn reduce_navigation_action(
        &mut self,
        action: Action,
    ) -> DispatchResult {
        if !self.state.visible {
            return DispatchResult::unchanged();
        }

        match action {
            Action::Drilldown { category_id } => {
                if self.state.level.category_id() == Some(category_id.as_str()) {
                    return DispatchResult::unchanged();
                }
                self.state.level = self.state.level.child(category_id);
                self.state.page = None;
                self.state.staged = None;
                self.state.clear_input();
                DispatchResult::changed(true)
            }
            Action::Back => {
                if self.state.page.take().is_some() {
                    self.state.clear_input();
                    return DispatchResult::changed(true);
                }
                if self.state.prompt.is_some() {
                    self.state.clear_input();
                    return DispatchResult::changed(true);
                }
                if self.state.staged.take().is_some() {
                    self.state.clear_input();
                    return DispatchResult::changed(true);
                }
                if let NavigationLevel::Category { .. } = self.state.level {
                    self.state.level = self.state.level.parent();
                    self.state.clear_input();
                    return DispatchResult::changed(true);
                }
                self.state.reset();
                DispatchResult {
                    effects: vec![Effect::Closed],
                    state_changed: true,
                }
            }
            Action::GoRoot => {
                let already_root = self.state.at_root()
                    && self.state.page.is_none()
                    && self.state.prompt.is_none()
                    && self.state.staged.is_none()
                    && self.state.query.is_empty();
                if already_root {
                    return DispatchResult::unchanged();
                }
                self.state.level = NavigationLevel::Root;
                self.state.page = None;
                self.state.staged = None;
                self.state.clear_input();
                DispatchResult::changed(true)
            }
            Action::Stage(flow) => {
                tracing::debug!(staged = ?flow, "staged flow started");
                self.state.staged = Some(flow);
                self.state.clear_input();
                DispatchResult::changed(true)
            }
            Action::ClearStaged => DispatchResult::changed(self.state.staged.take().is_some()),
            _ => unreachable!("non-navigation action passed to reduce_navigation_action"),
        }
    }
}
