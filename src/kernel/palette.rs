//! The palette host object.
//!
//! Owns the registry, recents, custom commands and the navigation store, and
//! is the single execution boundary: handler failures, validation failures and
//! cancellations are settled here and never reach callers as errors.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::NaiveDateTime;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::{
    ActionContext, Category, Command, CommandInput, CommandInvocation, ExecutionError, PageField,
    ValidationError, ROOT_CATEGORY_ID,
};
use crate::kernel::calc::{calculate, Calculation};
use crate::kernel::custom::{
    is_custom_id, CustomAction, CustomCommandDef, CustomCommandStore, CUSTOM_CATEGORY_ID,
};
use crate::kernel::pins::PinStore;
use crate::kernel::query::{parse_query, ParsedQuery, QueryIntent};
use crate::kernel::rank::{rank_items, RankItem};
use crate::kernel::recents::{RecentStore, RERUN_LAST_COMMAND_ID};
use crate::kernel::registry::{CommandRegistry, RemoveOptions};
use crate::kernel::resolvers::{
    normalize_url, resolve_channels, resolve_destinations, resolve_notebooks, resolve_notes,
    resolve_plugins, resolve_recipients, resolve_scheduled_messages, resolve_settings_pages,
    resolve_users, Candidate, CandidateKind,
};
use crate::kernel::routing::{command_actions, resolve_invocation, Resolution, RowTarget, UiContext};
use crate::kernel::services::ports::{
    ConfirmRequest, Confirmer, Destination, EntityDirectory, HostEffect, KeyValueStore,
    MessageTarget, Notice, Notifier, PaletteHost, PaletteSettings,
};
use crate::kernel::state::{PaletteState, StagedFlow};
use crate::kernel::store::{DispatchResult, Store};
use crate::kernel::when::parse_send_time;
use crate::kernel::{Action, Effect};

type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

pub type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong running that command";
pub const COPIED_MESSAGE: &str = "Copied to clipboard";
const SEND_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Everything the palette talks to outside itself.
#[derive(Clone)]
pub struct PaletteServices {
    pub storage: Arc<dyn KeyValueStore>,
    pub host: Arc<dyn PaletteHost>,
    pub notifier: Arc<dyn Notifier>,
    pub confirmer: Arc<dyn Confirmer>,
    pub directory: Arc<dyn EntityDirectory>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Canceled,
    Failed,
}

#[derive(Debug, Clone)]
pub enum PaletteRow {
    Command {
        command: Arc<Command>,
        score: i64,
        pinned: bool,
        drilldown: Option<String>,
    },
    Calculator(Calculation),
    Candidate(Candidate),
    Field {
        field: PageField,
        value: String,
    },
}

impl PaletteRow {
    pub fn label(&self) -> &str {
        match self {
            Self::Command { command, .. } => &command.label,
            Self::Calculator(calculation) => &calculation.display,
            Self::Candidate(candidate) => &candidate.label,
            Self::Field { field, .. } => &field.label,
        }
    }
}

enum CandidateStep {
    Apply(HostEffect),
    Confirm(ConfirmRequest, HostEffect),
    Stage(StagedFlow),
}

pub struct Palette {
    registry: CommandRegistry,
    recents: RecentStore,
    custom: CustomCommandStore,
    store: Store,
    settings: PaletteSettings,
    services: PaletteServices,
    clock: Clock,
}

impl Palette {
    pub fn new(settings: PaletteSettings, services: PaletteServices) -> Self {
        let storage = services.storage.clone();
        Self {
            registry: CommandRegistry::new(PinStore::new(storage.clone())),
            recents: RecentStore::with_limit(storage.clone(), settings.recent_limit),
            custom: CustomCommandStore::new(storage),
            store: Store::default(),
            settings,
            services,
            clock: Box::new(|| chrono::Local::now().naive_local()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn recents(&self) -> &RecentStore {
        &self.recents
    }

    pub fn custom_commands(&self) -> &[CustomCommandDef] {
        self.custom.list()
    }

    pub fn settings(&self) -> &PaletteSettings {
        &self.settings
    }

    pub fn state(&self) -> &PaletteState {
        self.store.state()
    }

    /// Hydrates persisted state and registers the built-in and custom
    /// commands. Call once static commands and providers are registered, so
    /// pins on them survive the prune.
    pub async fn load(&mut self) {
        if let Err(error) = self.registry.pins_mut().hydrate().await {
            tracing::warn!(error = %error, "failed to load pinned commands");
        }
        if let Err(error) = self.recents.hydrate().await {
            tracing::warn!(error = %error, "failed to load recent commands");
        }
        if let Err(error) = self.custom.hydrate().await {
            tracing::warn!(error = %error, "failed to load custom commands");
        }

        self.registry.register_command(
            Command::new(RERUN_LAST_COMMAND_ID, "Re-run Last Command")
                .with_description("Run the most recently used command again")
                .with_keywords(["repeat", "again", "last", "previous"]),
        );
        self.registry
            .register_category(Category::new(CUSTOM_CATEGORY_ID, "Custom Commands"));
        for def in self.custom.list() {
            self.registry.register_command(def.to_command());
        }

        let pruned = self.registry.prune_pins();
        tracing::info!(
            commands = self.registry.store().command_count(),
            custom = self.custom.list().len(),
            recents = self.recents.ids().len(),
            pruned,
            "palette loaded"
        );
    }

    /// Runs queued provider refreshes and flushes pin changes they caused.
    pub async fn tick(&mut self) -> usize {
        let refreshed = self.registry.process_pending_refreshes();
        if self.registry.pins().is_dirty() {
            self.persist_pins().await;
        }
        refreshed
    }

    // ---------------------------------------------------------------------
    // State
    // ---------------------------------------------------------------------

    /// Dispatches `action` and runs the effects it produced.
    pub async fn handle(&mut self, action: Action) -> bool {
        let DispatchResult {
            effects,
            state_changed,
        } = self.store.dispatch(action);
        for effect in effects {
            match effect {
                Effect::RunCommand(invocation) => {
                    self.execute(invocation).await;
                }
                Effect::Notify(notice) => self.services.notifier.notify(notice),
                Effect::Closed => tracing::debug!("palette closed"),
            }
        }
        state_changed
    }

    fn ui_context(&self) -> UiContext {
        let state = self.store.state();
        UiContext {
            at_root: state.at_root(),
            page_open: state.page.is_some(),
            prompt_open: state.prompt.is_some(),
        }
    }

    fn action_context(&self, command: &Command) -> ActionContext {
        let state = self.store.state();
        ActionContext {
            pinned: self.registry.is_pinned(&command.id),
            query: state.query.clone(),
            category_id: state.level.category_id().map(str::to_string),
        }
    }

    // ---------------------------------------------------------------------
    // Rows
    // ---------------------------------------------------------------------

    pub fn rows(&self) -> Vec<PaletteRow> {
        let state = self.store.state();

        if let Some(page) = &state.page {
            return page
                .spec
                .fields
                .iter()
                .map(|field| PaletteRow::Field {
                    field: field.clone(),
                    value: page.value(&field.id).to_string(),
                })
                .collect();
        }

        if let Some(prompt) = &state.prompt {
            return self
                .registry
                .command(&prompt.command_id)
                .map(|command| vec![self.command_row(command, 0)])
                .unwrap_or_default();
        }

        if let Some(staged) = &state.staged {
            return self
                .staged_candidates(staged, &state.query)
                .into_iter()
                .map(PaletteRow::Candidate)
                .collect();
        }

        if let Some(parsed) = parse_query(&state.query) {
            return self
                .intent_candidates(&parsed)
                .into_iter()
                .map(PaletteRow::Candidate)
                .collect();
        }

        let mut rows = Vec::new();
        if let Some(calculation) = calculate(&state.query) {
            rows.push(PaletteRow::Calculator(calculation));
        }
        rows.extend(self.command_rows());
        rows
    }

    pub fn selected_row(&self) -> Option<PaletteRow> {
        let mut rows = self.rows();
        if rows.is_empty() {
            return None;
        }
        let index = self.store.state().selected.min(rows.len() - 1);
        Some(rows.swap_remove(index))
    }

    fn command_row(&self, command: Arc<Command>, score: i64) -> PaletteRow {
        let drilldown = self.drilldown_target(&command);
        PaletteRow::Command {
            pinned: self.registry.is_pinned(&command.id),
            command,
            score,
            drilldown,
        }
    }

    /// Explicit drill-down, or the category sharing the command's id when it
    /// has children.
    fn drilldown_target(&self, command: &Command) -> Option<String> {
        command.drilldown_category_id.clone().or_else(|| {
            self.registry
                .category_has_children(&command.id)
                .then(|| command.id.clone())
        })
    }

    fn command_rows(&self) -> Vec<PaletteRow> {
        let state = self.store.state();
        let current = state.level.category_id();
        let query = state.query.trim();

        if query.is_empty() {
            let mut rows = Vec::new();
            let listed = match current {
                None => {
                    let pinned = self.registry.pinned_commands();
                    rows.extend(pinned.into_iter().map(|command| self.command_row(command, 0)));
                    self.registry.list_commands_by_category(ROOT_CATEGORY_ID)
                }
                Some(category_id) => self.registry.list_commands_by_category(category_id),
            };
            rows.extend(
                listed
                    .iter()
                    .filter(|command| current.is_some() || !self.registry.is_pinned(&command.id))
                    .map(|command| self.command_row(command.clone(), 0)),
            );
            return rows;
        }

        let pool = match current {
            None => self.registry.list_commands(),
            Some(category_id) => self.registry.list_commands_in_tree(category_id),
        };
        let mut by_id: FxHashMap<&str, &Arc<Command>> = FxHashMap::default();
        let mut items = Vec::with_capacity(pool.len());
        for command in pool.iter() {
            if command.hidden_in_search && current != Some(command.category_id.as_str()) {
                continue;
            }
            by_id.insert(command.id.as_str(), command);
            items.push(self.rank_item(command));
        }

        rank_items(query, items)
            .into_iter()
            .filter_map(|ranked| {
                by_id
                    .get(ranked.item.id.as_str())
                    .map(|command| self.command_row((*command).clone(), ranked.score))
            })
            .collect()
    }

    fn rank_item(&self, command: &Command) -> RankItem {
        let category_weight = self
            .registry
            .category(&command.category_id)
            .map(|category| category.weight)
            .unwrap_or(0)
            + self.settings.category_weight(&command.category_id);
        RankItem {
            id: command.id.clone(),
            label: command.label.clone(),
            description: command.description.clone(),
            keywords: command.keywords.clone(),
            search_text: self.registry.search_text(&command.id),
            recent_rank: self.recents.rank_of(&command.id),
            pinned: self.registry.is_pinned(&command.id),
            category_weight,
        }
    }

    fn intent_candidates(&self, parsed: &ParsedQuery) -> Vec<Candidate> {
        let directory = self.services.directory.as_ref();
        let target = parsed.target.as_str();
        match parsed.intent {
            QueryIntent::SendMessage => resolve_recipients(directory, target),
            QueryIntent::SendChannel | QueryIntent::ScheduleMessage => {
                resolve_channels(directory, target)
            }
            QueryIntent::OpenDm => resolve_users(directory, target),
            QueryIntent::GoTo => resolve_destinations(directory, target),
            QueryIntent::OpenSettings => resolve_settings_pages(directory, target),
            QueryIntent::TogglePlugin => resolve_plugins(directory, target),
            QueryIntent::OpenUrl => vec![match normalize_url(target) {
                Ok(url) => Candidate::new(url.as_str(), format!("Open {url}"), CandidateKind::Url),
                Err(error) => {
                    Candidate::new("invalid-url", error.to_string(), CandidateKind::NoMatch)
                }
            }],
            QueryIntent::CreateNotebook => vec![Candidate::new(
                target,
                format!("Create notebook \"{target}\""),
                CandidateKind::Create,
            )],
            QueryIntent::DeleteNotebook => resolve_notebooks(directory, target),
            QueryIntent::MoveNote | QueryIntent::JumpNote => resolve_notes(directory, target),
            QueryIntent::RescheduleMessage
            | QueryIntent::SendScheduledNow
            | QueryIntent::CancelScheduledMessage => resolve_scheduled_messages(directory, target),
        }
    }

    fn staged_candidates(&self, staged: &StagedFlow, query: &str) -> Vec<Candidate> {
        match staged {
            StagedFlow::MoveNote { .. } => {
                resolve_notebooks(self.services.directory.as_ref(), query)
            }
            StagedFlow::Reschedule { message_id } => {
                let candidate = match parse_send_time(query, (self.clock)()) {
                    Ok(send_at) => Candidate::new(
                        message_id.as_str(),
                        format!("Reschedule to {}", send_at.format(SEND_TIME_FORMAT)),
                        CandidateKind::TimeEntry,
                    ),
                    Err(_) => Candidate::new(
                        message_id.as_str(),
                        "Type a time like \"in 10m\", \"18:30\" or \"2026-01-31 09:00\"",
                        CandidateKind::TimeEntry,
                    ),
                };
                vec![candidate]
            }
            StagedFlow::CancelScheduled { message_id } => vec![Candidate::new(
                message_id.as_str(),
                "Cancel this scheduled message",
                CandidateKind::Confirm,
            )],
        }
    }

    // ---------------------------------------------------------------------
    // Invocation
    // ---------------------------------------------------------------------

    /// Resolves `key` against the selected row and carries it out.
    pub async fn invoke(&mut self, key: &str) -> Resolution {
        let row = self.selected_row();
        let ui = self.ui_context();

        let resolution = match &row {
            Some(PaletteRow::Command {
                command, drilldown, ..
            }) => {
                let context = self.action_context(command);
                resolve_invocation(
                    RowTarget::Command {
                        command,
                        drilldown: drilldown.as_deref(),
                        context: &context,
                    },
                    key,
                    ui,
                    &self.settings,
                )
            }
            Some(PaletteRow::Calculator(calculation)) => resolve_invocation(
                RowTarget::Calculator {
                    result: &calculation.display,
                },
                key,
                ui,
                &self.settings,
            ),
            Some(PaletteRow::Candidate(_)) => {
                resolve_invocation(RowTarget::Candidate, key, ui, &self.settings)
            }
            Some(PaletteRow::Field { .. }) | None => {
                resolve_invocation(RowTarget::Empty, key, ui, &self.settings)
            }
        };
        tracing::debug!(key, resolution = ?resolution, "palette invocation resolved");

        match (&resolution, row) {
            (Resolution::ExecutePrimary, Some(PaletteRow::Command { command, .. })) => {
                if ui.prompt_open {
                    self.handle(Action::SubmitPrompt).await;
                } else {
                    self.execute(CommandInvocation::new(command.id.clone())).await;
                }
            }
            (
                Resolution::ExecuteSecondary { action_id },
                Some(PaletteRow::Command {
                    command, drilldown, ..
                }),
            ) => {
                self.execute_action(&command, drilldown.as_deref(), action_id)
                    .await;
            }
            (Resolution::TogglePin, Some(PaletteRow::Command { command, .. })) => {
                self.toggle_pin(&command.id).await;
            }
            (Resolution::OpenPrompt, Some(PaletteRow::Command { command, .. })) => {
                if let CommandInput::Prompt { placeholder } = &command.input {
                    self.handle(Action::OpenPrompt {
                        command_id: command.id.clone(),
                        placeholder: placeholder.clone(),
                    })
                    .await;
                }
            }
            (Resolution::OpenPage, Some(PaletteRow::Command { command, .. })) => {
                if let CommandInput::Page(page) = &command.input {
                    self.handle(Action::OpenPage {
                        command_id: command.id.clone(),
                        page: page.clone(),
                    })
                    .await;
                }
            }
            (Resolution::SelectCandidate, Some(PaletteRow::Candidate(candidate))) => {
                self.select_candidate(&candidate).await;
            }
            (Resolution::Drilldown { category_id }, _) => {
                self.handle(Action::Drilldown {
                    category_id: category_id.clone(),
                })
                .await;
            }
            (Resolution::GoBack, _) => {
                self.handle(Action::Back).await;
            }
            (Resolution::GoRoot, _) => {
                self.handle(Action::GoRoot).await;
            }
            (Resolution::SubmitPage, _) => {
                self.handle(Action::SubmitPage).await;
            }
            (Resolution::CopyText { text }, _) => {
                self.copy_text(text.clone()).await;
            }
            _ => {}
        }
        resolution
    }

    async fn copy_text(&mut self, text: String) -> Outcome {
        let result = self.services.host.apply(HostEffect::CopyText(text)).await;
        let outcome = self.settle("copy-text", result);
        if outcome == Outcome::Completed {
            self.services.notifier.notify(Notice::success(COPIED_MESSAGE));
        }
        outcome
    }

    /// Returns the new pinned state.
    pub async fn toggle_pin(&mut self, id: &str) -> bool {
        let pinned = self.registry.toggle_pinned(id);
        tracing::debug!(command_id = %id, pinned, "pin toggled");
        self.persist_pins().await;
        pinned
    }

    async fn persist_pins(&mut self) {
        if let Err(error) = self.registry.pins_mut().persist().await {
            tracing::warn!(error = %error, "failed to persist pinned commands");
        }
    }

    // ---------------------------------------------------------------------
    // Candidates
    // ---------------------------------------------------------------------

    pub async fn select_candidate(&mut self, candidate: &Candidate) -> Outcome {
        let step = match self.candidate_step(candidate) {
            Ok(step) => step,
            Err(error) => return self.settle("candidate", Err(error.into())),
        };

        match step {
            CandidateStep::Stage(flow) => {
                self.handle(Action::Stage(flow)).await;
                Outcome::Completed
            }
            CandidateStep::Apply(effect) => self.apply_host_effect(effect).await,
            CandidateStep::Confirm(request, effect) => {
                if self.services.confirmer.confirm(request).await {
                    self.apply_host_effect(effect).await
                } else {
                    self.settle("candidate", Err(ExecutionError::Canceled))
                }
            }
        }
    }

    async fn apply_host_effect(&mut self, effect: HostEffect) -> Outcome {
        tracing::debug!(effect = ?effect, "applying host effect");
        let result = self.services.host.apply(effect).await;
        let outcome = self.settle("host-effect", result);
        if outcome == Outcome::Completed {
            self.store.dispatch(Action::Close);
        }
        outcome
    }

    fn candidate_step(&self, candidate: &Candidate) -> Result<CandidateStep, ValidationError> {
        let state = self.store.state();

        if let Some(staged) = &state.staged {
            return self.staged_step(staged, candidate, &state.query);
        }

        let Some(parsed) = parse_query(&state.query) else {
            return Err(ValidationError::UnresolvedTarget {
                target: state.query.trim().to_string(),
            });
        };

        // An invalid URL surfaces its own validation message below.
        if candidate.is_no_match() && parsed.intent != QueryIntent::OpenUrl {
            return Err(ValidationError::UnresolvedTarget {
                target: parsed.target.clone(),
            });
        }

        let id = candidate.id.to_string();
        let effect = match parsed.intent {
            QueryIntent::SendMessage | QueryIntent::SendChannel => {
                let content = parsed.content.clone().unwrap_or_default();
                if content.trim().is_empty() && !parsed.use_file_picker {
                    return Err(ValidationError::EmptyContent);
                }
                let target = match candidate.kind {
                    CandidateKind::User => MessageTarget::User(id),
                    _ => MessageTarget::Channel(id),
                };
                HostEffect::SendMessage {
                    target,
                    content,
                    silent: parsed.silent,
                    use_file_picker: parsed.use_file_picker,
                }
            }
            QueryIntent::OpenDm => HostEffect::OpenDm { user_id: id },
            QueryIntent::GoTo => HostEffect::GoTo {
                destination: match candidate.kind {
                    CandidateKind::Guild => Destination::Guild(id),
                    _ => Destination::Channel(id),
                },
            },
            QueryIntent::OpenSettings => {
                let route = self
                    .services
                    .directory
                    .settings_pages()
                    .into_iter()
                    .find(|page| page.id == id)
                    .map(|page| page.route)
                    .unwrap_or(id);
                HostEffect::OpenSettings { route }
            }
            QueryIntent::TogglePlugin => HostEffect::TogglePlugin { plugin_id: id },
            QueryIntent::OpenUrl => HostEffect::OpenUrl {
                url: normalize_url(&parsed.target)?.to_string(),
                external: true,
            },
            QueryIntent::CreateNotebook => HostEffect::CreateNotebook {
                name: parsed.target.clone(),
            },
            QueryIntent::DeleteNotebook => {
                let request = ConfirmRequest {
                    title: "Delete notebook".to_string(),
                    body: format!(
                        "Delete \"{}\" and every note in it? This cannot be undone.",
                        candidate.label
                    ),
                    confirm_label: "Delete".to_string(),
                    danger: true,
                };
                return Ok(CandidateStep::Confirm(
                    request,
                    HostEffect::DeleteNotebook { notebook_id: id },
                ));
            }
            QueryIntent::MoveNote => {
                return Ok(CandidateStep::Stage(StagedFlow::MoveNote {
                    note_id: id,
                    note_title: candidate.label.clone(),
                }));
            }
            QueryIntent::JumpNote => HostEffect::JumpToNote { note_id: id },
            QueryIntent::ScheduleMessage => {
                let content = parsed.content.clone().unwrap_or_default();
                if content.trim().is_empty() {
                    return Err(ValidationError::EmptyContent);
                }
                let when = parsed.when.clone().unwrap_or_default();
                let send_at = parse_send_time(&when, (self.clock)())?;
                HostEffect::ScheduleMessage {
                    channel_id: id,
                    content,
                    send_at,
                }
            }
            QueryIntent::RescheduleMessage => {
                return Ok(CandidateStep::Stage(StagedFlow::Reschedule { message_id: id }));
            }
            QueryIntent::SendScheduledNow => HostEffect::SendScheduledNow { message_id: id },
            QueryIntent::CancelScheduledMessage => {
                return Ok(CandidateStep::Stage(StagedFlow::CancelScheduled {
                    message_id: id,
                }));
            }
        };
        Ok(CandidateStep::Apply(effect))
    }

    fn staged_step(
        &self,
        staged: &StagedFlow,
        candidate: &Candidate,
        query: &str,
    ) -> Result<CandidateStep, ValidationError> {
        let effect = match staged {
            StagedFlow::MoveNote { note_id, .. } => {
                if candidate.is_no_match() {
                    return Err(ValidationError::UnresolvedTarget {
                        target: query.trim().to_string(),
                    });
                }
                HostEffect::MoveNote {
                    note_id: note_id.clone(),
                    notebook_id: candidate.id.to_string(),
                }
            }
            StagedFlow::Reschedule { message_id } => HostEffect::RescheduleMessage {
                message_id: message_id.clone(),
                send_at: parse_send_time(query, (self.clock)())?,
            },
            StagedFlow::CancelScheduled { message_id } => HostEffect::CancelScheduledMessage {
                message_id: message_id.clone(),
            },
        };
        Ok(CandidateStep::Apply(effect))
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    pub async fn execute_command(&mut self, id: &str) -> Outcome {
        self.execute(CommandInvocation::new(id)).await
    }

    /// The outer execution boundary. Successful runs enter recents and close
    /// the palette; nothing else does.
    pub async fn execute(&mut self, invocation: CommandInvocation) -> Outcome {
        let command_id = invocation.command_id.clone();
        let mut visited = FxHashSet::default();
        let result = self.run(invocation, &mut visited).await;
        let outcome = self.settle(&command_id, result);
        if outcome == Outcome::Completed {
            if let Err(error) = self.recents.record(&command_id).await {
                tracing::warn!(
                    command_id = %command_id,
                    error = %error,
                    "failed to persist recents"
                );
            }
            self.store.dispatch(Action::Close);
        }
        outcome
    }

    async fn execute_action(
        &mut self,
        command: &Command,
        drilldown: Option<&str>,
        action_id: &str,
    ) -> Outcome {
        let context = self.action_context(command);
        let actions = command_actions(command, drilldown, &context, &self.settings);
        let handler = actions
            .into_iter()
            .find(|action| action.id == action_id)
            .and_then(|action| action.handler);
        let Some(handler) = handler else {
            tracing::debug!(command_id = %command.id, action_id, "action has no handler");
            let error = ExecutionError::handler(format!("{action_id} has nothing to run"));
            return self.settle(&command.id, Err(error));
        };

        let mut invocation = CommandInvocation::new(command.id.clone());
        invocation.action_id = Some(action_id.to_string());
        let result = handler(invocation).await;
        let outcome = self.settle(&command.id, result);
        if outcome == Outcome::Completed {
            self.store.dispatch(Action::Close);
        }
        outcome
    }

    fn settle(&self, command_id: &str, result: Result<(), ExecutionError>) -> Outcome {
        let error = match result {
            Ok(()) => return Outcome::Completed,
            Err(error) => error,
        };
        match error {
            ExecutionError::Canceled => {
                tracing::debug!(command_id = %command_id, "execution canceled");
                return Outcome::Canceled;
            }
            ExecutionError::LoopDetected { command_id: at } => {
                tracing::warn!(command_id = %command_id, at = %at, "macro loop detected");
                self.services
                    .notifier
                    .notify(Notice::failure(format!("Loop detected: {at} runs itself")));
            }
            ExecutionError::Validation(error) => {
                tracing::debug!(command_id = %command_id, error = %error, "validation failed");
                self.services
                    .notifier
                    .notify(Notice::failure(error.to_string()));
            }
            error => {
                tracing::error!(command_id = %command_id, error = %error, "command failed");
                self.services
                    .notifier
                    .notify(Notice::failure(GENERIC_FAILURE_MESSAGE));
            }
        }
        Outcome::Failed
    }

    /// `visited` collects every custom command entered during one execution.
    fn run<'a>(
        &'a self,
        invocation: CommandInvocation,
        visited: &'a mut FxHashSet<String>,
    ) -> LocalBoxFuture<'a, Result<(), ExecutionError>> {
        Box::pin(async move {
            let id = invocation.command_id.clone();

            if is_custom_id(&id) {
                if !visited.insert(id.clone()) {
                    return Err(ExecutionError::LoopDetected { command_id: id });
                }
                return self.run_custom(&id, visited).await;
            }

            if id == RERUN_LAST_COMMAND_ID {
                let Some(last) = self.recents.newest(Some(RERUN_LAST_COMMAND_ID)) else {
                    return Err(ExecutionError::handler("There is no command to re-run yet"));
                };
                let last = last.to_string();
                tracing::debug!(command_id = %last, "re-running last command");
                return self.run(CommandInvocation::new(last), visited).await;
            }

            let command = self
                .registry
                .command(&id)
                .ok_or_else(|| ExecutionError::CommandNotFound {
                    command_id: id.clone(),
                })?;
            match &command.handler {
                Some(handler) => handler(invocation).await,
                None => Err(ExecutionError::handler(format!(
                    "{} has nothing to run",
                    command.label
                ))),
            }
        })
    }

    async fn run_custom(
        &self,
        id: &str,
        visited: &mut FxHashSet<String>,
    ) -> Result<(), ExecutionError> {
        let def = self
            .custom
            .get(id)
            .cloned()
            .ok_or_else(|| ExecutionError::CommandNotFound {
                command_id: id.to_string(),
            })?;

        if def.show_confirmation {
            let request = ConfirmRequest {
                title: format!("Run \"{}\"?", def.label),
                body: def
                    .description
                    .clone()
                    .unwrap_or_else(|| "This custom command will run now.".to_string()),
                confirm_label: "Run".to_string(),
                danger: true,
            };
            if !self.services.confirmer.confirm(request).await {
                return Err(ExecutionError::Canceled);
            }
        }

        match def.action {
            CustomAction::Command { command_id } => {
                self.run(CommandInvocation::new(command_id), visited).await
            }
            CustomAction::Settings { route } => {
                self.services
                    .host
                    .apply(HostEffect::OpenSettings { route })
                    .await
            }
            CustomAction::Url { url, open_external } => {
                let url = normalize_url(&url)?;
                self.services
                    .host
                    .apply(HostEffect::OpenUrl {
                        url: url.to_string(),
                        external: open_external,
                    })
                    .await
            }
            CustomAction::Macro { steps } => {
                for step in steps {
                    self.run(CommandInvocation::new(step), visited).await?;
                }
                Ok(())
            }
        }
    }

    // ---------------------------------------------------------------------
    // Custom commands
    // ---------------------------------------------------------------------

    /// Validates, stores and registers `def`. Returns the stored id.
    pub async fn save_custom_command(
        &mut self,
        def: CustomCommandDef,
    ) -> Result<String, ExecutionError> {
        let command = self.custom.upsert(def)?.to_command();
        let id = command.id.clone();
        self.registry.register_command(command);
        self.custom.persist().await?;
        tracing::debug!(command_id = %id, "custom command saved");
        Ok(id)
    }

    pub async fn remove_custom_command(&mut self, id: &str) -> Result<bool, ExecutionError> {
        if self.custom.remove(id).is_none() {
            return Ok(false);
        }
        self.registry.remove_command(id, RemoveOptions::default());
        self.custom.persist().await?;
        if self.registry.pins().is_dirty() {
            self.persist_pins().await;
        }
        Ok(true)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/palette.rs"]
mod tests;
