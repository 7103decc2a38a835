use super::*;
use crate::core::{handler_fn, BoxFuture, PageSpec};
use crate::kernel::services::ports::{
    load_json, save_json, ChannelEntity, DirectorySnapshot, MemoryStore, NoteEntity,
    NoticeKind, NotebookEntity, ScheduledMessageEntity, UserEntity, CUSTOM_COMMANDS_KEY,
    PINNED_COMMANDS_KEY, RECENT_COMMANDS_KEY,
};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn now() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2030-01-07 09:00", "%Y-%m-%d %H:%M").unwrap()
}

#[derive(Default)]
struct RecordingHost {
    effects: Mutex<Vec<HostEffect>>,
}

impl PaletteHost for RecordingHost {
    fn apply(&self, effect: HostEffect) -> BoxFuture<'_, Result<(), ExecutionError>> {
        self.effects.lock().push(effect);
        Box::pin(async { Ok(()) })
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

struct ScriptedConfirmer {
    answer: AtomicBool,
    asked: AtomicUsize,
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, _request: ConfirmRequest) -> BoxFuture<'_, bool> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        let answer = self.answer.load(Ordering::SeqCst);
        Box::pin(async move { answer })
    }
}

struct Harness {
    palette: Palette,
    host: Arc<RecordingHost>,
    notifier: Arc<RecordingNotifier>,
    confirmer: Arc<ScriptedConfirmer>,
    storage: Arc<MemoryStore>,
    runs: Arc<Mutex<Vec<CommandInvocation>>>,
}

impl Harness {
    fn notices(&self) -> Vec<Notice> {
        self.notifier.notices.lock().clone()
    }

    fn effects(&self) -> Vec<HostEffect> {
        self.host.effects.lock().clone()
    }

    fn runs(&self) -> Vec<CommandInvocation> {
        self.runs.lock().clone()
    }

    async fn query(&mut self, query: &str) {
        if !self.palette.state().visible {
            self.palette.handle(Action::Open).await;
        }
        self.palette.handle(Action::SetQuery(query.to_string())).await;
    }
}

fn directory() -> DirectorySnapshot {
    DirectorySnapshot {
        users: vec![UserEntity::new("100", "alice")],
        channels: vec![ChannelEntity::new("200", "general")],
        notebooks: vec![
            NotebookEntity {
                id: "nb-work".to_string(),
                name: "Work".to_string(),
            },
            NotebookEntity {
                id: "nb-home".to_string(),
                name: "Home".to_string(),
            },
        ],
        notes: vec![NoteEntity {
            id: "note-1".to_string(),
            title: "Standup notes".to_string(),
            notebook_id: "nb-work".to_string(),
        }],
        scheduled: vec![ScheduledMessageEntity {
            id: "sched-1".to_string(),
            channel_id: "200".to_string(),
            content: "Weekly sync".to_string(),
            send_at: now(),
        }],
        ..DirectorySnapshot::default()
    }
}

fn recording(runs: &Arc<Mutex<Vec<CommandInvocation>>>) -> crate::core::CommandHandler {
    let runs = runs.clone();
    handler_fn(move |invocation| {
        let runs = runs.clone();
        async move {
            runs.lock().push(invocation);
            Ok(())
        }
    })
}

fn register_fixture(registry: &mut CommandRegistry, runs: &Arc<Mutex<Vec<CommandInvocation>>>) {
    let mut theme = Command::new("toggle-theme", "Toggle Theme").with_keywords(["dark"]);
    theme.handler = Some(recording(runs));
    registry.register_command(theme);

    let mut whisper = Command::new("whisper", "Whisper").with_prompt("Message");
    whisper.handler = Some(recording(runs));
    registry.register_command(whisper);

    let mut poll = Command::new("create-poll", "Create Poll").with_page(PageSpec {
        title: "New poll".to_string(),
        fields: vec![
            PageField::new("question", "Question").required(),
            PageField::new("options", "Options"),
        ],
    });
    poll.handler = Some(recording(runs));
    registry.register_command(poll);

    registry.register_command(
        Command::new("broken", "Broken Command")
            .with_handler(|_| async { Err(ExecutionError::handler("boom")) }),
    );

    registry.register_command(Command::new("notes", "Notes").drilldown("notes"));
    let export_runs = runs.clone();
    let mut export = Command::new("export-notes", "Export Notes")
        .in_category("notes")
        .with_actions(move |_| {
            vec![crate::core::ActionDefinition::secondary(
                "export-markdown",
                "Export as Markdown",
                "markdown",
                recording(&export_runs),
            )
            .with_shortcut("meta+m")]
        });
    export.handler = Some(recording(runs));
    registry.register_command(export);
    registry.register_command(
        Command::new("rebuild-index", "Rebuild Note Index")
            .in_category("notes")
            .hidden_in_search(),
    );

    registry.register_command(Command::new("settings-hub", "Settings Hub"));
    registry.register_command(
        Command::new("open-audio", "Open Audio").in_category("settings-hub"),
    );
}

fn harness_with(storage: Arc<MemoryStore>) -> Harness {
    let host = Arc::new(RecordingHost::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let confirmer = Arc::new(ScriptedConfirmer {
        answer: AtomicBool::new(true),
        asked: AtomicUsize::new(0),
    });
    let services = PaletteServices {
        storage: storage.clone(),
        host: host.clone(),
        notifier: notifier.clone(),
        confirmer: confirmer.clone(),
        directory: Arc::new(directory()),
    };
    let runs = Arc::new(Mutex::new(Vec::new()));
    let mut palette =
        Palette::new(PaletteSettings::default(), services).with_clock(Box::new(now));
    register_fixture(palette.registry_mut(), &runs);
    block_on(palette.load());
    Harness {
        palette,
        host,
        notifier,
        confirmer,
        storage,
        runs,
    }
}

fn harness() -> Harness {
    harness_with(Arc::new(MemoryStore::new()))
}

fn failure(message: impl Into<String>) -> Notice {
    Notice::failure(message)
}

// -------------------------------------------------------------------------
// Execution boundary
// -------------------------------------------------------------------------

#[test]
fn successful_runs_enter_recents() {
    let mut h = harness();
    let outcome = block_on(h.palette.execute_command("toggle-theme"));
    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(h.runs().len(), 1);
    assert_eq!(h.palette.recents().ids(), ["toggle-theme".to_string()]);

    let stored: Vec<String> =
        block_on(load_json(h.storage.as_ref(), RECENT_COMMANDS_KEY)).unwrap().unwrap();
    assert_eq!(stored, vec!["toggle-theme".to_string()]);
}

#[test]
fn handler_failure_is_reported_and_not_recorded() {
    let mut h = harness();
    let outcome = block_on(h.palette.execute_command("broken"));
    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(h.notices(), vec![failure(GENERIC_FAILURE_MESSAGE)]);
    assert!(h.palette.recents().ids().is_empty());
}

#[test]
fn unknown_command_fails_generically() {
    let mut h = harness();
    assert_eq!(
        block_on(h.palette.execute_command("does-not-exist")),
        Outcome::Failed
    );
    assert_eq!(h.notices(), vec![failure(GENERIC_FAILURE_MESSAGE)]);
}

#[test]
fn rerun_last_runs_the_newest_other_command() {
    let mut h = harness();
    assert_eq!(
        block_on(h.palette.execute_command(RERUN_LAST_COMMAND_ID)),
        Outcome::Failed
    );

    block_on(h.palette.execute_command("toggle-theme"));
    let outcome = block_on(h.palette.execute_command(RERUN_LAST_COMMAND_ID));
    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(h.runs().len(), 2);
    assert_eq!(h.palette.recents().ids(), ["toggle-theme".to_string()]);
}

// -------------------------------------------------------------------------
// Custom commands and macros
// -------------------------------------------------------------------------

fn settings_action(route: &str) -> CustomAction {
    CustomAction::Settings {
        route: route.to_string(),
    }
}

fn macro_of(steps: &[&str]) -> CustomAction {
    CustomAction::Macro {
        steps: steps.iter().map(|step| step.to_string()).collect(),
    }
}

#[test]
fn self_referencing_macro_reports_a_loop() {
    let mut h = harness();
    let def = CustomCommandDef::new("again", "Again", macro_of(&["custom-again"]));
    let id = block_on(h.palette.save_custom_command(def)).unwrap();
    assert_eq!(id, "custom-again");

    assert_eq!(block_on(h.palette.execute_command(&id)), Outcome::Failed);
    assert_eq!(
        h.notices(),
        vec![failure("Loop detected: custom-again runs itself")]
    );
    assert!(h.palette.recents().ids().is_empty());
}

#[test]
fn indirect_cycles_halt_the_remaining_steps() {
    let mut h = harness();
    block_on(async {
        h.palette
            .save_custom_command(CustomCommandDef::new(
                "a",
                "A",
                macro_of(&["custom-b", "toggle-theme"]),
            ))
            .await
            .unwrap();
        h.palette
            .save_custom_command(CustomCommandDef::new(
                "b",
                "B",
                CustomAction::Command {
                    command_id: "custom-a".to_string(),
                },
            ))
            .await
            .unwrap();
    });

    assert_eq!(block_on(h.palette.execute_command("custom-a")), Outcome::Failed);
    assert!(h.runs().is_empty());
    assert_eq!(h.notices(), vec![failure("Loop detected: custom-a runs itself")]);
}

#[test]
fn repeating_a_custom_step_within_one_run_is_a_loop() {
    let mut h = harness();
    block_on(async {
        h.palette
            .save_custom_command(CustomCommandDef::new("voice", "Voice", settings_action("voice")))
            .await
            .unwrap();
        h.palette
            .save_custom_command(CustomCommandDef::new(
                "twice",
                "Twice",
                macro_of(&["custom-voice", "toggle-theme", "custom-voice"]),
            ))
            .await
            .unwrap();
    });

    assert_eq!(block_on(h.palette.execute_command("custom-twice")), Outcome::Failed);
    assert_eq!(
        h.effects(),
        vec![HostEffect::OpenSettings {
            route: "voice".to_string(),
        }]
    );
    assert_eq!(h.runs().len(), 1);
    assert_eq!(h.notices(), vec![failure("Loop detected: custom-voice runs itself")]);
    assert!(h.palette.recents().ids().is_empty());

    assert_eq!(block_on(h.palette.execute_command("custom-voice")), Outcome::Completed);
}

#[test]
fn declined_confirmation_is_a_silent_no_op() {
    let mut h = harness();
    let mut def = CustomCommandDef::new("wipe", "Wipe", settings_action("privacy"));
    def.show_confirmation = true;
    block_on(h.palette.save_custom_command(def)).unwrap();

    h.confirmer.answer.store(false, Ordering::SeqCst);
    assert_eq!(block_on(h.palette.execute_command("custom-wipe")), Outcome::Canceled);
    assert_eq!(h.confirmer.asked.load(Ordering::SeqCst), 1);
    assert!(h.notices().is_empty());
    assert!(h.effects().is_empty());
    assert!(h.palette.recents().ids().is_empty());

    h.confirmer.answer.store(true, Ordering::SeqCst);
    assert_eq!(block_on(h.palette.execute_command("custom-wipe")), Outcome::Completed);
    assert_eq!(h.palette.recents().ids(), ["custom-wipe".to_string()]);
}

#[test]
fn url_custom_commands_normalize_before_opening() {
    let mut h = harness();
    block_on(h.palette.save_custom_command(CustomCommandDef::new(
        "docs",
        "Docs",
        CustomAction::Url {
            url: "docs.rs".to_string(),
            open_external: true,
        },
    )))
    .unwrap();

    block_on(h.palette.execute_command("custom-docs"));
    assert_eq!(
        h.effects(),
        vec![HostEffect::OpenUrl {
            url: "https://docs.rs/".to_string(),
            external: true,
        }]
    );
}

#[test]
fn invalid_custom_commands_are_rejected() {
    let mut h = harness();
    let result = block_on(h.palette.save_custom_command(CustomCommandDef::new(
        "bad",
        "Bad",
        CustomAction::Url {
            url: "not a url".to_string(),
            open_external: false,
        },
    )));
    assert!(matches!(
        result,
        Err(ExecutionError::Validation(ValidationError::MalformedUrl { .. }))
    ));
    assert!(!h.palette.registry().contains("custom-bad"));
}

#[test]
fn removing_a_custom_command_unregisters_it() {
    let mut h = harness();
    block_on(h.palette.save_custom_command(CustomCommandDef::new(
        "voice",
        "Voice",
        settings_action("voice"),
    )))
    .unwrap();
    assert!(h.palette.registry().contains("custom-voice"));
    assert_eq!(
        h.palette
            .registry()
            .command("custom-voice")
            .unwrap()
            .category_id,
        CUSTOM_CATEGORY_ID
    );

    assert!(block_on(h.palette.remove_custom_command("custom-voice")).unwrap());
    assert!(!block_on(h.palette.remove_custom_command("custom-voice")).unwrap());
    assert!(!h.palette.registry().contains("custom-voice"));
    assert_eq!(h.storage.snapshot(CUSTOM_COMMANDS_KEY), Some(json!([])));
}

#[test]
fn load_hydrates_and_prunes() {
    let storage = Arc::new(MemoryStore::new());
    block_on(async {
        save_json(storage.as_ref(), PINNED_COMMANDS_KEY, &["toggle-theme", "gone"])
            .await
            .unwrap();
        save_json(
            storage.as_ref(),
            RECENT_COMMANDS_KEY,
            &["whisper", RERUN_LAST_COMMAND_ID],
        )
        .await
        .unwrap();
        save_json(
            storage.as_ref(),
            CUSTOM_COMMANDS_KEY,
            &json!([{
                "id": "standup",
                "label": "Standup",
                "action": { "type": "settings", "route": "voice" }
            }]),
        )
        .await
        .unwrap();
    });

    let h = harness_with(storage);
    assert_eq!(h.palette.registry().pins().ids(), ["toggle-theme".to_string()]);
    assert_eq!(h.palette.recents().ids(), ["whisper".to_string()]);
    assert!(h.palette.registry().contains("custom-standup"));
    assert!(h.palette.registry().contains(RERUN_LAST_COMMAND_ID));
}

// -------------------------------------------------------------------------
// Rows and invocation
// -------------------------------------------------------------------------

fn row_ids(palette: &Palette) -> Vec<String> {
    palette
        .rows()
        .into_iter()
        .filter_map(|row| match row {
            PaletteRow::Command { command, .. } => Some(command.id.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn root_rows_list_pins_first() {
    let mut h = harness();
    block_on(async {
        h.query("toggle theme").await;
        assert_eq!(h.palette.invoke("meta+shift+p").await, Resolution::TogglePin);
        h.palette.handle(Action::SetQuery(String::new())).await;
    });
    assert!(h.palette.registry().is_pinned("toggle-theme"));
    assert_eq!(h.storage.snapshot(PINNED_COMMANDS_KEY), Some(json!(["toggle-theme"])));

    let ids = row_ids(&h.palette);
    assert_eq!(ids[0], "toggle-theme");
    assert_eq!(ids.iter().filter(|id| *id == "toggle-theme").count(), 1);
    assert!(!ids.contains(&"export-notes".to_string()));
}

#[test]
fn drilldown_lists_the_category_and_back_returns() {
    let mut h = harness();
    block_on(async {
        h.query("notes").await;
        let resolution = h.palette.invoke("enter").await;
        assert_eq!(
            resolution,
            Resolution::Drilldown {
                category_id: "notes".to_string()
            }
        );
    });
    assert_eq!(h.palette.state().level.category_id(), Some("notes"));
    assert!(h.palette.state().query.is_empty());
    assert_eq!(row_ids(&h.palette), vec!["export-notes", "rebuild-index"]);

    block_on(h.palette.invoke("esc"));
    assert!(h.palette.state().at_root());
    assert!(h.palette.state().visible);
}

#[test]
fn category_with_children_drills_from_its_command() {
    let mut h = harness();
    block_on(h.query("settings hub"));
    let Some(PaletteRow::Command { drilldown, .. }) = h.palette.selected_row() else {
        panic!("expected a command row");
    };
    assert_eq!(drilldown.as_deref(), Some("settings-hub"));
}

#[test]
fn hidden_commands_only_surface_inside_their_category() {
    let mut h = harness();
    block_on(h.query("rebuild"));
    assert!(!row_ids(&h.palette).contains(&"rebuild-index".to_string()));

    block_on(async {
        h.palette
            .handle(Action::Drilldown {
                category_id: "notes".to_string(),
            })
            .await;
        h.palette.handle(Action::SetQuery("rebuild".to_string())).await;
    });
    assert_eq!(row_ids(&h.palette), vec!["rebuild-index"]);
}

#[test]
fn prompt_commands_collect_an_argument() {
    let mut h = harness();
    block_on(async {
        h.query("whisper").await;
        assert_eq!(h.palette.invoke("enter").await, Resolution::OpenPrompt);
        assert!(h.palette.state().prompt.is_some());

        assert_eq!(h.palette.invoke("enter").await, Resolution::ExecutePrimary);
        h.palette.handle(Action::SetQuery("see you at 5".to_string())).await;
        h.palette.invoke("enter").await;
    });

    assert_eq!(
        h.notices(),
        vec![failure(ValidationError::EmptyContent.to_string())]
    );
    let runs = h.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].argument.as_deref(), Some("see you at 5"));
    assert!(!h.palette.state().visible);
    assert_eq!(h.palette.recents().ids(), ["whisper".to_string()]);
}

#[test]
fn page_commands_submit_their_fields() {
    let mut h = harness();
    block_on(async {
        h.query("create poll").await;
        assert_eq!(h.palette.invoke("enter").await, Resolution::OpenPage);
        assert_eq!(h.palette.rows().len(), 2);

        assert_eq!(h.palette.invoke("enter").await, Resolution::SubmitPage);
        h.palette
            .handle(Action::PageSetField {
                field_id: "question".to_string(),
                value: "Lunch?".to_string(),
            })
            .await;
        h.palette.invoke("enter").await;
    });

    assert_eq!(h.notices(), vec![failure("Question is required")]);
    let runs = h.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].command_id, "create-poll");
    assert_eq!(runs[0].fields.get("question").map(String::as_str), Some("Lunch?"));
}

#[test]
fn secondary_actions_run_their_own_handler() {
    let mut h = harness();
    block_on(async {
        h.query("export notes").await;
        let resolution = h.palette.invoke("meta+m").await;
        assert_eq!(
            resolution,
            Resolution::ExecuteSecondary {
                action_id: "export-markdown".to_string()
            }
        );
    });
    let runs = h.runs();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].action_id.as_deref(), Some("export-markdown"));
}

#[test]
fn secondary_action_without_a_handler_reports_a_failure() {
    let mut h = harness();
    h.palette.registry_mut().register_command(
        Command::new("share-note", "Share Note").with_actions(|_| {
            vec![crate::core::ActionDefinition::new(
                "share-link",
                "Copy Share Link",
                crate::core::ActionIntent::ExecuteSecondary {
                    action_key: Some("link".to_string()),
                },
            )
            .with_shortcut("meta+l")]
        }),
    );
    block_on(async {
        h.query("share note").await;
        let resolution = h.palette.invoke("meta+l").await;
        assert_eq!(
            resolution,
            Resolution::ExecuteSecondary {
                action_id: "share-link".to_string()
            }
        );
    });
    assert_eq!(h.notices(), vec![failure(GENERIC_FAILURE_MESSAGE)]);
    assert!(h.palette.recents().ids().is_empty());
    assert!(h.palette.state().visible);
}

#[test]
fn calculator_row_copies_its_result() {
    let mut h = harness();
    block_on(h.query("2 + 3 * 4"));
    assert!(matches!(
        h.palette.rows().first(),
        Some(PaletteRow::Calculator(calculation)) if calculation.display == "14"
    ));

    let resolution = block_on(h.palette.invoke("enter"));
    assert_eq!(
        resolution,
        Resolution::CopyText {
            text: "14".to_string()
        }
    );
    assert_eq!(h.effects(), vec![HostEffect::CopyText("14".to_string())]);
    assert_eq!(h.notices()[0].kind, NoticeKind::Success);
}

// -------------------------------------------------------------------------
// Query intents
// -------------------------------------------------------------------------

#[test]
fn go_to_selects_a_channel() {
    let mut h = harness();
    block_on(async {
        h.query("go to gen").await;
        assert_eq!(h.palette.invoke("enter").await, Resolution::SelectCandidate);
    });
    assert_eq!(
        h.effects(),
        vec![HostEffect::GoTo {
            destination: Destination::Channel("200".to_string())
        }]
    );
    assert!(!h.palette.state().visible);
}

#[test]
fn send_requires_content() {
    let mut h = harness();
    block_on(async {
        h.query("message alice").await;
        h.palette.invoke("enter").await;
    });
    assert!(h.effects().is_empty());
    assert_eq!(
        h.notices(),
        vec![failure(ValidationError::EmptyContent.to_string())]
    );

    block_on(async {
        h.query("message alice: lunch? --silent").await;
        h.palette.invoke("enter").await;
    });
    assert_eq!(
        h.effects(),
        vec![HostEffect::SendMessage {
            target: MessageTarget::User("100".to_string()),
            content: "lunch?".to_string(),
            silent: true,
            use_file_picker: false,
        }]
    );
}

#[test]
fn no_match_explains_the_miss() {
    let mut h = harness();
    block_on(async {
        h.query("open dm zzz").await;
        h.palette.invoke("enter").await;
    });
    assert!(h.effects().is_empty());
    assert_eq!(h.notices(), vec![failure("No match for \"zzz\"")]);
    assert!(h.palette.state().visible);
}

#[test]
fn open_url_validates_the_target() {
    let mut h = harness();
    block_on(async {
        h.query("open url http://nohost").await;
        h.palette.invoke("enter").await;
        h.query("open url example.com/docs").await;
        h.palette.invoke("enter").await;
    });
    assert_eq!(
        h.notices(),
        vec![failure("\"http://nohost\" is not a valid URL")]
    );
    assert_eq!(
        h.effects(),
        vec![HostEffect::OpenUrl {
            url: "https://example.com/docs".to_string(),
            external: true,
        }]
    );
}

#[test]
fn schedule_parses_the_send_time() {
    let mut h = harness();
    block_on(async {
        h.query("schedule general in 10m standup moved").await;
        h.palette.invoke("enter").await;
    });
    assert_eq!(
        h.effects(),
        vec![HostEffect::ScheduleMessage {
            channel_id: "200".to_string(),
            content: "standup moved".to_string(),
            send_at: now() + chrono::TimeDelta::try_minutes(10).unwrap(),
        }]
    );
}

#[test]
fn delete_notebook_asks_first() {
    let mut h = harness();
    h.confirmer.answer.store(false, Ordering::SeqCst);
    block_on(async {
        h.query("delete notebook work").await;
        h.palette.invoke("enter").await;
    });
    assert!(h.effects().is_empty());
    assert!(h.notices().is_empty());

    h.confirmer.answer.store(true, Ordering::SeqCst);
    block_on(h.palette.invoke("enter"));
    assert_eq!(
        h.effects(),
        vec![HostEffect::DeleteNotebook {
            notebook_id: "nb-work".to_string()
        }]
    );
}

// -------------------------------------------------------------------------
// Staged flows
// -------------------------------------------------------------------------

#[test]
fn move_note_stages_then_picks_a_notebook() {
    let mut h = harness();
    block_on(async {
        h.query("move note standup").await;
        h.palette.invoke("enter").await;
    });
    assert!(matches!(
        h.palette.state().staged,
        Some(StagedFlow::MoveNote { ref note_id, .. }) if note_id == "note-1"
    ));
    assert!(h.palette.state().query.is_empty());
    assert_eq!(h.palette.rows().len(), 2);

    block_on(async {
        h.palette.handle(Action::SetQuery("home".to_string())).await;
        h.palette.invoke("enter").await;
    });
    assert_eq!(
        h.effects(),
        vec![HostEffect::MoveNote {
            note_id: "note-1".to_string(),
            notebook_id: "nb-home".to_string(),
        }]
    );
    assert!(h.palette.state().staged.is_none());
}

#[test]
fn reschedule_rejects_bad_times_and_keeps_the_flow() {
    let mut h = harness();
    block_on(async {
        h.query("reschedule weekly").await;
        h.palette.invoke("enter").await;
        h.palette.handle(Action::SetQuery("whenever".to_string())).await;
        h.palette.invoke("enter").await;
    });
    assert_eq!(
        h.notices(),
        vec![failure("\"whenever\" is not a valid time in the future")]
    );
    assert!(h.palette.state().staged.is_some());

    block_on(async {
        h.palette.handle(Action::SetQuery("in 2h".to_string())).await;
        h.palette.invoke("enter").await;
    });
    assert_eq!(
        h.effects(),
        vec![HostEffect::RescheduleMessage {
            message_id: "sched-1".to_string(),
            send_at: now() + chrono::TimeDelta::try_hours(2).unwrap(),
        }]
    );
}

#[test]
fn cancel_scheduled_confirms_through_a_row() {
    let mut h = harness();
    block_on(async {
        h.query("cancel scheduled weekly").await;
        h.palette.invoke("enter").await;
    });
    let rows = h.palette.rows();
    assert!(matches!(
        rows.as_slice(),
        [PaletteRow::Candidate(candidate)] if candidate.kind == CandidateKind::Confirm
    ));

    block_on(h.palette.invoke("enter"));
    assert_eq!(
        h.effects(),
        vec![HostEffect::CancelScheduledMessage {
            message_id: "sched-1".to_string()
        }]
    );
}

#[test]
fn unrelated_intent_drops_the_staged_flow() {
    let mut h = harness();
    block_on(async {
        h.query("move note standup").await;
        h.palette.invoke("enter").await;
        h.palette
            .handle(Action::SetQuery("go to general".to_string()))
            .await;
    });
    assert!(h.palette.state().staged.is_none());
    assert!(matches!(
        h.palette.rows().first(),
        Some(PaletteRow::Candidate(candidate)) if candidate.kind == CandidateKind::Channel
    ));
}
