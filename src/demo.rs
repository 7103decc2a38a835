//! Sample host, entities and commands for the demo binary.

use chrono::NaiveDateTime;

use cmdpal::core::{
    ActionDefinition, BoxFuture, Category, Command, ExecutionError, PageField, PageSpec,
};
use cmdpal::kernel::registry::ContextProvider;
use cmdpal::kernel::services::ports::{
    ChannelEntity, ConfirmRequest, Confirmer, DirectorySnapshot, GuildEntity, HostEffect,
    NoteEntity, NotebookEntity, Notice, Notifier, PaletteHost, PluginEntity,
    ScheduledMessageEntity, SettingsPageEntity, UserEntity,
};
use cmdpal::kernel::CommandRegistry;

pub struct StdoutHost;

impl PaletteHost for StdoutHost {
    fn apply(&self, effect: HostEffect) -> BoxFuture<'_, Result<(), ExecutionError>> {
        Box::pin(async move {
            println!("host: {effect:?}");
            Ok(())
        })
    }
}

pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, notice: Notice) {
        println!("notice [{:?}]: {}", notice.kind, notice.message);
    }
}

/// Answers every confirmation the same way.
pub struct FixedConfirmer(pub bool);

impl Confirmer for FixedConfirmer {
    fn confirm(&self, request: ConfirmRequest) -> BoxFuture<'_, bool> {
        let answer = self.0;
        Box::pin(async move {
            println!(
                "confirm: {} ({}) -> {}",
                request.title,
                request.body,
                if answer { request.confirm_label.as_str() } else { "declined" }
            );
            answer
        })
    }
}

fn at(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").unwrap_or_default()
}

pub fn directory() -> DirectorySnapshot {
    let mut alice = UserEntity::new("100", "alice");
    alice.global_name = Some("Alice Liddell".to_string());
    let mut bob = UserEntity::new("101", "bob_the_builder");
    bob.nickname = Some("Bob".to_string());

    DirectorySnapshot {
        users: vec![alice, bob, UserEntity::new("102", "carol")],
        channels: vec![
            ChannelEntity::new("200", "general"),
            ChannelEntity::new("201", "release-notes"),
        ],
        extra_channels: vec![ChannelEntity::new("202", "off-topic")],
        guilds: vec![GuildEntity {
            id: "300".to_string(),
            name: "Rustaceans".to_string(),
        }],
        plugins: vec![PluginEntity {
            id: "spell-check".to_string(),
            name: "Spell Check".to_string(),
            enabled: true,
        }],
        settings_pages: vec![SettingsPageEntity {
            id: "appearance".to_string(),
            label: "Appearance".to_string(),
            route: "settings/appearance".to_string(),
        }],
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
            content: "Weekly sync in 10 minutes".to_string(),
            send_at: at("2030-01-07 09:50"),
        }],
        ..DirectorySnapshot::default()
    }
}

/// Commands for whichever channel is currently open.
pub struct ChannelToolsProvider {
    channel: String,
}

impl ChannelToolsProvider {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }
}

impl ContextProvider for ChannelToolsProvider {
    fn id(&self) -> &str {
        "channel-tools"
    }

    fn commands(&self) -> Vec<Command> {
        let channel = self.channel.clone();
        vec![Command::new("channel-tools-mute", format!("Mute #{channel}"))
            .in_category("channel-tools")
            .with_keywords(["silence", "notifications"])
            .with_handler(move |_| {
                let channel = channel.clone();
                async move {
                    println!("#{channel} muted");
                    Ok(())
                }
            })]
    }
}

pub fn register(registry: &mut CommandRegistry) {
    registry.register_category(
        Category::new("messaging", "Messaging").with_default_tags(["social"]),
    );
    registry.register_category(Category::new("notes", "Notes").with_weight(5));
    registry.register_category(
        Category::new("notes-advanced", "Advanced")
            .with_parent("notes")
            .with_default_tags(["notes"]),
    );

    registry.register_command(
        Command::new("toggle-theme", "Toggle Theme")
            .with_description("Switch between light and dark")
            .with_keywords(["dark", "light", "appearance"])
            .with_shortcut("meta+shift+t")
            .with_handler(|_| async {
                println!("theme toggled");
                Ok(())
            }),
    );
    registry.register_command(
        Command::new("send-dm", "Send DM")
            .in_category("messaging")
            .with_keywords(["whisper", "message"])
            .with_prompt("Message text")
            .with_handler(|invocation| async move {
                println!("dm sent: {}", invocation.argument.unwrap_or_default());
                Ok(())
            }),
    );
    registry.register_command(
        Command::new("create-poll", "Create Poll")
            .in_category("messaging")
            .with_page(PageSpec {
                title: "New poll".to_string(),
                fields: vec![
                    PageField::new("question", "Question").required(),
                    PageField::new("options", "Options"),
                ],
            })
            .with_handler(|invocation| async move {
                println!("poll created: {:?}", invocation.fields);
                Ok(())
            }),
    );
    registry.register_command(
        Command::new("notes", "Notes")
            .with_description("Browse note commands")
            .drilldown("notes"),
    );
    registry.register_command(
        Command::new("export-notes", "Export Notes")
            .in_category("notes")
            .with_actions(|_| {
                vec![ActionDefinition::secondary(
                    "export-markdown",
                    "Export as Markdown",
                    "markdown",
                    cmdpal::core::handler_fn(|_| async {
                        println!("notes exported as markdown");
                        Ok(())
                    }),
                )
                .with_shortcut("meta+m")]
            })
            .with_handler(|_| async {
                println!("notes exported");
                Ok(())
            }),
    );
    registry.register_command(
        Command::new("rebuild-index", "Rebuild Note Index")
            .in_category("notes-advanced")
            .hidden_in_search()
            .danger()
            .with_handler(|_| async { Err(ExecutionError::handler("index is locked")) }),
    );

    registry.register_context_provider(Box::new(ChannelToolsProvider::new("general")));
}
