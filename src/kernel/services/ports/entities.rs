//! Read-only snapshots of the host's live collections.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntity {
    pub id: String,
    pub username: String,
    pub global_name: Option<String>,
    pub nickname: Option<String>,
    pub tag: Option<String>,
}

impl UserEntity {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            global_name: None,
            nickname: None,
            tag: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .or(self.global_name.as_deref())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntity {
    pub id: String,
    pub name: String,
    pub guild_id: Option<String>,
}

impl ChannelEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            guild_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildEntity {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginEntity {
    pub id: String,
    pub name: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPageEntity {
    pub id: String,
    pub label: String,
    pub route: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookEntity {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntity {
    pub id: String,
    pub title: String,
    pub notebook_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledMessageEntity {
    pub id: String,
    pub channel_id: String,
    pub content: String,
    pub send_at: NaiveDateTime,
}

/// Entity lookups used by the resolvers. Implementations hold fully loaded
/// in-memory snapshots; nothing here suspends.
///
/// Channels and guilds come from two sources: an indexed lookup and a raw walk
/// of the underlying store. Neither is guaranteed complete on its own.
pub trait EntityDirectory: Send + Sync {
    fn users(&self) -> Vec<UserEntity>;
    fn indexed_channels(&self) -> Vec<ChannelEntity>;
    fn walk_channels(&self) -> Vec<ChannelEntity> {
        Vec::new()
    }
    fn indexed_guilds(&self) -> Vec<GuildEntity>;
    fn walk_guilds(&self) -> Vec<GuildEntity> {
        Vec::new()
    }
    fn plugins(&self) -> Vec<PluginEntity>;
    fn settings_pages(&self) -> Vec<SettingsPageEntity>;
    fn notebooks(&self) -> Vec<NotebookEntity>;
    fn notes(&self) -> Vec<NoteEntity>;
    fn scheduled_messages(&self) -> Vec<ScheduledMessageEntity>;
}

/// Plain owned snapshot; handy for tests and the demo binary.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    pub users: Vec<UserEntity>,
    pub channels: Vec<ChannelEntity>,
    pub extra_channels: Vec<ChannelEntity>,
    pub guilds: Vec<GuildEntity>,
    pub extra_guilds: Vec<GuildEntity>,
    pub plugins: Vec<PluginEntity>,
    pub settings_pages: Vec<SettingsPageEntity>,
    pub notebooks: Vec<NotebookEntity>,
    pub notes: Vec<NoteEntity>,
    pub scheduled: Vec<ScheduledMessageEntity>,
}

impl EntityDirectory for DirectorySnapshot {
    fn users(&self) -> Vec<UserEntity> {
        self.users.clone()
    }

    fn indexed_channels(&self) -> Vec<ChannelEntity> {
        self.channels.clone()
    }

    fn walk_channels(&self) -> Vec<ChannelEntity> {
        self.extra_channels.clone()
    }

    fn indexed_guilds(&self) -> Vec<GuildEntity> {
        self.guilds.clone()
    }

    fn walk_guilds(&self) -> Vec<GuildEntity> {
        self.extra_guilds.clone()
    }

    fn plugins(&self) -> Vec<PluginEntity> {
        self.plugins.clone()
    }

    fn settings_pages(&self) -> Vec<SettingsPageEntity> {
        self.settings_pages.clone()
    }

    fn notebooks(&self) -> Vec<NotebookEntity> {
        self.notebooks.clone()
    }

    fn notes(&self) -> Vec<NoteEntity> {
        self.notes.clone()
    }

    fn scheduled_messages(&self) -> Vec<ScheduledMessageEntity> {
        self.scheduled.clone()
    }
}
