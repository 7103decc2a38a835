//! Service ports: traits + data contracts.

pub mod entities;
pub mod host;
pub mod notice;
pub mod settings;
pub mod storage;

pub use crate::core::BoxFuture;
pub use entities::{
    ChannelEntity, DirectorySnapshot, EntityDirectory, GuildEntity, NoteEntity, NotebookEntity,
    PluginEntity, ScheduledMessageEntity, SettingsPageEntity, UserEntity,
};
pub use host::{Destination, HostEffect, MessageTarget, PaletteHost};
pub use notice::{ConfirmRequest, Confirmer, Notice, NoticeKind, Notifier};
pub use settings::{PaletteSettings, RankingSettings};
pub use storage::{
    load_json, save_json, KeyValueStore, MemoryStore, CUSTOM_COMMANDS_KEY, PINNED_COMMANDS_KEY,
    RECENT_COMMANDS_KEY,
};
