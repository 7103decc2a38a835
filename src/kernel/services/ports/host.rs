//! Everything the palette asks the host application to do.

use chrono::NaiveDateTime;

use crate::core::{BoxFuture, ExecutionError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTarget {
    User(String),
    Channel(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Channel(String),
    Guild(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEffect {
    SendMessage {
        target: MessageTarget,
        content: String,
        silent: bool,
        use_file_picker: bool,
    },
    OpenDm {
        user_id: String,
    },
    GoTo {
        destination: Destination,
    },
    OpenSettings {
        route: String,
    },
    TogglePlugin {
        plugin_id: String,
    },
    OpenUrl {
        url: String,
        external: bool,
    },
    CreateNotebook {
        name: String,
    },
    DeleteNotebook {
        notebook_id: String,
    },
    MoveNote {
        note_id: String,
        notebook_id: String,
    },
    JumpToNote {
        note_id: String,
    },
    ScheduleMessage {
        channel_id: String,
        content: String,
        send_at: NaiveDateTime,
    },
    RescheduleMessage {
        message_id: String,
        send_at: NaiveDateTime,
    },
    SendScheduledNow {
        message_id: String,
    },
    CancelScheduledMessage {
        message_id: String,
    },
    CopyText(String),
}

pub trait PaletteHost: Send + Sync {
    fn apply(&self, effect: HostEffect) -> BoxFuture<'_, Result<(), ExecutionError>>;
}
