//! Free-text query parsing.
//!
//! A fixed, ordered table of literal prefixes; the first match wins and
//! consumes its prefix. Input with no matching prefix is not a query intent
//! and falls through to ranked command search.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryIntent {
    SendMessage,
    SendChannel,
    OpenDm,
    GoTo,
    OpenSettings,
    TogglePlugin,
    OpenUrl,
    CreateNotebook,
    DeleteNotebook,
    MoveNote,
    JumpNote,
    ScheduleMessage,
    RescheduleMessage,
    SendScheduledNow,
    CancelScheduledMessage,
}

impl QueryIntent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SendMessage => "send_message",
            Self::SendChannel => "send_channel",
            Self::OpenDm => "open_dm",
            Self::GoTo => "go_to",
            Self::OpenSettings => "open_settings",
            Self::TogglePlugin => "toggle_plugin",
            Self::OpenUrl => "open_url",
            Self::CreateNotebook => "create_notebook",
            Self::DeleteNotebook => "delete_notebook",
            Self::MoveNote => "move_note",
            Self::JumpNote => "jump_note",
            Self::ScheduleMessage => "schedule_message",
            Self::RescheduleMessage => "reschedule_message",
            Self::SendScheduledNow => "send_scheduled_now",
            Self::CancelScheduledMessage => "cancel_scheduled_message",
        }
    }

    /// Intents that carry message content after the target.
    pub fn carries_content(self) -> bool {
        matches!(
            self,
            Self::SendMessage | Self::SendChannel | Self::ScheduleMessage
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    /// Whole remainder is the target.
    Target,
    /// `target: content` or `target content`, with inline flags.
    Send,
    /// `target <when> content`.
    Schedule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPattern {
    pub prefix: &'static str,
    pub intent: QueryIntent,
    pub shape: QueryShape,
}

const fn pattern(prefix: &'static str, intent: QueryIntent, shape: QueryShape) -> QueryPattern {
    QueryPattern {
        prefix,
        intent,
        shape,
    }
}

pub const QUERY_PATTERNS: &[QueryPattern] = &[
    pattern("send to ", QueryIntent::SendChannel, QueryShape::Send),
    pattern("send now ", QueryIntent::SendScheduledNow, QueryShape::Target),
    pattern(
        "cancel scheduled ",
        QueryIntent::CancelScheduledMessage,
        QueryShape::Target,
    ),
    pattern(
        "reschedule ",
        QueryIntent::RescheduleMessage,
        QueryShape::Target,
    ),
    pattern("schedule ", QueryIntent::ScheduleMessage, QueryShape::Schedule),
    pattern("message ", QueryIntent::SendMessage, QueryShape::Send),
    pattern("tell ", QueryIntent::SendMessage, QueryShape::Send),
    pattern("dm ", QueryIntent::SendMessage, QueryShape::Send),
    pattern("send ", QueryIntent::SendMessage, QueryShape::Send),
    pattern("open dm ", QueryIntent::OpenDm, QueryShape::Target),
    pattern("go to ", QueryIntent::GoTo, QueryShape::Target),
    pattern("open settings ", QueryIntent::OpenSettings, QueryShape::Target),
    pattern("toggle plugin ", QueryIntent::TogglePlugin, QueryShape::Target),
    pattern("open url ", QueryIntent::OpenUrl, QueryShape::Target),
    pattern(
        "create notebook ",
        QueryIntent::CreateNotebook,
        QueryShape::Target,
    ),
    pattern(
        "delete notebook ",
        QueryIntent::DeleteNotebook,
        QueryShape::Target,
    ),
    pattern("move note ", QueryIntent::MoveNote, QueryShape::Target),
    pattern("jump to note ", QueryIntent::JumpNote, QueryShape::Target),
];

pub const FILE_PICKER_FLAG: &str = "[file]";
pub const SILENT_FLAG: &str = "--silent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub raw: String,
    pub intent: QueryIntent,
    pub target: String,
    pub content: Option<String>,
    /// Unparsed send time, `schedule` only.
    pub when: Option<String>,
    pub use_file_picker: bool,
    pub silent: bool,
}

pub fn parse_query(input: &str) -> Option<ParsedQuery> {
    let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let (pattern, rest) = QUERY_PATTERNS.iter().find_map(|pattern| {
        strip_prefix_ignore_case(&normalized, pattern.prefix).map(|rest| (pattern, rest))
    })?;

    let mut parsed = ParsedQuery {
        raw: input.to_string(),
        intent: pattern.intent,
        target: String::new(),
        content: None,
        when: None,
        use_file_picker: false,
        silent: false,
    };

    match pattern.shape {
        QueryShape::Target => parsed.target = rest.trim().to_string(),
        QueryShape::Send => {
            let text = extract_flags(rest, &mut parsed);
            let (target, content) = split_target_content(&text);
            parsed.target = target;
            parsed.content = content;
        }
        QueryShape::Schedule => {
            let text = extract_flags(rest, &mut parsed);
            split_schedule(&text, &mut parsed);
        }
    }

    if parsed.target.is_empty() {
        return None;
    }
    Some(parsed)
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

fn extract_flags(rest: &str, parsed: &mut ParsedQuery) -> String {
    rest.split(' ')
        .filter(|token| {
            if token.eq_ignore_ascii_case(FILE_PICKER_FLAG) {
                parsed.use_file_picker = true;
                false
            } else if token.eq_ignore_ascii_case(SILENT_FLAG) {
                parsed.silent = true;
                false
            } else {
                !token.is_empty()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn split_target_content(text: &str) -> (String, Option<String>) {
    if let Some((target, content)) = text.split_once(':') {
        return (target.trim().to_string(), non_empty(content));
    }
    match text.split_once(' ') {
        Some((target, content)) => (target.to_string(), non_empty(content)),
        None => (text.trim().to_string(), None),
    }
}

fn looks_like_date(token: &str) -> bool {
    let parts: Vec<&str> = token.split('-').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

fn split_schedule(text: &str, parsed: &mut ParsedQuery) {
    let tokens: Vec<&str> = text.split(' ').filter(|token| !token.is_empty()).collect();
    let Some((target, rest)) = tokens.split_first() else {
        return;
    };
    parsed.target = target.to_string();

    let when_len = match rest {
        [first, _, ..] if first.eq_ignore_ascii_case("in") => 2,
        [first, _, ..] if looks_like_date(first) => 2,
        [_, ..] => 1,
        [] => 0,
    };
    if when_len > 0 {
        parsed.when = Some(rest[..when_len].join(" "));
    }
    parsed.content = non_empty(&rest[when_len..].join(" "));
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/query.rs"]
mod tests;
