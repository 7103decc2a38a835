//! Fuzzy resolution of a query target against the host's live collections.
//!
//! Every resolver returns at least one candidate: a miss yields a single
//! [`CandidateKind::NoMatch`] row so the UI always has something to explain it.

use std::sync::OnceLock;

use compact_str::CompactString;
use regex::Regex;
use rustc_hash::FxHashSet;
use url::Url;

use crate::core::ValidationError;
use crate::kernel::services::ports::{
    ChannelEntity, EntityDirectory, GuildEntity, NoteEntity, NotebookEntity, PluginEntity,
    ScheduledMessageEntity, SettingsPageEntity, UserEntity,
};

pub const SCORE_EXACT: u32 = 100;
pub const SCORE_PREFIX: u32 = 75;
pub const SCORE_SUBSTRING: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    User,
    Channel,
    Guild,
    Plugin,
    SettingsPage,
    Notebook,
    Note,
    ScheduledMessage,
    Url,
    Create,
    TimeEntry,
    Confirm,
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: CompactString,
    pub label: String,
    pub score: u32,
    pub kind: CandidateKind,
    pub detail: Option<String>,
}

impl Candidate {
    pub fn new(
        id: impl Into<CompactString>,
        label: impl Into<String>,
        kind: CandidateKind,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            score: 0,
            kind,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn no_match(target: &str) -> Self {
        Self::new(
            "no-match",
            format!("No match for \"{}\"", target.trim()),
            CandidateKind::NoMatch,
        )
    }

    pub fn is_no_match(&self) -> bool {
        self.kind == CandidateKind::NoMatch
    }
}

fn non_alnum() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").ok()).as_ref()
}

/// Lowercase, non-alphanumerics collapsed to single spaces.
pub fn searchable_text(value: &str) -> String {
    let lowered = value.to_lowercase();
    match non_alnum() {
        Some(re) => re.replace_all(&lowered, " ").trim().to_string(),
        None => lowered.trim().to_string(),
    }
}

fn score_plain(query: &str, value: &str) -> u32 {
    if query.is_empty() || value.is_empty() {
        0
    } else if value == query {
        SCORE_EXACT
    } else if value.starts_with(query) {
        SCORE_PREFIX
    } else if value.contains(query) {
        SCORE_SUBSTRING
    } else {
        0
    }
}

/// Exact > prefix > substring, case-insensitive. The punctuation-insensitive
/// form is scored too and the better of the two wins.
pub fn score_target_match(query: &str, value: &str) -> u32 {
    let direct = score_plain(&query.trim().to_lowercase(), &value.trim().to_lowercase());
    let loose = score_plain(&searchable_text(query), &searchable_text(value));
    direct.max(loose)
}

/// `<@123>`, `<@!123>`, `<#123>` → `123`.
pub fn mention_id(target: &str) -> Option<&str> {
    let inner = target.trim().strip_prefix('<')?.strip_suffix('>')?;
    let id = inner
        .strip_prefix("@!")
        .or_else(|| inner.strip_prefix('@'))
        .or_else(|| inner.strip_prefix('#'))?;
    (!id.is_empty()).then_some(id)
}

trait Resolvable {
    const KIND: CandidateKind;

    fn id(&self) -> &str;
    fn label(&self) -> String;
    fn names(&self) -> Vec<&str>;
    fn detail(&self) -> Option<String> {
        None
    }
}

impl Resolvable for UserEntity {
    const KIND: CandidateKind = CandidateKind::User;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.display_name().to_string()
    }

    fn names(&self) -> Vec<&str> {
        let mut names = vec![self.username.as_str()];
        names.extend(self.global_name.as_deref());
        names.extend(self.nickname.as_deref());
        names.extend(self.tag.as_deref());
        names
    }

    fn detail(&self) -> Option<String> {
        Some(format!("@{}", self.username))
    }
}

impl Resolvable for ChannelEntity {
    const KIND: CandidateKind = CandidateKind::Channel;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        format!("#{}", self.name)
    }

    fn names(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}

impl Resolvable for GuildEntity {
    const KIND: CandidateKind = CandidateKind::Guild;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn names(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}

impl Resolvable for PluginEntity {
    const KIND: CandidateKind = CandidateKind::Plugin;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn names(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.id.as_str()]
    }

    fn detail(&self) -> Option<String> {
        Some(if self.enabled { "Enabled" } else { "Disabled" }.to_string())
    }
}

impl Resolvable for SettingsPageEntity {
    const KIND: CandidateKind = CandidateKind::SettingsPage;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn names(&self) -> Vec<&str> {
        vec![self.label.as_str(), self.route.as_str()]
    }
}

impl Resolvable for NotebookEntity {
    const KIND: CandidateKind = CandidateKind::Notebook;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn names(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}

impl Resolvable for NoteEntity {
    const KIND: CandidateKind = CandidateKind::Note;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.title.clone()
    }

    fn names(&self) -> Vec<&str> {
        vec![self.title.as_str()]
    }
}

impl Resolvable for ScheduledMessageEntity {
    const KIND: CandidateKind = CandidateKind::ScheduledMessage;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.content.clone()
    }

    fn names(&self) -> Vec<&str> {
        vec![self.content.as_str()]
    }

    fn detail(&self) -> Option<String> {
        Some(self.send_at.format("%Y-%m-%d %H:%M").to_string())
    }
}

fn candidate_for<T: Resolvable>(item: &T, score: u32) -> Candidate {
    let mut candidate = Candidate::new(item.id(), item.label(), T::KIND);
    candidate.score = score;
    candidate.detail = item.detail();
    candidate
}

pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn resolve<T: Resolvable>(target: &str, items: &[T]) -> Vec<Candidate> {
    let target = target.trim();
    let wanted_id = mention_id(target).unwrap_or(target);
    if let Some(item) = items.iter().find(|item| item.id() == wanted_id) {
        return vec![candidate_for(item, SCORE_EXACT)];
    }

    let mut candidates: Vec<Candidate> = if target.is_empty() {
        items.iter().map(|item| candidate_for(item, 0)).collect()
    } else {
        items
            .iter()
            .filter_map(|item| {
                let score = item
                    .names()
                    .into_iter()
                    .map(|name| score_target_match(target, name))
                    .max()
                    .unwrap_or(0);
                (score > 0).then(|| candidate_for(item, score))
            })
            .collect()
    };

    if candidates.is_empty() {
        return vec![Candidate::no_match(target)];
    }
    sort_candidates(&mut candidates);
    candidates
}

fn merge_by_id<T>(indexed: Vec<T>, walked: Vec<T>, id: impl Fn(&T) -> &str) -> Vec<T> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut merged = Vec::with_capacity(indexed.len() + walked.len());
    for item in indexed.into_iter().chain(walked) {
        if seen.insert(id(&item).to_string()) {
            merged.push(item);
        }
    }
    merged
}

pub fn all_channels(directory: &dyn EntityDirectory) -> Vec<ChannelEntity> {
    merge_by_id(
        directory.indexed_channels(),
        directory.walk_channels(),
        |channel| channel.id.as_str(),
    )
}

pub fn all_guilds(directory: &dyn EntityDirectory) -> Vec<GuildEntity> {
    merge_by_id(
        directory.indexed_guilds(),
        directory.walk_guilds(),
        |guild| guild.id.as_str(),
    )
}

pub fn resolve_users(directory: &dyn EntityDirectory, target: &str) -> Vec<Candidate> {
    resolve(target.trim().trim_start_matches('@'), &directory.users())
}

pub fn resolve_channels(directory: &dyn EntityDirectory, target: &str) -> Vec<Candidate> {
    let target = target.trim();
    let target = if target.starts_with("<#") {
        target
    } else {
        target.trim_start_matches('#')
    };
    resolve(target, &all_channels(directory))
}

pub fn resolve_guilds(directory: &dyn EntityDirectory, target: &str) -> Vec<Candidate> {
    resolve(target, &all_guilds(directory))
}

/// Channels and guilds in one list, for `go to`.
pub fn resolve_destinations(directory: &dyn EntityDirectory, target: &str) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = resolve_channels(directory, target)
        .into_iter()
        .chain(resolve_guilds(directory, target))
        .filter(|candidate| !candidate.is_no_match())
        .collect();
    if candidates.is_empty() {
        return vec![Candidate::no_match(target)];
    }
    sort_candidates(&mut candidates);
    candidates
}

/// Users and channels in one list, for plain sends.
pub fn resolve_recipients(directory: &dyn EntityDirectory, target: &str) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = resolve_users(directory, target)
        .into_iter()
        .chain(resolve_channels(directory, target))
        .filter(|candidate| !candidate.is_no_match())
        .collect();
    if candidates.is_empty() {
        return vec![Candidate::no_match(target)];
    }
    sort_candidates(&mut candidates);
    candidates
}

pub fn resolve_plugins(directory: &dyn EntityDirectory, target: &str) -> Vec<Candidate> {
    resolve(target, &directory.plugins())
}

pub fn resolve_settings_pages(directory: &dyn EntityDirectory, target: &str) -> Vec<Candidate> {
    resolve(target, &directory.settings_pages())
}

pub fn resolve_notebooks(directory: &dyn EntityDirectory, target: &str) -> Vec<Candidate> {
    resolve(target, &directory.notebooks())
}

pub fn resolve_notes(directory: &dyn EntityDirectory, target: &str) -> Vec<Candidate> {
    resolve(target, &directory.notes())
}

pub fn resolve_scheduled_messages(directory: &dyn EntityDirectory, target: &str) -> Vec<Candidate> {
    resolve(target, &directory.scheduled_messages())
}

/// Parses `target` as a URL; bare hosts get `https://`.
pub fn normalize_url(target: &str) -> Result<Url, ValidationError> {
    let trimmed = target.trim();
    let malformed = || ValidationError::MalformedUrl {
        url: trimmed.to_string(),
    };
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return Err(malformed());
    }

    let candidate = if trimmed.contains("://") || trimmed.starts_with("mailto:") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let parsed = Url::parse(&candidate).map_err(|_| malformed())?;
    if matches!(parsed.scheme(), "http" | "https") {
        let host_ok = parsed
            .host_str()
            .is_some_and(|host| host.contains('.') || host == "localhost");
        if !host_ok {
            return Err(malformed());
        }
    }
    Ok(parsed)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/resolvers.rs"]
mod tests;
