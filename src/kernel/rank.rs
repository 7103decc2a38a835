//! Multi-signal command ranking.
//!
//! All components are additive. Items with no textual relevance to a non-empty
//! query are dropped; pinned/recency/category bonuses only reorder relevant
//! items. Ties break on label, then id.

use std::cmp::Ordering;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use unicode_segmentation::UnicodeSegmentation;

pub const LABEL_EXACT: i64 = 250;
pub const LABEL_PREFIX: i64 = 170;
pub const LABEL_SUBSTRING: i64 = 110;
pub const ID_EXACT: i64 = 220;
pub const ID_PREFIX: i64 = 140;
pub const ID_SUBSTRING: i64 = 85;
pub const KEYWORD_EXACT: i64 = 140;
pub const KEYWORD_PREFIX: i64 = 100;
pub const DESCRIPTION_SUBSTRING: i64 = 60;
pub const ACRONYM: i64 = 95;
pub const TOKEN_MATCH: i64 = 22;
pub const SYNONYM_HIT: i64 = 18;
pub const INTENT_HINT: i64 = 5;
pub const PINNED: i64 = 36;
pub const RECENCY_MAX: i64 = 30;
pub const RECENCY_STEP: i64 = 4;

const SYNONYMS: &[(&str, &[&str])] = &[
    ("open", &["show", "view", "launch", "go"]),
    ("close", &["hide", "dismiss", "exit"]),
    ("delete", &["remove", "trash", "erase"]),
    ("new", &["create", "add", "make"]),
    ("send", &["message", "dm", "tell", "write"]),
    ("settings", &["preferences", "options", "config"]),
    ("search", &["find", "lookup"]),
    ("mute", &["silence", "quiet"]),
    ("copy", &["duplicate", "clone"]),
];

const INTENT_HINTS: &[&[&str]] = &[
    &["send", "message", "dm", "tell", "chat", "reply"],
    &["go", "open", "jump", "switch", "navigate"],
    &["settings", "preferences", "options", "toggle", "plugin"],
    &["note", "notes", "notebook", "move"],
    &["schedule", "scheduled", "reschedule", "later", "time"],
];

#[derive(Debug, Clone, Default)]
pub struct RankItem {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    /// Precomputed search text; tokens from it join the token bag.
    pub search_text: Option<Arc<str>>,
    /// 0 = most recent.
    pub recent_rank: Option<usize>,
    pub pinned: bool,
    pub category_weight: i64,
}

impl RankItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ranked {
    pub item: RankItem,
    pub score: i64,
}

fn words(value: &str) -> impl Iterator<Item = String> + '_ {
    value.unicode_words().map(str::to_lowercase)
}

fn token_bag(item: &RankItem) -> FxHashSet<String> {
    let mut bag: FxHashSet<String> = FxHashSet::default();
    bag.extend(words(&item.label));
    bag.extend(words(&item.id.replace(['-', '_', '.'], " ")));
    if let Some(description) = item.description.as_deref() {
        bag.extend(words(description));
    }
    for keyword in &item.keywords {
        bag.extend(words(keyword));
    }
    if let Some(text) = item.search_text.as_deref() {
        bag.extend(words(text));
    }
    bag
}

fn tiered(query: &str, value: &str, exact: i64, prefix: i64, substring: i64) -> i64 {
    if value == query {
        exact
    } else if value.starts_with(query) {
        prefix
    } else if value.contains(query) {
        substring
    } else {
        0
    }
}

fn acronym(label: &str) -> String {
    label
        .unicode_words()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_lowercase)
        .collect()
}

fn synonyms_of(token: &str) -> impl Iterator<Item = &'static str> + '_ {
    SYNONYMS.iter().flat_map(move |(head, alts)| {
        let hit = *head == token || alts.iter().any(|alt| *alt == token);
        std::iter::once(*head)
            .chain(alts.iter().copied())
            .filter(move |word| hit && *word != token)
    })
}

/// Textual relevance only; 0 means the item does not match.
fn relevance(query: &str, query_tokens: &[String], item: &RankItem) -> i64 {
    let label = item.label.to_lowercase();
    let id = item.id.to_lowercase();
    let mut score = 0;

    score += tiered(query, &label, LABEL_EXACT, LABEL_PREFIX, LABEL_SUBSTRING);
    score += tiered(query, &id, ID_EXACT, ID_PREFIX, ID_SUBSTRING);

    score += item
        .keywords
        .iter()
        .map(|keyword| {
            let keyword = keyword.to_lowercase();
            if keyword == query {
                KEYWORD_EXACT
            } else if keyword.starts_with(query) {
                KEYWORD_PREFIX
            } else {
                0
            }
        })
        .max()
        .unwrap_or(0);

    if item
        .description
        .as_deref()
        .is_some_and(|description| description.to_lowercase().contains(query))
    {
        score += DESCRIPTION_SUBSTRING;
    }

    let compact_query: String = query.chars().filter(|c| !c.is_whitespace()).collect();
    if compact_query.chars().count() >= 2 && acronym(&item.label).starts_with(&compact_query) {
        score += ACRONYM;
    }

    let bag = token_bag(item);
    for token in query_tokens {
        if bag.iter().any(|word| word.starts_with(token.as_str())) {
            score += TOKEN_MATCH;
        }
    }

    let mut synonym_hits: FxHashSet<&'static str> = FxHashSet::default();
    for token in query_tokens {
        for synonym in synonyms_of(token) {
            if bag.contains(synonym) {
                synonym_hits.insert(synonym);
            }
        }
    }
    score += SYNONYM_HIT * synonym_hits.len() as i64;

    for group in INTENT_HINTS {
        if !query_tokens
            .iter()
            .any(|token| group.iter().any(|hint| *hint == token.as_str()))
        {
            continue;
        }
        let aligned = group.iter().filter(|hint| bag.contains(**hint)).count() as i64;
        if aligned >= 2 {
            score += INTENT_HINT * aligned;
        }
    }

    score
}

fn bonuses(item: &RankItem) -> i64 {
    let mut score = item.category_weight;
    if item.pinned {
        score += PINNED;
    }
    if let Some(rank) = item.recent_rank {
        let rank = i64::try_from(rank).unwrap_or(i64::MAX / RECENCY_STEP);
        score += (RECENCY_MAX - RECENCY_STEP * rank).max(0);
    }
    score
}

/// Score for a trimmed, lowercased query. 0 when irrelevant.
pub fn score_item(query: &str, item: &RankItem) -> i64 {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return 0;
    }
    let tokens: Vec<String> = words(&query).collect();
    match relevance(&query, &tokens, item) {
        0 => 0,
        relevance => relevance + bonuses(item),
    }
}

fn compare(a: &Ranked, b: &Ranked) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.item.label.cmp(&b.item.label))
        .then_with(|| a.item.id.cmp(&b.item.id))
}

/// Empty query: every item, input order, score 0.
pub fn rank_items(query: &str, items: Vec<RankItem>) -> Vec<Ranked> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return items
            .into_iter()
            .map(|item| Ranked { item, score: 0 })
            .collect();
    }

    let tokens: Vec<String> = words(&query).collect();
    let mut ranked: Vec<Ranked> = items
        .into_iter()
        .filter_map(|item| match relevance(&query, &tokens, &item) {
            0 => None,
            relevance => {
                let score = relevance + bonuses(&item);
                Some(Ranked { item, score })
            }
        })
        .collect();
    ranked.sort_by(compare);
    ranked
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/rank.rs"]
mod tests;
