use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};

/// Live tag metadata. `count` is the number of registered commands carrying
/// the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: CompactString,
    pub label: CompactString,
    pub count: usize,
}

/// `" Quick  Actions "` → `"quick-actions"`.
pub fn normalize_tag(raw: &str) -> CompactString {
    let mut out = CompactString::default();
    for word in raw.split_whitespace() {
        if !out.is_empty() {
            out.push('-');
        }
        for ch in word.chars() {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Declared tags followed by category defaults, de-duplicated by normalized
/// id. The first spelling seen wins.
pub fn merge_tags<'a>(
    declared: impl IntoIterator<Item = &'a String>,
    defaults: impl IntoIterator<Item = &'a String>,
) -> Vec<String> {
    let mut seen: FxHashSet<CompactString> = FxHashSet::default();
    let mut merged = Vec::new();
    for raw in declared.into_iter().chain(defaults) {
        let trimmed = raw.trim();
        let id = normalize_tag(trimmed);
        if id.is_empty() || !seen.insert(id) {
            continue;
        }
        merged.push(trimmed.to_string());
    }
    merged
}

#[derive(Debug, Default)]
pub struct TagIndex {
    tags: FxHashMap<CompactString, Tag>,
}

impl TagIndex {
    pub fn add(&mut self, tags: &[String]) {
        for raw in tags {
            let id = normalize_tag(raw);
            if id.is_empty() {
                continue;
            }
            self.tags
                .entry(id.clone())
                .or_insert_with(|| Tag {
                    id,
                    label: CompactString::from(raw.trim()),
                    count: 0,
                })
                .count += 1;
        }
    }

    pub fn remove(&mut self, tags: &[String]) {
        for raw in tags {
            let id = normalize_tag(raw);
            let Some(tag) = self.tags.get_mut(&id) else {
                continue;
            };
            tag.count = tag.count.saturating_sub(1);
            if tag.count == 0 {
                self.tags.remove(&id);
            }
        }
    }

    pub fn get(&self, raw: &str) -> Option<&Tag> {
        self.tags.get(&normalize_tag(raw))
    }

    /// Sorted by id.
    pub fn list(&self) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.id.cmp(&b.id));
        tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
