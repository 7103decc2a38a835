//! Keyboard chord strings → canonical `modifier+key` form.
//!
//! Accepts words (`"Cmd+Enter"`), glyphs (`"⌘↵"`) or any mix of both, and
//! produces a de-duplicated, canonically ordered string such as `"meta+enter"`.

/// Canonical order: modifiers first, then named keys. Tokens outside this
/// list sort after it, lexicographically.
const CANONICAL_ORDER: &[&str] = &[
    "meta", "alt", "ctrl", "shift", "enter", "left", "right", "up", "down", "esc", "tab", "space",
];

const GLYPHS: &[(char, &str)] = &[
    ('⌘', "meta"),
    ('⌥', "alt"),
    ('⌃', "ctrl"),
    ('⇧', "shift"),
    ('↵', "enter"),
    ('⏎', "enter"),
    ('↩', "enter"),
    ('←', "left"),
    ('→', "right"),
    ('↑', "up"),
    ('↓', "down"),
    ('⎋', "esc"),
    ('⇥', "tab"),
    ('␣', "space"),
];

fn canonical_token(token: &str) -> String {
    let lc = token.to_lowercase();
    let mapped = match lc.as_str() {
        "meta" | "cmd" | "command" | "super" | "win" | "windows" | "mod" => "meta",
        "alt" | "option" | "opt" => "alt",
        "ctrl" | "control" | "ctl" => "ctrl",
        "shift" => "shift",
        "enter" | "return" | "ret" => "enter",
        "left" | "arrowleft" => "left",
        "right" | "arrowright" => "right",
        "up" | "arrowup" => "up",
        "down" | "arrowdown" => "down",
        "esc" | "escape" => "esc",
        "tab" => "tab",
        "space" | "spacebar" => "space",
        _ => return lc,
    };
    mapped.to_string()
}

fn expand_glyphs(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match GLYPHS.iter().find(|(glyph, _)| *glyph == ch) {
            Some((_, word)) => {
                out.push('+');
                out.push_str(word);
                out.push('+');
            }
            None => out.push(ch),
        }
    }
    out
}

fn order_rank(token: &str) -> usize {
    CANONICAL_ORDER
        .iter()
        .position(|known| *known == token)
        .unwrap_or(CANONICAL_ORDER.len())
}

/// Split a chord into canonical tokens, de-duplicated and sorted.
pub fn chord_tokens(value: &str) -> Vec<String> {
    let expanded = expand_glyphs(value);
    let mut tokens: Vec<String> = expanded
        .split(|c: char| c == '+' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(canonical_token)
        .collect();

    tokens.sort_by(|a, b| {
        order_rank(a)
            .cmp(&order_rank(b))
            .then_with(|| a.cmp(b))
    });
    tokens.dedup();
    tokens
}

/// Normalize a chord string. Idempotent and independent of input token order.
pub fn normalize_chord(value: &str) -> String {
    chord_tokens(value).join("+")
}

pub fn chords_equal(a: &str, b: &str) -> bool {
    let a = normalize_chord(a);
    !a.is_empty() && a == normalize_chord(b)
}

#[cfg(test)]
#[path = "../../tests/unit/core/chord.rs"]
mod tests;
