use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RECENT_LIMIT: usize = 10;
pub const DEFAULT_PIN_TOGGLE_CHORD: &str = "meta+shift+p";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteSettings {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default = "default_pin_toggle_chord")]
    pub pin_toggle_chord: String,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default = "default_storage_file")]
    pub storage_file: String,
    #[serde(default)]
    pub ranking: RankingSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingSettings {
    /// Extra score per category id, added on top of the category's own weight.
    #[serde(default, skip_serializing_if = "FxHashMap::is_empty")]
    pub category_weights: FxHashMap<String, i64>,
}

fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

fn default_pin_toggle_chord() -> String {
    DEFAULT_PIN_TOGGLE_CHORD.to_string()
}

fn default_log_filter() -> String {
    "cmdpal=info".to_string()
}

fn default_storage_file() -> String {
    "state.json".to_string()
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            pin_toggle_chord: default_pin_toggle_chord(),
            log_filter: default_log_filter(),
            storage_file: default_storage_file(),
            ranking: RankingSettings::default(),
        }
    }
}

impl PaletteSettings {
    pub fn category_weight(&self, category_id: &str) -> i64 {
        self.ranking
            .category_weights
            .get(category_id)
            .copied()
            .unwrap_or(0)
    }
}
