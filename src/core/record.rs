use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::core::Language;

/// Stat name -> base value (hp, attack, defense, special-attack, ...)
pub type StatBlock = BTreeMap<String, u32>;

/// One catalog entry with localized fields and base stats.
///
/// Field names follow the dataset wire format, so a serialized `Record` can
/// be fed back through catalog validation unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    /// Unique, stable, positive identifier
    pub id: u32,

    /// English name (default language, required)
    pub name_en: String,

    /// Japanese name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_jp: Option<String>,

    /// Romanized Japanese name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_romaji: Option<String>,

    /// Category labels (types), English
    #[serde(default)]
    pub types_en: Vec<String>,

    /// Category labels (types), Japanese
    #[serde(default)]
    pub types_jp: Vec<String>,

    /// Romanized Japanese labels
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types_romaji: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub abilities_en: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub abilities_jp: Vec<String>,

    /// Base stats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatBlock>,

    /// Precomputed stat sum carried by some datasets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_stat_total: Option<u32>,

    /// Sprite image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio_en: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio_jp: Option<String>,

    /// Display-only fields kept verbatim (moves, evolution_chain, weaknesses, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Create a new Record with required fields
    pub fn new(id: u32, name_en: impl Into<String>) -> Self {
        Self {
            id,
            name_en: name_en.into(),
            name_jp: None,
            name_romaji: None,
            types_en: Vec::new(),
            types_jp: Vec::new(),
            types_romaji: Vec::new(),
            abilities_en: Vec::new(),
            abilities_jp: Vec::new(),
            stats: None,
            base_stat_total: None,
            sprite: None,
            bio_en: None,
            bio_jp: None,
            extra: Map::new(),
        }
    }

    pub fn with_name_jp(mut self, name_jp: impl Into<String>) -> Self {
        self.name_jp = Some(name_jp.into());
        self
    }

    pub fn with_types(mut self, types_en: &[&str], types_jp: &[&str]) -> Self {
        self.types_en = types_en.iter().map(|t| t.to_string()).collect();
        self.types_jp = types_jp.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_stats(mut self, stats: &[(&str, u32)]) -> Self {
        self.stats = Some(stats.iter().map(|(k, v)| (k.to_string(), *v)).collect());
        self
    }

    /// Name for `language` exactly as stored (no fallback)
    pub fn localized_name(&self, language: Language) -> Option<&str> {
        let name = match language {
            Language::En => Some(self.name_en.as_str()),
            Language::Jp => self.name_jp.as_deref(),
        };
        name.filter(|n| !n.is_empty())
    }

    /// Name for `language`, falling back to the English name
    pub fn name(&self, language: Language) -> &str {
        self.localized_name(language).unwrap_or(&self.name_en)
    }

    /// Category labels for `language`
    pub fn labels(&self, language: Language) -> &[String] {
        match language {
            Language::En => &self.types_en,
            Language::Jp => &self.types_jp,
        }
    }

    pub fn abilities(&self, language: Language) -> &[String] {
        match language {
            Language::En => &self.abilities_en,
            Language::Jp => &self.abilities_jp,
        }
    }

    pub fn bio(&self, language: Language) -> Option<&str> {
        match language {
            Language::En => self.bio_en.as_deref(),
            Language::Jp => self.bio_jp.as_deref(),
        }
    }

    /// Sum of all stat values. Without a stat block, the dataset's
    /// `base_stat_total` if any, else 0.
    pub fn stat_total(&self) -> u64 {
        match &self.stats {
            Some(stats) => stats.values().map(|v| u64::from(*v)).sum(),
            None => self.base_stat_total.map(u64::from).unwrap_or(0),
        }
    }

    /// Identifier zero-padded to at least 3 digits ("025")
    pub fn padded_id(&self) -> String {
        format!("{:03}", self.id)
    }

    /// Get display name (for logging/UI), e.g. "#025 Pikachu"
    pub fn display_name(&self, language: Language) -> String {
        format!("#{} {}", self.padded_id(), self.name(language))
    }
}
