use serde::{Deserialize, Serialize};
use std::fmt;

/// Display language. Selects which localized name/label fields are consulted
/// and is part of every ranking cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (default; every record carries an English name)
    #[default]
    En,
    /// Japanese
    Jp,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Jp];

    /// Short code used in cache keys and persisted preferences
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Jp => "jp",
        }
    }

    /// Parse a language code. `ja` is accepted as an alias for `jp`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "jp" | "ja" => Some(Language::Jp),
            _ => None,
        }
    }

    /// Parse a language code, falling back to the default language
    pub fn from_code_or_default(code: &str) -> Self {
        Self::from_code(code).unwrap_or_default()
    }

    /// The other supported language
    pub fn other(&self) -> Self {
        match self {
            Language::En => Language::Jp,
            Language::Jp => Language::En,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Color theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn code(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
