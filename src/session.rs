//! Per-session user state: active language, sort criterion and theme.
//!
//! Restored from the persistent store with hard-coded defaults, and written
//! back on every change. A broken store only costs persistence.

use crate::cache::{KeyValueStore, PREF_LANGUAGE_KEY, PREF_SORT_KEY, PREF_THEME_KEY};
use crate::core::{Language, Theme};
use crate::ordering::SortCriterion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionContext {
    pub language: Language,
    pub criterion: SortCriterion,
    pub theme: Theme,
}

impl SessionContext {
    /// Restore preferences; missing, unreadable or unknown values use defaults
    pub fn restore(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();

        let language = read_pref(store, PREF_LANGUAGE_KEY)
            .and_then(|code| Language::from_code(&code))
            .unwrap_or(defaults.language);

        let criterion = read_pref(store, PREF_SORT_KEY)
            .map(|code| SortCriterion::from_code(&code))
            .unwrap_or(defaults.criterion);

        let theme = read_pref(store, PREF_THEME_KEY)
            .and_then(|code| Theme::from_code(&code))
            .unwrap_or(defaults.theme);

        Self {
            language,
            criterion,
            theme,
        }
    }

    pub fn set_language(&mut self, language: Language, store: &dyn KeyValueStore) {
        self.language = language;
        write_pref(store, PREF_LANGUAGE_KEY, language.code());
    }

    pub fn set_criterion(&mut self, criterion: SortCriterion, store: &dyn KeyValueStore) {
        self.criterion = criterion;
        write_pref(store, PREF_SORT_KEY, criterion.code());
    }

    pub fn set_theme(&mut self, theme: Theme, store: &dyn KeyValueStore) {
        self.theme = theme;
        write_pref(store, PREF_THEME_KEY, theme.code());
    }
}

fn read_pref(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("⚠️ Cannot read preference {}, using default: {}", key, e);
            None
        }
    }
}

fn write_pref(store: &dyn KeyValueStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        tracing::warn!("⚠️ Cannot persist preference {}={}: {}", key, value, e);
    }
}
