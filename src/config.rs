use std::time::Duration;

use crate::catalog::InvalidRecordPolicy;

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Dataset location: a file path or an http(s) URL
    pub data_location: String,
    /// SQLite file for the persistent tier (`:memory:` for none on disk)
    pub db_path: String,
    pub invalid_records: InvalidRecordPolicy,
    /// Store the validated dataset and restore it on later loads
    pub persist_dataset: bool,
    pub http_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_location: "pokedex_data.json".to_string(),
            db_path: "pokedex.db".to_string(),
            invalid_records: InvalidRecordPolicy::Drop,
            persist_dataset: true,
            http_timeout_secs: 10,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `POKEDEX_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    /// Malformed values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(data) = lookup("POKEDEX_DATA").filter(|v| !v.trim().is_empty()) {
            config.data_location = data;
        }

        if let Some(db) = lookup("POKEDEX_DB_PATH").filter(|v| !v.trim().is_empty()) {
            config.db_path = db;
        }

        if let Some(raw) = lookup("POKEDEX_INVALID_RECORDS") {
            match InvalidRecordPolicy::from_code(&raw) {
                Some(policy) => config.invalid_records = policy,
                None => tracing::warn!("⚠️ Ignoring POKEDEX_INVALID_RECORDS={}", raw),
            }
        }

        if let Some(raw) = lookup("POKEDEX_PERSIST_DATASET") {
            match parse_bool(&raw) {
                Some(persist) => config.persist_dataset = persist,
                None => tracing::warn!("⚠️ Ignoring POKEDEX_PERSIST_DATASET={}", raw),
            }
        }

        if let Some(raw) = lookup("POKEDEX_HTTP_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.http_timeout_secs = secs,
                _ => tracing::warn!("⚠️ Ignoring POKEDEX_HTTP_TIMEOUT_SECS={}", raw),
            }
        }

        config
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
