use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::{Language, Record};

/// Where a search result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// Blank query: the catalog in its existing order
    Unfiltered,
    /// Scored from scratch
    Computed,
    /// In-memory session tier
    MemoryCache,
    /// Persistent tier
    PersistentCache,
}

/// Search result with metadata
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Normalized query (empty for the unfiltered case)
    pub query: String,

    pub language: Language,

    /// Matching records, best first
    pub records: Vec<Arc<Record>>,

    pub source: ResultSource,

    /// Search latency in milliseconds
    pub latency_ms: f64,
}

impl SearchOutcome {
    /// Whether result came from either cache tier
    pub fn from_cache(&self) -> bool {
        matches!(
            self.source,
            ResultSource::MemoryCache | ResultSource::PersistentCache
        )
    }

    pub fn ids(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.id).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get display string for logging
    pub fn display(&self) -> String {
        format!(
            "'{}' [{}] -> {} records ({:?}, {:.2}ms)",
            self.query,
            self.language,
            self.records.len(),
            self.source,
            self.latency_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cache() {
        let mut outcome = SearchOutcome {
            query: "pika".to_string(),
            language: Language::En,
            records: vec![Arc::new(Record::new(25, "Pikachu"))],
            source: ResultSource::Computed,
            latency_ms: 0.4,
        };
        assert!(!outcome.from_cache());
        assert_eq!(outcome.ids(), vec![25]);

        outcome.source = ResultSource::PersistentCache;
        assert!(outcome.from_cache());
        assert!(outcome.display().contains("1 records"));
    }
}
