pub mod fuzzy;

use std::sync::Arc;

use crate::core::{Language, Record};

pub use fuzzy::{field_score, FieldKind, FieldScore, FuzzyRanker};

/// Trait for ranking implementations.
///
/// Ranking is total: every query/record pair gets a score, and a malformed
/// field simply scores 0 on that field.
pub trait Ranker: Send + Sync {
    /// Score one record against an already-normalized query
    fn score(&self, query: &str, language: Language, record: &Record) -> f64;

    /// Get ranker name for logging
    fn name(&self) -> &str;

    /// Rank records against query: records scoring 0 are dropped, the rest
    /// are sorted by score descending with ties broken by ascending id.
    fn rank(&self, query: &str, language: Language, records: &[Arc<Record>]) -> Vec<RankedRecord> {
        let query = normalize_query(query);
        if query.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<RankedRecord> = records
            .iter()
            .filter_map(|record| {
                let score = self.score(&query, language, record);
                (score > 0.0).then(|| RankedRecord::new(Arc::clone(record), score))
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.record.id.cmp(&b.record.id))
        });

        ranked
    }
}

/// Record with its transient match score
#[derive(Debug, Clone)]
pub struct RankedRecord {
    pub record: Arc<Record>,
    pub score: f64,
}

impl RankedRecord {
    pub fn new(record: Arc<Record>, score: f64) -> Self {
        Self { record, score }
    }
}

/// Trim and lower-case a query. An empty result means "no filter".
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}
