//! Multi-field fuzzy scoring.
//!
//! Each candidate field is scored on its own and a record scores as well as
//! its single best field:
//!
//! | match                        | score                                    |
//! |------------------------------|------------------------------------------|
//! | field == query               | 1000                                     |
//! | padded id contains query     | 950                                      |
//! | field starts with query      | 900 + 100/len                            |
//! | field contains query         | 700 + 100/len                            |
//! | query is a subsequence       | 500 (+100 at pos 0) - gap penalty + 100/len, floor 1 |
//!
//! Category labels are weighted by 0.5.

use std::borrow::Cow;

use crate::core::{Language, Record};
use crate::ranking::Ranker;

const EXACT_SCORE: f64 = 1000.0;
const ID_MATCH_SCORE: f64 = 950.0;
const PREFIX_SCORE: f64 = 900.0;
const SUBSTRING_SCORE: f64 = 700.0;
const SUBSEQUENCE_SCORE: f64 = 500.0;
const SUBSEQUENCE_START_BONUS: f64 = 100.0;
const GAP_PENALTY_PER_CHAR: f64 = 10.0;
const MAX_GAP_PENALTY: f64 = 200.0;
const LENGTH_BONUS: f64 = 100.0;
const LABEL_WEIGHT: f64 = 0.5;

/// Which searchable field a score came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Name in the active language (falls back to English)
    Name,
    /// Name in the other language
    OtherName,
    /// Romanized Japanese name
    Romaji,
    /// Category labels of both languages and their romanization, space-joined
    Labels,
    /// Zero-padded identifier
    Id,
}

/// Weighted score of one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldScore {
    pub kind: FieldKind,
    pub text: String,
    pub score: f64,
}

/// Score `field` against a normalized, non-empty `query`.
///
/// Returns 0 when the field does not match at all.
pub fn field_score(query: &str, field: &str) -> f64 {
    if query.is_empty() {
        return 0.0;
    }

    let field = field.to_lowercase();
    let field_len = field.chars().count();
    if field_len == 0 {
        return 0.0;
    }

    let length_bonus = LENGTH_BONUS / field_len as f64;

    if field == query {
        EXACT_SCORE
    } else if field.starts_with(query) {
        PREFIX_SCORE + length_bonus
    } else if field.contains(query) {
        SUBSTRING_SCORE + length_bonus
    } else {
        subsequence_score(query, &field, length_bonus)
    }
}

/// Greedy left-to-right subsequence walk
fn subsequence_score(query: &str, field: &str, length_bonus: f64) -> f64 {
    let mut positions: Vec<usize> = Vec::new();
    let mut field_chars = field.chars().enumerate();

    for qc in query.chars() {
        match field_chars.by_ref().find(|(_, fc)| *fc == qc) {
            Some((pos, _)) => positions.push(pos),
            None => return 0.0,
        }
    }

    let mut score = SUBSEQUENCE_SCORE;

    if positions.first() == Some(&0) {
        score += SUBSEQUENCE_START_BONUS;
    }

    if positions.len() > 1 {
        let total_gap: usize = positions.windows(2).map(|w| w[1] - w[0] - 1).sum();
        let average_gap = total_gap as f64 / (positions.len() - 1) as f64;
        score -= (GAP_PENALTY_PER_CHAR * average_gap).min(MAX_GAP_PENALTY);
    }

    (score + length_bonus).max(1.0)
}

/// Default ranker: best field score across names, labels and id
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyRanker;

impl FuzzyRanker {
    pub fn new() -> Self {
        Self
    }

    fn candidate_fields(record: &Record, language: Language) -> Vec<(FieldKind, Cow<'_, str>)> {
        let mut fields = vec![(FieldKind::Name, Cow::Borrowed(record.name(language)))];

        if let Some(other) = record.localized_name(language.other()) {
            fields.push((FieldKind::OtherName, Cow::Borrowed(other)));
        }

        if let Some(romaji) = record.name_romaji.as_deref().filter(|r| !r.is_empty()) {
            fields.push((FieldKind::Romaji, Cow::Borrowed(romaji)));
        }

        let labels: Vec<&str> = record
            .types_en
            .iter()
            .chain(record.types_jp.iter())
            .chain(record.types_romaji.iter())
            .map(String::as_str)
            .filter(|label| !label.is_empty())
            .collect();
        if !labels.is_empty() {
            fields.push((FieldKind::Labels, Cow::Owned(labels.join(" "))));
        }

        fields
    }

    /// Per-field weighted scores for one record (debug aid)
    pub fn explain(&self, query: &str, language: Language, record: &Record) -> Vec<FieldScore> {
        let query = super::normalize_query(query);

        let mut scores: Vec<FieldScore> = Self::candidate_fields(record, language)
            .into_iter()
            .map(|(kind, text)| {
                let raw = field_score(&query, &text);
                let score = if kind == FieldKind::Labels {
                    raw * LABEL_WEIGHT
                } else {
                    raw
                };
                FieldScore {
                    kind,
                    text: text.into_owned(),
                    score,
                }
            })
            .collect();

        let padded_id = record.padded_id();
        let id_score = if !query.is_empty() && padded_id.contains(query.as_str()) {
            ID_MATCH_SCORE
        } else {
            0.0
        };
        scores.push(FieldScore {
            kind: FieldKind::Id,
            text: padded_id,
            score: id_score,
        });

        scores
    }
}

impl Ranker for FuzzyRanker {
    fn score(&self, query: &str, language: Language, record: &Record) -> f64 {
        if query.is_empty() {
            return 0.0;
        }

        let best_field = Self::candidate_fields(record, language)
            .iter()
            .map(|(kind, text)| {
                let raw = field_score(query, text);
                if *kind == FieldKind::Labels {
                    raw * LABEL_WEIGHT
                } else {
                    raw
                }
            })
            .fold(0.0, f64::max);

        if record.padded_id().contains(query) {
            best_field.max(ID_MATCH_SCORE)
        } else {
            best_field
        }
    }

    fn name(&self) -> &str {
        "fuzzy"
    }
}
