//! Minimal shape validation of dataset payloads.
//!
//! A payload must be a JSON array. Each element must be an object with a
//! positive integer `id`; what happens to elements with other malformed
//! fields is decided by [`InvalidRecordPolicy`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::core::{Record, StatBlock};
use crate::error::LoadFailure;

/// Fields validated into typed `Record` members; everything else is kept
/// verbatim in `Record::extra`.
const TYPED_FIELDS: &[&str] = &[
    "id",
    "name_en",
    "name_jp",
    "name_romaji",
    "types_en",
    "types_jp",
    "types_romaji",
    "abilities_en",
    "abilities_jp",
    "stats",
    "base_stat_total",
    "sprite",
    "bio_en",
    "bio_jp",
];

/// What to do with a record whose non-identity fields are malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidRecordPolicy {
    /// Skip the record (logged)
    #[default]
    Drop,
    /// Keep the record with malformed fields replaced by neutral defaults
    Coerce,
}

impl InvalidRecordPolicy {
    pub fn code(&self) -> &'static str {
        match self {
            InvalidRecordPolicy::Drop => "drop",
            InvalidRecordPolicy::Coerce => "coerce",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "drop" => Some(InvalidRecordPolicy::Drop),
            "coerce" | "keep" => Some(InvalidRecordPolicy::Coerce),
            _ => None,
        }
    }
}

/// Outcome of validating one payload
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Accepted records in source order
    pub records: Vec<Record>,
    /// Elements rejected (bad identity, duplicate id, or malformed under `Drop`)
    pub dropped: usize,
    /// Records kept with coerced fields (`Coerce` only)
    pub coerced: usize,
}

/// Validate a whole payload. Only a non-array payload fails the load.
pub fn validate_payload(
    payload: &Value,
    policy: InvalidRecordPolicy,
) -> Result<ValidationReport, LoadFailure> {
    let entries = payload.as_array().ok_or_else(|| {
        LoadFailure::Shape(format!("expected an array of records, got {}", value_kind(payload)))
    })?;

    let mut report = ValidationReport {
        records: Vec::with_capacity(entries.len()),
        ..Default::default()
    };
    let mut seen = HashSet::with_capacity(entries.len());

    for (position, entry) in entries.iter().enumerate() {
        match validate_record(entry, policy) {
            Ok((record, defects)) => {
                if !seen.insert(record.id) {
                    tracing::warn!("Dropping entry {}: duplicate id {}", position, record.id);
                    report.dropped += 1;
                    continue;
                }
                if !defects.is_empty() {
                    tracing::debug!(
                        "Coerced record {} fields: {}",
                        record.id,
                        defects.join(", ")
                    );
                    report.coerced += 1;
                }
                report.records.push(record);
            }
            Err(reason) => {
                tracing::warn!("Dropping entry {}: {}", position, reason);
                report.dropped += 1;
            }
        }
    }

    Ok(report)
}

/// Validate one element, returning the record and the names of coerced fields
fn validate_record(
    entry: &Value,
    policy: InvalidRecordPolicy,
) -> Result<(Record, Vec<&'static str>), String> {
    let obj = entry
        .as_object()
        .ok_or_else(|| format!("expected an object, got {}", value_kind(entry)))?;

    let id = obj
        .get("id")
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| "missing or invalid id".to_string())?;

    let mut defects = Vec::new();

    let name_en = match obj.get("name_en") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
        _ => {
            defects.push("name_en");
            String::new()
        }
    };

    let mut record = Record::new(id, name_en);
    record.name_jp = optional_string(obj, "name_jp", &mut defects);
    record.name_romaji = optional_string(obj, "name_romaji", &mut defects);
    record.types_en = string_list(obj, "types_en", &mut defects);
    record.types_jp = string_list(obj, "types_jp", &mut defects);
    record.types_romaji = string_list(obj, "types_romaji", &mut defects);
    record.abilities_en = string_list(obj, "abilities_en", &mut defects);
    record.abilities_jp = string_list(obj, "abilities_jp", &mut defects);
    record.stats = stat_block(obj, &mut defects);
    record.base_stat_total = optional_count(obj, "base_stat_total", &mut defects);
    record.sprite = optional_string(obj, "sprite", &mut defects);
    record.bio_en = optional_string(obj, "bio_en", &mut defects);
    record.bio_jp = optional_string(obj, "bio_jp", &mut defects);
    record.extra = obj
        .iter()
        .filter(|(key, _)| !TYPED_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if !defects.is_empty() && policy == InvalidRecordPolicy::Drop {
        return Err(format!("record {} has malformed fields: {}", id, defects.join(", ")));
    }

    Ok((record, defects))
}

fn optional_string(
    obj: &Map<String, Value>,
    field: &'static str,
    defects: &mut Vec<&'static str>,
) -> Option<String> {
    match obj.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            defects.push(field);
            None
        }
    }
}

fn optional_count(
    obj: &Map<String, Value>,
    field: &'static str,
    defects: &mut Vec<&'static str>,
) -> Option<u32> {
    match obj.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => {
            let parsed = value.as_u64().and_then(|v| u32::try_from(v).ok());
            if parsed.is_none() {
                defects.push(field);
            }
            parsed
        }
    }
}

fn string_list(
    obj: &Map<String, Value>,
    field: &'static str,
    defects: &mut Vec<&'static str>,
) -> Vec<String> {
    match obj.get(field) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let labels: Vec<String> = items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect();
            if labels.len() != items.len() {
                defects.push(field);
            }
            labels
        }
        Some(_) => {
            defects.push(field);
            Vec::new()
        }
    }
}

fn stat_block(obj: &Map<String, Value>, defects: &mut Vec<&'static str>) -> Option<StatBlock> {
    match obj.get("stats") {
        None | Some(Value::Null) => None,
        Some(Value::Object(stats)) => {
            let mut block = StatBlock::new();
            let mut malformed = false;
            for (name, value) in stats {
                let parsed = value.as_u64().and_then(|v| u32::try_from(v).ok());
                if parsed.is_none() {
                    malformed = true;
                }
                block.insert(name.clone(), parsed.unwrap_or(0));
            }
            if malformed {
                defects.push("stats");
            }
            Some(block)
        }
        Some(_) => {
            defects.push("stats");
            None
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
