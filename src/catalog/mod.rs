//! Catalog store - the immutable, in-memory dataset for the session.

pub mod store;
pub mod validate;

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::Record;

pub use store::CatalogStore;
pub use validate::{validate_payload, InvalidRecordPolicy, ValidationReport};

/// Ordered, immutable collection of records with an id index.
///
/// Insertion order equals source order and is the default ordering.
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<Arc<Record>>,
    index: HashMap<u32, usize>,
}

impl Catalog {
    /// Build a catalog; a record repeating an earlier id is skipped
    pub fn new(records: Vec<Record>) -> Self {
        let mut catalog = Self {
            records: Vec::with_capacity(records.len()),
            index: HashMap::with_capacity(records.len()),
        };

        for record in records {
            if catalog.index.contains_key(&record.id) {
                tracing::warn!("Skipping duplicate record id {}", record.id);
                continue;
            }
            catalog.index.insert(record.id, catalog.records.len());
            catalog.records.push(Arc::new(record));
        }

        catalog
    }

    /// All records in source order
    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    /// Exact-match lookup
    pub fn get(&self, id: u32) -> Option<&Arc<Record>> {
        self.index.get(&id).map(|&pos| &self.records[pos])
    }

    /// Resolve ids in order, silently dropping ids not in the catalog
    pub fn resolve(&self, ids: &[u32]) -> Vec<Arc<Record>> {
        ids.iter()
            .filter_map(|id| self.get(*id).cloned())
            .collect()
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
}
