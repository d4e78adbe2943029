pub mod collation;
pub mod criterion;

use std::cmp::Ordering;
use std::sync::Arc;

use crate::core::{Language, Record};

pub use collation::{CaseInsensitiveCollator, Collator, OrdinalCollator};
pub use criterion::SortCriterion;

/// Orders record sequences by a criterion.
///
/// Every comparator ends with an ascending-id tie-break, so each criterion
/// is a total order and sorting is idempotent.
#[derive(Clone)]
pub struct Sorter {
    collator: Arc<dyn Collator>,
}

impl Sorter {
    pub fn new(collator: Arc<dyn Collator>) -> Self {
        Self { collator }
    }

    pub fn collator_name(&self) -> &str {
        self.collator.name()
    }

    /// Return a new, sorted sequence; the input is left untouched
    pub fn sort(
        &self,
        records: &[Arc<Record>],
        criterion: SortCriterion,
        language: Language,
    ) -> Vec<Arc<Record>> {
        let mut sorted = records.to_vec();
        sorted.sort_by(|a, b| self.compare(a, b, criterion, language));
        sorted
    }

    pub fn compare(
        &self,
        a: &Record,
        b: &Record,
        criterion: SortCriterion,
        language: Language,
    ) -> Ordering {
        let by_id = a.id.cmp(&b.id);

        match criterion {
            SortCriterion::IdAsc => by_id,
            SortCriterion::IdDesc => by_id.reverse(),
            SortCriterion::NameAsc => self
                .collator
                .compare(a.name(language), b.name(language))
                .then(by_id),
            SortCriterion::NameDesc => self
                .collator
                .compare(b.name(language), a.name(language))
                .then(by_id),
            SortCriterion::TotalDesc => b.stat_total().cmp(&a.stat_total()).then(by_id),
        }
    }
}

impl Default for Sorter {
    fn default() -> Self {
        Self::new(Arc::new(CaseInsensitiveCollator))
    }
}
