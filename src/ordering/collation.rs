//! Locale string comparison used by the name criteria.
//!
//! Assumed rules for the default collator: Unicode NFC composition, then
//! full Unicode lower-casing (a superset of ASCII case folding), then code
//! point order. Strings equal under these rules compare `Equal`.

use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;

/// Injectable string comparison capability
pub trait Collator: Send + Sync {
    fn compare(&self, a: &str, b: &str) -> Ordering;

    /// Get collator name for logging
    fn name(&self) -> &str;
}

/// Case-insensitive, normalization-aware comparison (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseInsensitiveCollator;

impl Collator for CaseInsensitiveCollator {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        let a = a.nfc().flat_map(char::to_lowercase);
        let b = b.nfc().flat_map(char::to_lowercase);
        a.cmp(b)
    }

    fn name(&self) -> &str {
        "case-insensitive"
    }
}

/// Plain code point order, case-sensitive
#[derive(Debug, Clone, Copy, Default)]
pub struct OrdinalCollator;

impl Collator for OrdinalCollator {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        a.cmp(b)
    }

    fn name(&self) -> &str {
        "ordinal"
    }
}
