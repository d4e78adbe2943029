use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Named ordering rule selectable by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortCriterion {
    #[default]
    IdAsc,
    IdDesc,
    NameAsc,
    NameDesc,
    /// Aggregate stat total, highest first
    TotalDesc,
}

impl SortCriterion {
    pub const ALL: [SortCriterion; 5] = [
        SortCriterion::IdAsc,
        SortCriterion::IdDesc,
        SortCriterion::NameAsc,
        SortCriterion::NameDesc,
        SortCriterion::TotalDesc,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            SortCriterion::IdAsc => "id-asc",
            SortCriterion::IdDesc => "id-desc",
            SortCriterion::NameAsc => "name-asc",
            SortCriterion::NameDesc => "name-desc",
            SortCriterion::TotalDesc => "total-desc",
        }
    }

    /// Parse a criterion code. Unrecognized codes fall back to `IdAsc`.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "id-desc" => SortCriterion::IdDesc,
            "name-asc" => SortCriterion::NameAsc,
            "name-desc" => SortCriterion::NameDesc,
            "total-desc" | "stats-desc" => SortCriterion::TotalDesc,
            _ => SortCriterion::IdAsc,
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// Codes on the wire so unknown persisted values degrade instead of failing.
impl Serialize for SortCriterion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for SortCriterion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(SortCriterion::from_code(&code))
    }
}
