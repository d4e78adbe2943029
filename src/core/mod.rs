pub mod language;
pub mod record;
pub mod search_outcome;

pub use language::{Language, Theme};
pub use record::{Record, StatBlock};
pub use search_outcome::{ResultSource, SearchOutcome};
