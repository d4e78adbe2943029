//! # Pokedex Engine
//!
//! Ranking and ordering engine for a bilingual creature catalog:
//! - Fuzzy multi-field search (names, romaji, type labels, padded id)
//! - Two-tier ranking cache (in-memory + SQLite)
//! - Multi-criterion sorting with an injectable name collator
//! - Coalesced catalog loading from a file, an HTTP endpoint or memory
//! - Session preferences (language, sort, theme) persisted across runs
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pokedex_engine::{EngineConfig, Language, PokedexEngine, SortCriterion};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = PokedexEngine::from_config(&EngineConfig::from_env())?;
//!
//!     let found = engine.search("pika", Language::En).await?;
//!     for record in engine.sort(&found, SortCriterion::NameAsc, Language::En) {
//!         println!("{}", record.display_name(Language::En));
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod catalog;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod ordering;
pub mod ranking;
pub mod session;
pub mod source;

// Re-export primary types
pub use cache::{CacheStats, KeyValueStore, MemoryStore, RankingCache, SqliteStore};
pub use catalog::{Catalog, CatalogStore, InvalidRecordPolicy};
pub use config::EngineConfig;
pub use core::{Language, Record, ResultSource, SearchOutcome, StatBlock, Theme};
pub use engine::PokedexEngine;
pub use error::{LoadFailure, PokedexError, Result, StoreError};
pub use ordering::{CaseInsensitiveCollator, Collator, OrdinalCollator, SortCriterion, Sorter};
pub use ranking::{FuzzyRanker, Ranker};
pub use session::SessionContext;
pub use source::{DatasetSource, FileSource, HttpSource, StaticSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
