use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use crate::cache::{CacheKey, CacheStats, KeyValueStore, MemoryStore, RankingCache, SqliteStore};
use crate::catalog::{Catalog, CatalogStore};
use crate::config::EngineConfig;
use crate::core::{Language, Record, ResultSource, SearchOutcome, Theme};
use crate::error::Result;
use crate::ordering::{Collator, SortCriterion, Sorter};
use crate::ranking::{FuzzyRanker, Ranker};
use crate::session::SessionContext;
use crate::source::{source_for_location, DatasetSource};

/// Main catalog engine: loads the dataset once, ranks and orders records
pub struct PokedexEngine {
    catalog: CatalogStore,
    ranker: Arc<dyn Ranker>,
    cache: RankingCache,
    sorter: Sorter,
    store: Arc<dyn KeyValueStore>,
    session: Mutex<SessionContext>,
}

impl PokedexEngine {
    /// Create an engine over `source`, persisting into `store`.
    /// Session preferences are restored from `store`.
    pub fn new(
        source: Arc<dyn DatasetSource>,
        store: Arc<dyn KeyValueStore>,
        config: &EngineConfig,
    ) -> Self {
        let mut catalog = CatalogStore::new(source, config.invalid_records);
        if config.persist_dataset {
            catalog = catalog.with_persistence(Arc::clone(&store));
        }

        let session = SessionContext::restore(store.as_ref());
        tracing::debug!(
            "Session restored: language={} sort={} theme={}",
            session.language,
            session.criterion,
            session.theme
        );

        Self {
            catalog,
            ranker: Arc::new(FuzzyRanker::new()),
            cache: RankingCache::new(Arc::clone(&store)),
            sorter: Sorter::default(),
            store,
            session: Mutex::new(session),
        }
    }

    /// Create an engine with a SQLite persistent tier and a file or HTTP source
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let store = Arc::new(SqliteStore::new(&config.db_path)?);
        let source: Arc<dyn DatasetSource> =
            Arc::from(source_for_location(&config.data_location, config.http_timeout())?);

        tracing::info!(
            "🚀 Engine ready: data={} ({}), db={}",
            config.data_location,
            source.name(),
            config.db_path
        );

        Ok(Self::new(source, store, config))
    }

    /// Engine with nothing persisted beyond the process
    pub fn in_memory(source: Arc<dyn DatasetSource>, config: &EngineConfig) -> Self {
        Self::new(source, Arc::new(MemoryStore::new()), config)
    }

    /// Replace the ranker
    pub fn with_ranker(mut self, ranker: Arc<dyn Ranker>) -> Self {
        self.ranker = ranker;
        self
    }

    /// Replace the name collator
    pub fn with_collator(mut self, collator: Arc<dyn Collator>) -> Self {
        self.sorter = Sorter::new(collator);
        self
    }

    pub fn ranker_name(&self) -> &str {
        self.ranker.name()
    }

    /// Load the catalog (coalesced with any load already in flight)
    pub async fn load(&self) -> Result<Arc<Catalog>> {
        Ok(self.catalog.load().await?)
    }

    pub fn is_loaded(&self) -> bool {
        self.catalog.is_loaded()
    }

    /// Records matching `query`, best first
    pub async fn search(&self, query: &str, language: Language) -> Result<Vec<Arc<Record>>> {
        Ok(self.search_detailed(query, language).await?.records)
    }

    /// Search with source/latency metadata
    pub async fn search_detailed(&self, query: &str, language: Language) -> Result<SearchOutcome> {
        // taken before the load, so a clear during the load keeps this
        // ranking out of the cache
        let generation = self.cache.generation();
        let catalog = self.load().await?;
        Ok(self.search_at(&catalog, query, language, generation))
    }

    /// Search, then order the matches by `criterion`: what a list view shows
    pub async fn search_sorted(
        &self,
        query: &str,
        language: Language,
        criterion: SortCriterion,
    ) -> Result<SearchOutcome> {
        let mut outcome = self.search_detailed(query, language).await?;
        outcome.records = self.sort(&outcome.records, criterion, language);
        Ok(outcome)
    }

    /// Search a loaded catalog. Never fails.
    ///
    /// Blank queries return the catalog in source order without touching the
    /// cache. Otherwise the memory tier, then the persistent tier, then a
    /// fresh ranking (which populates both tiers) answers the query. Cached
    /// ids are resolved through `catalog`, so ids it no longer holds vanish.
    pub fn search_in(&self, catalog: &Catalog, query: &str, language: Language) -> SearchOutcome {
        self.search_at(catalog, query, language, self.cache.generation())
    }

    fn search_at(
        &self,
        catalog: &Catalog,
        query: &str,
        language: Language,
        generation: u64,
    ) -> SearchOutcome {
        let start = Instant::now();
        let key = CacheKey::new(query, language);

        let (records, source) = if key.query().is_empty() {
            (catalog.records().to_vec(), ResultSource::Unfiltered)
        } else if let Some(hit) = self.cache.lookup(&key) {
            (catalog.resolve(&hit.ids), hit.source)
        } else {
            let ranked = self.ranker.rank(key.query(), language, catalog.records());
            let ids: Vec<u32> = ranked.iter().map(|r| r.record.id).collect();
            self.cache.insert_if_current(&key, &ids, generation);
            (
                ranked.into_iter().map(|r| r.record).collect(),
                ResultSource::Computed,
            )
        };

        let outcome = SearchOutcome {
            query: key.query().to_string(),
            language,
            records,
            source,
            latency_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        tracing::debug!("Search {}", outcome.display());
        outcome
    }

    /// Sort `records` into a new sequence
    pub fn sort(
        &self,
        records: &[Arc<Record>],
        criterion: SortCriterion,
        language: Language,
    ) -> Vec<Arc<Record>> {
        self.sorter.sort(records, criterion, language)
    }

    /// What to display for `query`: search in the session language, then
    /// order by the session criterion
    pub async fn view(&self, query: &str) -> Result<Vec<Arc<Record>>> {
        let session = self.session();
        let outcome = self
            .search_sorted(query, session.language, session.criterion)
            .await?;
        Ok(outcome.records)
    }

    /// Exact-match lookup; `Ok(None)` when the id is not in the catalog
    pub async fn get_by_id(&self, id: u32) -> Result<Option<Arc<Record>>> {
        let catalog = self.load().await?;
        Ok(catalog.get(id).cloned())
    }

    /// Snapshot of the session state
    pub fn session(&self) -> SessionContext {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_language(&self, language: Language) {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_language(language, self.store.as_ref());
    }

    pub fn set_sort_criterion(&self, criterion: SortCriterion) {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_criterion(criterion, self.store.as_ref());
    }

    pub fn set_theme(&self, theme: Theme) {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_theme(theme, self.store.as_ref());
    }

    pub fn toggle_theme(&self) -> Theme {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        let theme = session.theme.toggled();
        session.set_theme(theme, self.store.as_ref());
        theme
    }

    /// Drop the catalog and purge both cache tiers. Preferences are kept.
    pub fn clear(&self) {
        self.catalog.clear();
        self.cache.purge();
        tracing::info!("🧹 Catalog and ranking cache cleared");
    }

    /// Clear, then load afresh
    pub async fn reload(&self) -> Result<Arc<Catalog>> {
        self.clear();
        self.load().await
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
