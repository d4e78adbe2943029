use async_trait::async_trait;
use pokedex_engine::{
    cache::{DATASET_KEY, SEARCH_KEY_PREFIX},
    DatasetSource, EngineConfig, InvalidRecordPolicy, KeyValueStore, Language, LoadFailure,
    PokedexEngine, Record, ResultSource, SortCriterion, SqliteStore, StaticSource, StoreError,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn dataset() -> Value {
    json!([
        {
            "id": 1,
            "name_en": "Bulbasaur",
            "name_jp": "フシギダネ",
            "name_romaji": "Fushigidane",
            "types_en": ["Grass", "Poison"],
            "types_jp": ["くさ", "どく"],
            "stats": {"hp": 45, "attack": 49, "defense": 49}
        },
        {
            "id": 4,
            "name_en": "Charmander",
            "name_jp": "ヒトカゲ",
            "name_romaji": "Hitokage",
            "types_en": ["Fire"],
            "types_jp": ["ほのお"],
            "stats": {"hp": 39, "attack": 52, "defense": 43}
        },
        {
            "id": 25,
            "name_en": "Pikachu",
            "name_jp": "ピカチュウ",
            "name_romaji": "Pikachu",
            "types_en": ["Electric"],
            "types_jp": ["でんき"],
            "stats": {"hp": 35, "attack": 55, "defense": 40}
        }
    ])
}

fn ids(records: &[Arc<Record>]) -> Vec<u32> {
    records.iter().map(|r| r.id).collect()
}

fn sqlite() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::new(":memory:").unwrap())
}

fn engine_over(
    store: Arc<dyn KeyValueStore>,
    payload: Value,
    config: &EngineConfig,
) -> PokedexEngine {
    PokedexEngine::new(Arc::new(StaticSource::new(payload)), store, config)
}

fn engine() -> PokedexEngine {
    engine_over(sqlite(), dataset(), &EngineConfig::default())
}

struct CountingSource {
    fetches: AtomicUsize,
}

#[async_trait]
impl DatasetSource for CountingSource {
    async fn fetch(&self) -> Result<Value, LoadFailure> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(dataset())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Serves only Bulbasaur on the first fetch, the full dataset afterwards
struct GrowingSource {
    fetches: AtomicUsize,
}

#[async_trait]
impl DatasetSource for GrowingSource {
    async fn fetch(&self) -> Result<Value, LoadFailure> {
        let attempt = self.fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        if attempt == 0 {
            return Ok(json!([dataset()[0].clone()]));
        }
        Ok(dataset())
    }

    fn name(&self) -> &str {
        "growing"
    }
}

struct UnreachableSource;

#[async_trait]
impl DatasetSource for UnreachableSource {
    async fn fetch(&self) -> Result<Value, LoadFailure> {
        Err(LoadFailure::transport("unreachable", "connection refused"))
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}

struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("quota exceeded".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("quota exceeded".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("quota exceeded".to_string()))
    }

    fn remove_prefix(&self, _prefix: &str) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("quota exceeded".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

#[tokio::test]
async fn test_search_scenarios() {
    let engine = engine();

    let outcome = engine.search_detailed("char", Language::En).await.unwrap();
    assert_eq!(outcome.ids(), vec![4]);
    assert_eq!(outcome.source, ResultSource::Computed);

    let found = engine.search("001", Language::En).await.unwrap();
    assert_eq!(ids(&found), vec![1]);

    let found = engine.search("ヒトカゲ", Language::Jp).await.unwrap();
    assert_eq!(ids(&found), vec![4]);

    let found = engine.search("hitokage", Language::En).await.unwrap();
    assert_eq!(ids(&found), vec![4]);
}

#[tokio::test]
async fn test_no_match_is_empty() {
    let engine = engine();
    assert!(engine.search("zzz", Language::En).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_query_returns_catalog_order() {
    let engine = engine();
    let outcome = engine.search_detailed("  ", Language::En).await.unwrap();
    assert_eq!(outcome.source, ResultSource::Unfiltered);
    assert_eq!(outcome.ids(), vec![1, 4, 25]);
}

#[tokio::test]
async fn test_sort_scenarios() {
    let engine = engine();
    let all = engine.search("", Language::En).await.unwrap();

    let shuffled: Vec<Arc<Record>> = vec![all[2].clone(), all[0].clone(), all[1].clone()];
    let sorted = |criterion, language| ids(&engine.sort(&shuffled, criterion, language));

    assert_eq!(sorted(SortCriterion::IdAsc, Language::En), vec![1, 4, 25]);
    assert_eq!(sorted(SortCriterion::IdDesc, Language::En), vec![25, 4, 1]);
    assert_eq!(sorted(SortCriterion::NameAsc, Language::En), vec![1, 4, 25]);
    assert_eq!(sorted(SortCriterion::NameAsc, Language::Jp), vec![4, 25, 1]);
    // totals: 143, 134, 130
    assert_eq!(sorted(SortCriterion::TotalDesc, Language::En), vec![1, 4, 25]);

    // input untouched
    assert_eq!(ids(&shuffled), vec![25, 1, 4]);
}

#[tokio::test]
async fn test_repeated_search_is_served_from_memory() {
    let engine = engine();

    let first = engine.search_detailed("a", Language::En).await.unwrap();
    let second = engine.search_detailed("  A ", Language::En).await.unwrap();

    assert_eq!(first.source, ResultSource::Computed);
    assert_eq!(second.source, ResultSource::MemoryCache);
    assert_eq!(first.ids(), second.ids());

    // a fresh computation agrees with the cached answer
    let fresh = engine_over(sqlite(), dataset(), &EngineConfig::default());
    assert_eq!(fresh.search("a", Language::En).await.unwrap().len(), second.len());
    assert_eq!(ids(&fresh.search("a", Language::En).await.unwrap()), second.ids());

    let stats = engine.cache_stats();
    assert_eq!(stats.memory_hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_languages_are_cached_separately() {
    let engine = engine();

    engine.search("pika", Language::En).await.unwrap();
    let jp = engine.search_detailed("pika", Language::Jp).await.unwrap();
    assert_eq!(jp.source, ResultSource::Computed);
}

#[tokio::test]
async fn test_persistent_tier_survives_engine_restart() {
    let store = sqlite();

    let first = engine_over(store.clone(), dataset(), &EngineConfig::default());
    let computed = first.search_detailed("pika", Language::En).await.unwrap();
    assert_eq!(computed.source, ResultSource::Computed);
    assert!(store.get(&format!("{}en:pika", SEARCH_KEY_PREFIX)).unwrap().is_some());

    let second = engine_over(store.clone(), dataset(), &EngineConfig::default());
    let restored = second.search_detailed("pika", Language::En).await.unwrap();
    assert_eq!(restored.source, ResultSource::PersistentCache);
    assert_eq!(restored.ids(), computed.ids());

    let promoted = second.search_detailed("pika", Language::En).await.unwrap();
    assert_eq!(promoted.source, ResultSource::MemoryCache);
}

#[tokio::test]
async fn test_cached_ids_missing_from_catalog_are_dropped() {
    let store = sqlite();

    let full = engine_over(store.clone(), dataset(), &EngineConfig::default());
    let before = full.search("a", Language::En).await.unwrap();
    assert!(ids(&before).contains(&25));

    let mut payload = dataset();
    payload.as_array_mut().unwrap().retain(|r| r["id"] != 25);
    let config = EngineConfig {
        persist_dataset: false,
        ..EngineConfig::default()
    };

    let smaller = engine_over(store, payload, &config);
    let after = smaller.search_detailed("a", Language::En).await.unwrap();
    assert_eq!(after.source, ResultSource::PersistentCache);

    let expected: Vec<u32> = ids(&before).into_iter().filter(|id| *id != 25).collect();
    assert_eq!(after.ids(), expected);
}

#[tokio::test]
async fn test_clear_purges_both_tiers() {
    let store = sqlite();
    let engine = engine_over(store.clone(), dataset(), &EngineConfig::default());

    engine.search("pika", Language::En).await.unwrap();
    engine.set_language(Language::Jp);
    assert!(store.get(DATASET_KEY).unwrap().is_some());

    engine.clear();
    assert!(!engine.is_loaded());
    assert!(store.get(DATASET_KEY).unwrap().is_none());
    assert!(store.get(&format!("{}en:pika", SEARCH_KEY_PREFIX)).unwrap().is_none());
    assert_eq!(engine.cache_stats().memory_entries, 0);

    // preferences are not search results
    assert_eq!(engine.session().language, Language::Jp);

    let again = engine.search_detailed("pika", Language::En).await.unwrap();
    assert_eq!(again.source, ResultSource::Computed);
}

#[tokio::test]
async fn test_clear_during_load_leaves_no_stale_ranking() {
    let source = Arc::new(GrowingSource {
        fetches: AtomicUsize::new(0),
    });
    let engine = PokedexEngine::new(source, sqlite(), &EngineConfig::default());

    let (during, _) = tokio::join!(engine.search("a", Language::En), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        engine.clear();
    });
    let mut found = ids(&during.unwrap());
    found.sort_unstable();
    assert_eq!(found, vec![1, 4, 25]);

    assert_eq!(engine.load().await.unwrap().len(), 3);

    let after = engine.search_detailed("a", Language::En).await.unwrap();
    assert_eq!(after.source, ResultSource::Computed);
    assert!(after.ids().contains(&25));
}

#[tokio::test]
async fn test_search_sorted_orders_matches() {
    let engine = engine();
    engine.set_sort_criterion(SortCriterion::IdDesc);

    let session = engine.session();
    let outcome = engine
        .search_sorted("a", session.language, session.criterion)
        .await
        .unwrap();
    assert_eq!(outcome.ids(), vec![25, 4, 1]);
    assert_eq!(ids(&engine.view("a").await.unwrap()), outcome.ids());
}

#[tokio::test]
async fn test_concurrent_searches_share_one_load() {
    let source = Arc::new(CountingSource {
        fetches: AtomicUsize::new(0),
    });
    let engine = PokedexEngine::in_memory(source.clone(), &EngineConfig::default());

    let (a, b, c) = tokio::join!(
        engine.search("char", Language::En),
        engine.search("pika", Language::En),
        engine.get_by_id(1)
    );

    assert_eq!(ids(&a.unwrap()), vec![4]);
    assert_eq!(ids(&b.unwrap()), vec![25]);
    assert_eq!(c.unwrap().unwrap().name_en, "Bulbasaur");
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_load_failure_surfaces() {
    let engine = PokedexEngine::in_memory(Arc::new(UnreachableSource), &EngineConfig::default());
    assert!(engine.search("char", Language::En).await.is_err());
    assert!(!engine.is_loaded());
}

#[tokio::test]
async fn test_view_follows_session() {
    let store = sqlite();
    let engine = engine_over(store.clone(), dataset(), &EngineConfig::default());

    engine.set_language(Language::Jp);
    engine.set_sort_criterion(SortCriterion::NameAsc);
    assert_eq!(ids(&engine.view("").await.unwrap()), vec![4, 25, 1]);

    // restored by the next engine over the same store
    let next = engine_over(store, dataset(), &EngineConfig::default());
    assert_eq!(next.session(), engine.session());
    assert_eq!(ids(&next.view("").await.unwrap()), vec![4, 25, 1]);
}

#[tokio::test]
async fn test_failing_store_degrades_to_computation() {
    let engine = engine_over(Arc::new(FailingStore), dataset(), &EngineConfig::default());

    let first = engine.search_detailed("char", Language::En).await.unwrap();
    assert_eq!(first.source, ResultSource::Computed);
    assert_eq!(first.ids(), vec![4]);

    let second = engine.search_detailed("char", Language::En).await.unwrap();
    assert_eq!(second.source, ResultSource::MemoryCache);

    engine.set_sort_criterion(SortCriterion::IdDesc);
    assert_eq!(engine.session().criterion, SortCriterion::IdDesc);

    engine.clear();
    assert!(engine.cache_stats().store_failures > 0);
}

#[tokio::test]
async fn test_invalid_record_policies() {
    let mut payload = dataset();
    payload
        .as_array_mut()
        .unwrap()
        .push(json!({"id": 7, "name_en": "Squirtle", "stats": "strong"}));

    let dropping = engine_over(sqlite(), payload.clone(), &EngineConfig::default());
    assert_eq!(dropping.load().await.unwrap().ids(), vec![1, 4, 25]);

    let config = EngineConfig {
        invalid_records: InvalidRecordPolicy::Coerce,
        ..EngineConfig::default()
    };
    let coercing = engine_over(sqlite(), payload, &config);
    assert_eq!(coercing.load().await.unwrap().ids(), vec![1, 4, 25, 7]);
    assert_eq!(ids(&coercing.search("squirt", Language::En).await.unwrap()), vec![7]);
}

#[tokio::test]
async fn test_from_config_reads_file_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("pokedex_data.json");
    std::fs::write(&data_path, dataset().to_string()).unwrap();

    let config = EngineConfig {
        data_location: data_path.to_string_lossy().into_owned(),
        db_path: dir.path().join("pokedex.db").to_string_lossy().into_owned(),
        ..EngineConfig::default()
    };

    let engine = PokedexEngine::from_config(&config).unwrap();
    assert_eq!(ids(&engine.search("char", Language::En).await.unwrap()), vec![4]);
    drop(engine);

    // dataset and ranking persisted on disk
    let reopened = PokedexEngine::from_config(&config).unwrap();
    let outcome = reopened.search_detailed("char", Language::En).await.unwrap();
    assert_eq!(outcome.source, ResultSource::PersistentCache);
}
