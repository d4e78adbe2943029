use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pokedex_engine::{
    cache::{CacheKey, KeyValueStore, MemoryStore, RankingCache, SqliteStore},
    Language,
};
use std::sync::Arc;

fn setup_cache(store: Arc<dyn KeyValueStore>) -> RankingCache {
    let cache = RankingCache::new(store);

    // Populate with test data
    for i in 0..100u32 {
        let key = CacheKey::new(&format!("query{}", i), Language::En);
        let ids: Vec<u32> = (i..i + 20).collect();
        cache.insert(&key, &ids);
    }

    cache
}

fn bench_cache_lookup(c: &mut Criterion) {
    let cache = setup_cache(Arc::new(SqliteStore::new(":memory:").unwrap()));
    let hit = CacheKey::new("query50", Language::En);
    let miss = CacheKey::new("nonexistent", Language::En);

    c.bench_function("cache_lookup_memory_hit", |b| {
        b.iter(|| black_box(cache.lookup(&hit)));
    });

    c.bench_function("cache_lookup_miss", |b| {
        b.iter(|| black_box(cache.lookup(&miss)));
    });

    // fresh memory tier over a populated store: every lookup reads SQLite
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(":memory:").unwrap());
    setup_cache(Arc::clone(&store));
    c.bench_function("cache_lookup_persistent_hit", |b| {
        b.iter(|| {
            let cold = RankingCache::new(Arc::clone(&store));
            black_box(cold.lookup(&hit))
        });
    });
}

fn bench_cache_insert(c: &mut Criterion) {
    let ids: Vec<u32> = (1..=50).collect();
    let key = CacheKey::new("test_query", Language::Jp);

    let sqlite = RankingCache::new(Arc::new(SqliteStore::new(":memory:").unwrap()));
    c.bench_function("cache_insert_sqlite", |b| {
        b.iter(|| sqlite.insert(black_box(&key), black_box(&ids)));
    });

    let memory = RankingCache::new(Arc::new(MemoryStore::new()));
    c.bench_function("cache_insert_memory_store", |b| {
        b.iter(|| memory.insert(black_box(&key), black_box(&ids)));
    });
}

fn bench_cache_purge(c: &mut Criterion) {
    c.bench_function("cache_purge_100", |b| {
        b.iter(|| {
            let cache = setup_cache(Arc::new(MemoryStore::new()));
            cache.purge();
            black_box(cache.stats())
        });
    });
}

criterion_group!(benches, bench_cache_lookup, bench_cache_insert, bench_cache_purge);
criterion_main!(benches);
