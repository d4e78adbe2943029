use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::cache::{KeyValueStore, DATASET_KEY};
use crate::catalog::{validate_payload, Catalog, InvalidRecordPolicy};
use crate::core::Record;
use crate::error::LoadFailure;
use crate::source::DatasetSource;

type LoadResult = Result<Arc<Catalog>, LoadFailure>;
type PendingLoad = Shared<BoxFuture<'static, LoadResult>>;

/// Holds the catalog once loaded.
///
/// At most one load is outstanding: concurrent `load` calls await the same
/// shared future, so the source is fetched once and every caller sees the
/// same catalog. A failed load is forgotten, so the next call retries.
/// A load superseded by `clear` is never returned: its waiters start over.
pub struct CatalogStore {
    source: Arc<dyn DatasetSource>,
    persistent: Option<Arc<dyn KeyValueStore>>,
    policy: InvalidRecordPolicy,
    catalog: RwLock<Option<Arc<Catalog>>>,
    in_flight: Mutex<Option<PendingLoad>>,
    /// Bumped by every `clear`
    epoch: AtomicU64,
}

impl CatalogStore {
    pub fn new(source: Arc<dyn DatasetSource>, policy: InvalidRecordPolicy) -> Self {
        Self {
            source,
            persistent: None,
            policy,
            catalog: RwLock::new(None),
            in_flight: Mutex::new(None),
            epoch: AtomicU64::new(0),
        }
    }

    /// Persist the validated dataset and restore it on later loads
    pub fn with_persistence(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.persistent = Some(store);
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }

    /// The loaded catalog, if any
    pub fn current(&self) -> Option<Arc<Catalog>> {
        self.catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Load the catalog, or join the load already in flight
    pub async fn load(&self) -> LoadResult {
        loop {
            if let Some(catalog) = self.current() {
                return Ok(catalog);
            }

            let (pending, epoch) = {
                let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

                if let Some(catalog) = self.current() {
                    return Ok(catalog);
                }

                let pending = match in_flight.as_ref() {
                    Some(pending) => pending.clone(),
                    None => {
                        let pending = run_load(
                            Arc::clone(&self.source),
                            self.persistent.clone(),
                            self.policy,
                        )
                        .boxed()
                        .shared();
                        *in_flight = Some(pending.clone());
                        pending
                    }
                };
                (pending, self.epoch.load(Ordering::SeqCst))
            };

            let result = pending.clone().await;

            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            if self.epoch.load(Ordering::SeqCst) != epoch {
                tracing::debug!("Catalog load superseded by clear, loading again");
                continue;
            }

            // Only the first waiter to finish installs the catalog
            if in_flight
                .as_ref()
                .is_some_and(|current| current.ptr_eq(&pending))
            {
                if let Ok(catalog) = &result {
                    *self.catalog.write().unwrap_or_else(PoisonError::into_inner) =
                        Some(Arc::clone(catalog));
                }
                *in_flight = None;
            }

            return result;
        }
    }

    /// Exact-match lookup in the loaded catalog. `None` when absent or not loaded.
    pub fn get_by_id(&self, id: u32) -> Option<Arc<Record>> {
        self.current().and_then(|catalog| catalog.get(id).cloned())
    }

    /// Forget the catalog and its persisted payload
    pub fn clear(&self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *in_flight = None;
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = None;

        if let Some(store) = &self.persistent {
            if let Err(e) = store.remove(DATASET_KEY) {
                tracing::warn!("⚠️ Failed to remove persisted dataset: {}", e);
            }
        }
    }
}

async fn run_load(
    source: Arc<dyn DatasetSource>,
    persistent: Option<Arc<dyn KeyValueStore>>,
    policy: InvalidRecordPolicy,
) -> LoadResult {
    if let Some(store) = &persistent {
        if let Some(catalog) = restore_persisted(store.as_ref(), policy) {
            tracing::info!(
                "📦 Restored {} records from {}",
                catalog.len(),
                store.name()
            );
            return Ok(Arc::new(catalog));
        }
    }

    tracing::info!("📥 Fetching dataset from {} source", source.name());
    let payload = source.fetch().await?;
    let report = validate_payload(&payload, policy)?;

    tracing::info!(
        "✅ Loaded {} records ({} dropped, {} coerced, policy={})",
        report.records.len(),
        report.dropped,
        report.coerced,
        policy.code()
    );

    if let Some(store) = &persistent {
        persist(store.as_ref(), &report.records);
    }

    Ok(Arc::new(Catalog::new(report.records)))
}

fn restore_persisted(store: &dyn KeyValueStore, policy: InvalidRecordPolicy) -> Option<Catalog> {
    let raw = match store.get(DATASET_KEY) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!("⚠️ Cannot read persisted dataset, fetching instead: {}", e);
            return None;
        }
    };

    let payload: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("⚠️ Persisted dataset is not valid JSON, fetching instead: {}", e);
            return None;
        }
    };

    match validate_payload(&payload, policy) {
        Ok(report) => Some(Catalog::new(report.records)),
        Err(e) => {
            tracing::warn!("⚠️ Persisted dataset rejected, fetching instead: {}", e);
            None
        }
    }
}

fn persist(store: &dyn KeyValueStore, records: &[Record]) {
    let written = serde_json::to_string(records)
        .map_err(crate::error::StoreError::from)
        .and_then(|json| store.set(DATASET_KEY, &json));

    if let Err(e) = written {
        tracing::warn!("⚠️ Failed to persist dataset to {}: {}", store.name(), e);
    }
}
