pub mod file;
pub mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::LoadFailure;

pub use file::FileSource;
pub use http::HttpSource;

/// Trait for dataset providers (bundled file, HTTP endpoint, ...)
///
/// A source only transports the raw payload; shape validation happens in
/// the catalog store.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetch the whole dataset as one JSON payload
    async fn fetch(&self) -> Result<Value, LoadFailure>;

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// Payload already in memory (embedded data, tests)
pub struct StaticSource {
    payload: Value,
}

impl StaticSource {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl DatasetSource for StaticSource {
    async fn fetch(&self) -> Result<Value, LoadFailure> {
        Ok(self.payload.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Pick a source for a location: http(s) URLs go over the network,
/// anything else is read from disk.
pub fn source_for_location(
    location: &str,
    http_timeout: std::time::Duration,
) -> Result<Box<dyn DatasetSource>, reqwest::Error> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location, http_timeout)?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}
