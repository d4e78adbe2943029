use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::error::LoadFailure;
use crate::source::DatasetSource;

/// Fetches the dataset as a single bulk JSON payload over HTTP
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    /// Create new HTTP source
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl DatasetSource for HttpSource {
    async fn fetch(&self) -> Result<Value, LoadFailure> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LoadFailure::transport(self.name(), format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(LoadFailure::transport(
                self.name(),
                format!("HTTP {} from {}", response.status(), self.url),
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| LoadFailure::Shape(format!("Invalid JSON from {}: {}", self.url, e)))
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_host_is_transport_failure() {
        let source = HttpSource::new(
            "http://127.0.0.1:9/pokedex_data.json",
            Duration::from_millis(500),
        )
        .unwrap();
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, LoadFailure::Transport { .. }));
    }
}
