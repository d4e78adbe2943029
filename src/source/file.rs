use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::LoadFailure;
use crate::source::DatasetSource;

/// Reads the dataset from a JSON file on disk
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    async fn fetch(&self) -> Result<Value, LoadFailure> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            LoadFailure::transport(
                self.name(),
                format!("Cannot read {}: {}", self.path.display(), e),
            )
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            LoadFailure::Shape(format!("{} is not valid JSON: {}", self.path.display(), e))
        })
    }

    fn name(&self) -> &str {
        "file"
    }
}
