use thiserror::Error;

/// Main error type for the pokedex engine
#[derive(Error, Debug)]
pub enum PokedexError {
    /// Dataset could not be loaded
    #[error("Dataset load failed: {0}")]
    Load(#[from] LoadFailure),

    /// Persistent store errors (only surfaced by direct store access)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Dataset load failure.
///
/// `Clone` because every caller waiting on the same in-flight load observes
/// the same outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// The dataset could not be fetched (I/O, HTTP, status code)
    #[error("Source '{source_name}' unreachable: {message}")]
    Transport { source_name: String, message: String },

    /// The payload is not a sequence of record-shaped values
    #[error("Invalid dataset shape: {0}")]
    Shape(String),
}

impl LoadFailure {
    pub fn transport(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        LoadFailure::Transport {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

/// Key-value store failure. The cache layer and session catch these and
/// degrade to a miss or a default.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored value could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Store is not usable (poisoned lock, disabled backend)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, PokedexError>;
