//! Error types for the comparador CLI.

use std::path::PathBuf;

/// Errors raised while querying the scraping API.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Could not decode the product list: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors raised while persisting the flow state.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize flow state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}
