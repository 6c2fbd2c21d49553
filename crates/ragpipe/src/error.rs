//! Error types for the RAG pipeline

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by pipeline stages
///
/// There is no retry or recovery anywhere in the pipeline: every variant
/// propagates to the caller and ultimately terminates the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("unsupported source: {0}")]
    UnsupportedSource(String),

    #[error("loader error for {location}: {reason}")]
    Loader { location: String, reason: String },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("index error: {0}")]
    Index(String),
}

impl Error {
    /// Create a loader error with a source location
    pub fn loader(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Loader {
            location: location.into(),
            reason: reason.into(),
        }
    }
}
