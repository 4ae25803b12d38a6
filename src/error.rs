//! Error types for Roost.

use thiserror::Error;

/// Library-level error type for Roost operations.
#[derive(Error, Debug)]
pub enum RoostError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Relevance gate error: {0}")]
    Gate(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Weather lookup failed: {0}")]
    Weather(String),

    #[error("Price page scrape failed: {0}")]
    Scrape(String),

    #[error("Price monitor error: {0}")]
    Monitor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Roost operations.
pub type Result<T> = std::result::Result<T, RoostError>;
