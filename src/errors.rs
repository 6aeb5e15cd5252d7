//! Error types for colloc-core.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for corpus building and search.
#[derive(Debug, Error)]
pub enum CollocError {
    /// Configuration-related errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Corpus discovery errors (missing root, unreadable directory).
    #[error("corpus error: {0}")]
    Corpus(String),

    /// The corpus root contains no documents.
    #[error("no documents found under {}", .0.display())]
    NoDocuments(PathBuf),

    /// The tagging model (tag lexicon) is missing or unreadable.
    #[error("tagging model unavailable: {}", .0.display())]
    ModelUnavailable(PathBuf),

    /// A search or export was requested over an empty corpus index.
    #[error("corpus index is empty")]
    EmptyCorpus,

    /// The query cannot be executed as given.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Export was requested for an empty result or source list.
    #[error("nothing to export")]
    NothingToExport,

    /// The cached corpus could not be decoded; rebuilding it fixes this.
    #[error("corrupt corpus cache {}: {reason}; rebuild the corpus to recreate it", .path.display())]
    CorruptCache {
        /// Location of the cache file.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// I/O error wrapper.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serde JSON serialization/deserialization error.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Binary cache encoding error.
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Tabular import/export error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Correction pattern compilation error.
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type for colloc-core operations.
pub type Result<T> = std::result::Result<T, CollocError>;
