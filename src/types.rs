//! Shared error taxonomy for the ingestion and retrieval pipeline.

use thiserror::Error;

/// Errors surfaced by chunking, embedding, storage, and ingestion operations.
///
/// Every failure in the pipeline collapses into one of these variants so that
/// callers (and the tool boundary on top of them) can decide between aborting
/// a document, degrading to a fallback answer, or reporting a validation
/// message.
#[derive(Debug, Error)]
pub enum RagError {
    /// Network failure while fetching a source document.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem or serialization failure.
    #[error("i/o failure: {0}")]
    Io(String),

    /// SQLite or vector-store failure.
    #[error("storage failure: {0}")]
    Storage(String),

    /// The chunker could not process the supplied text.
    #[error("chunking failed: {0}")]
    Chunking(String),

    /// The embedding provider rejected the request. Batch calls fail as a
    /// whole; there is no partial-result contract.
    #[error("embedding provider failure: {0}")]
    Embedding(String),

    /// The document is malformed, empty, or otherwise unusable.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// A configuration value violates a pipeline invariant.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for RagError {
    fn from(err: std::io::Error) -> Self {
        RagError::Io(err.to_string())
    }
}
