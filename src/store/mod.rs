//! Persistence for documents, chunks, and their embeddings.
//!
//! The relationship is Document 1—* Chunk 1—1 vector record, with cascade
//! deletes: no chunk or vector outlives its parent. The [`VectorStore`] trait
//! keeps orchestration code independent of the concrete backend.
//!
//! ```text
//!                  ┌──────────────────┐
//!                  │ VectorStore trait│
//!                  │   (async CRUD)   │
//!                  └────────┬─────────┘
//!                           │
//!                           ▼
//!                  ┌──────────────────┐
//!                  │  SqliteRagStore  │
//!                  │    sqlite-vec    │
//!                  └──────────────────┘
//! ```

pub mod sqlite;

pub use sqlite::SqliteRagStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ranking::Candidate;
use crate::types::RagError;

/// A stored source document. Timestamps are RFC 3339 UTC.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentRow {
    pub id: String,
    pub title: String,
    /// Source URL; unique across the store.
    pub url: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A stored chunk of one document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkRow {
    pub id: String,
    pub document_id: String,
    pub content: String,
    pub created_at: String,
}

/// A document about to be persisted.
#[derive(Clone, Debug)]
pub struct NewDocument {
    pub title: String,
    pub url: String,
}

/// One chunk with its embedding, ready for insertion.
#[derive(Clone, Debug)]
pub struct ChunkInsert {
    pub content: String,
    pub embedding: Vec<f32>,
}

/// Async storage backend for the ingestion and retrieval pipeline.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Atomically replaces the document at `doc.url` with a fresh row and the
    /// given chunks, in document order.
    ///
    /// Any existing document with the same URL is deleted first, cascading to
    /// its chunks and vectors, so re-ingestion always reflects the latest
    /// fetch and never leaves duplicates or orphans. Delete and insert happen
    /// in one transaction: a failure mid-way leaves no partial state, and the
    /// document is never observably absent.
    async fn replace_document(
        &self,
        doc: NewDocument,
        chunks: Vec<ChunkInsert>,
    ) -> Result<DocumentRow, RagError>;

    /// All documents, oldest first.
    async fn documents(&self) -> Result<Vec<DocumentRow>, RagError>;

    /// Looks up a document by source URL.
    async fn find_document_by_url(&self, url: &str) -> Result<Option<DocumentRow>, RagError>;

    /// A document's chunks in creation order.
    async fn document_chunks(&self, document_id: &str) -> Result<Vec<ChunkRow>, RagError>;

    /// The candidate pool for ranking: every stored embedding with its chunk
    /// text and owning document, in insertion order. `scope` restricts the
    /// pool to one document.
    async fn candidate_pool(&self, scope: Option<&str>) -> Result<Vec<Candidate>, RagError>;

    /// Deletes a document (and, transitively, its chunks and vectors) by URL.
    /// Returns the number of document rows removed.
    async fn delete_document_by_url(&self, url: &str) -> Result<usize, RagError>;

    /// Total number of stored chunks.
    async fn chunk_count(&self) -> Result<usize, RagError>;
}
