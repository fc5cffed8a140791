//! Document ingestion: fetch → extract → chunk → embed → persist.
//!
//! Each document moves through the stages as one unit. Fetch, extraction, or
//! embedding failure aborts the whole document; persistence is transactional,
//! so an aborted run leaves no partial rows. Re-ingesting a URL replaces the
//! previous document wholesale.

use std::sync::Arc;

use reqwest::Client;
use url::Url;

use crate::chunking::{Chunker, ParagraphChunker, SentenceChunker};
use crate::config::RagConfig;
use crate::embedding::Embedder;
use crate::extract::Extractor;
use crate::store::{ChunkInsert, DocumentRow, NewDocument, VectorStore};
use crate::types::RagError;

/// Result of one ingestion run.
#[derive(Clone, Debug)]
pub enum IngestOutcome {
    /// The document was chunked, embedded, and persisted.
    Ingested {
        document: DocumentRow,
        chunk_count: usize,
    },
    /// Extraction produced no chunks; nothing was persisted. Not an error.
    Skipped { url: String, reason: String },
}

impl IngestOutcome {
    /// Chunks written by this run.
    pub fn chunk_count(&self) -> usize {
        match self {
            IngestOutcome::Ingested { chunk_count, .. } => *chunk_count,
            IngestOutcome::Skipped { .. } => 0,
        }
    }
}

/// Orchestrates the per-document ingestion state machine.
pub struct IngestionPipeline {
    client: Client,
    extractor: Box<dyn Extractor>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    chunker: ParagraphChunker,
    note_chunker: SentenceChunker,
}

impl IngestionPipeline {
    /// Builds a pipeline from explicit collaborators.
    ///
    /// Validates the chunking configuration and the embedder/config dimension
    /// agreement up front, so misconfiguration fails at construction rather
    /// than mid-ingestion.
    pub fn new(
        client: Client,
        extractor: Box<dyn Extractor>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        config: &RagConfig,
    ) -> Result<Self, RagError> {
        config.validate()?;
        if embedder.dims() != config.dims {
            return Err(RagError::InvalidConfig(format!(
                "embedder produces {} dimensions, config expects {}",
                embedder.dims(),
                config.dims
            )));
        }
        let chunker = ParagraphChunker::new(config.chunk_target, config.chunk_overlap)?;
        Ok(Self {
            client,
            extractor,
            embedder,
            store,
            chunker,
            note_chunker: SentenceChunker::new(),
        })
    }

    /// Fetches `url`, extracts its article text, and ingests it.
    ///
    /// Ingestion is idempotent per URL: an existing document at the same URL
    /// is replaced, cascading to its chunks and vectors.
    pub async fn ingest_url(&self, url: &Url, title: &str) -> Result<IngestOutcome, RagError> {
        tracing::info!(%url, "fetching document");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;
        let raw = response.text().await?;

        let text = self.extractor.extract(&raw)?;
        tracing::debug!(
            %url,
            extractor = self.extractor.name(),
            chars = text.chars().count(),
            "extracted article text"
        );

        self.ingest_text(url.as_str(), title, &text).await
    }

    /// Ingests already-extracted text, bypassing fetch and markup heuristics.
    pub async fn ingest_text(
        &self,
        url: &str,
        title: &str,
        text: &str,
    ) -> Result<IngestOutcome, RagError> {
        self.ingest_with(&self.chunker, url, title, text).await
    }

    /// Ingests a short ad hoc fact (e.g. supplied directly by a chat user).
    ///
    /// Uses the sentence-split strategy and a synthetic parent document, so
    /// the chunk/document ownership invariant holds for notes too.
    pub async fn ingest_note(&self, content: &str) -> Result<IngestOutcome, RagError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(RagError::InvalidDocument(
                "note content must not be empty".into(),
            ));
        }

        let url = format!("note:{}", uuid::Uuid::new_v4());
        let title = note_title(content);
        match self
            .ingest_with(&self.note_chunker, &url, &title, content)
            .await?
        {
            outcome @ IngestOutcome::Ingested { .. } => Ok(outcome),
            IngestOutcome::Skipped { .. } => Err(RagError::InvalidDocument(
                "note content contains no sentences".into(),
            )),
        }
    }

    async fn ingest_with(
        &self,
        chunker: &dyn Chunker,
        url: &str,
        title: &str,
        text: &str,
    ) -> Result<IngestOutcome, RagError> {
        let chunks = chunker.chunk(text)?;
        if chunks.is_empty() {
            tracing::warn!(url, strategy = chunker.name(), "no chunks produced, skipping");
            return Ok(IngestOutcome::Skipped {
                url: url.to_string(),
                reason: "no chunks produced".to_string(),
            });
        }

        // One batch call for the whole document; a provider failure aborts it
        // before anything is written.
        let embeddings = self.embedder.embed_many(&chunks).await?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::Embedding(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let inserts: Vec<ChunkInsert> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(content, embedding)| ChunkInsert { content, embedding })
            .collect();
        let chunk_count = inserts.len();

        let document = self
            .store
            .replace_document(
                NewDocument {
                    title: title.to_string(),
                    url: url.to_string(),
                },
                inserts,
            )
            .await?;

        tracing::info!(url, chunk_count, strategy = chunker.name(), "document ingested");
        Ok(IngestOutcome::Ingested {
            document,
            chunk_count,
        })
    }
}

/// Derives a short title from the first words of a note.
fn note_title(content: &str) -> String {
    const MAX_TITLE: usize = 60;
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX_TITLE {
        flat
    } else {
        let head: String = flat.chars().take(MAX_TITLE).collect();
        format!("{}…", head.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_titles_are_truncated() {
        assert_eq!(note_title("short fact"), "short fact");

        let long = "word ".repeat(40);
        let title = note_title(&long);
        assert!(title.ends_with('…'));
        assert!(title.chars().count() <= 61);
    }
}
