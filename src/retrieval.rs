//! Retrieval service: question → ranked grounding chunks.

use std::sync::Arc;

use crate::config::RagConfig;
use crate::embedding::{Embedder, normalize_query};
use crate::ranking::{RankedChunk, RankingPolicy, rank};
use crate::store::{DocumentRow, VectorStore};
use crate::types::RagError;

/// Embeds questions and ranks stored chunks against them.
///
/// An empty result means "no grounding content found" and is a normal
/// outcome; only collaborator failures surface as errors.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    config: RagConfig,
}

impl Retriever {
    /// Builds a retriever over explicit collaborators.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        config: RagConfig,
    ) -> Result<Self, RagError> {
        config.validate()?;
        Ok(Self {
            embedder,
            store,
            config,
        })
    }

    fn policy(&self, scoped: bool) -> RankingPolicy {
        RankingPolicy {
            min_score: if scoped {
                self.config.min_score_scoped
            } else {
                self.config.min_score
            },
            limit: self.config.top_k,
        }
    }

    /// Returns the chunks most similar to `question`, ordered by descending
    /// score and capped at the configured limit.
    ///
    /// With `scope` set, the search is restricted to that document's chunks
    /// and the relaxed scoped threshold applies.
    pub async fn retrieve(
        &self,
        question: &str,
        scope: Option<&str>,
    ) -> Result<Vec<RankedChunk>, RagError> {
        let normalized = normalize_query(question);
        let query = self.embedder.embed_one(&normalized).await?;
        let pool = self.store.candidate_pool(scope).await?;
        let ranked = rank(&query, &pool, self.policy(scope.is_some()), scope);
        tracing::debug!(
            scoped = scope.is_some(),
            pool = pool.len(),
            matches = ranked.len(),
            "retrieval ranked candidate pool"
        );
        Ok(ranked)
    }

    /// Concatenates all of a document's chunks in creation order, separated
    /// by blank lines, for whole-document overview requests.
    ///
    /// A missing scope is signalled as `RagError::InvalidDocument` rather
    /// than a panic or a silent empty string, so the tool boundary can map it
    /// to its "no document selected" placeholder.
    pub async fn summarize(&self, document_id: Option<&str>) -> Result<String, RagError> {
        let Some(document_id) = document_id.map(str::trim).filter(|id| !id.is_empty()) else {
            return Err(RagError::InvalidDocument("no document selected".into()));
        };

        let chunks = self.store.document_chunks(document_id).await?;
        Ok(chunks
            .iter()
            .map(|chunk| chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    /// Lists ingested documents, oldest first.
    pub async fn documents(&self) -> Result<Vec<DocumentRow>, RagError> {
        self.store.documents().await
    }
}
