//! Chat-facing tool boundary.
//!
//! Everything above this layer speaks plain strings: the assistant's tool
//! calls come in as JSON arguments and leave as text it can drop straight
//! into a prompt. Internal errors never cross the boundary raw; anything the
//! store or embedder throws while answering a question degrades to the
//! no-grounding fallback sentence, so the assistant declines instead of
//! hallucinating around an error message.

use serde::Deserialize;

use crate::config::{NO_DOCUMENT_SELECTED, NO_GROUNDING_FALLBACK};
use crate::ingestion::{IngestOutcome, IngestionPipeline};
use crate::retrieval::Retriever;
use crate::types::RagError;

/// Arguments for the grounding-search tool call.
#[derive(Clone, Debug, Deserialize)]
pub struct SearchArgs {
    /// The user's question, verbatim.
    pub question: String,
    /// Restrict the search to one document.
    #[serde(default)]
    pub document_id: Option<String>,
}

/// Arguments for the whole-document summary tool call.
#[derive(Clone, Debug, Deserialize)]
pub struct SummarizeArgs {
    #[serde(default)]
    pub document_id: Option<String>,
}

/// Arguments for remembering a user-supplied fact.
#[derive(Clone, Debug, Deserialize)]
pub struct AddNoteArgs {
    pub content: String,
}

/// Executes tool calls against the retrieval and ingestion services.
pub struct RagToolset {
    retriever: Retriever,
    pipeline: IngestionPipeline,
}

impl RagToolset {
    pub fn new(retriever: Retriever, pipeline: IngestionPipeline) -> Self {
        Self {
            retriever,
            pipeline,
        }
    }

    /// Answers a grounding search with the matching chunks joined by blank
    /// lines, or the fallback sentence when nothing clears the threshold.
    pub async fn search(&self, args: SearchArgs) -> String {
        let question = args.question.trim();
        if question.is_empty() {
            return NO_GROUNDING_FALLBACK.to_string();
        }

        match self
            .retriever
            .retrieve(question, args.document_id.as_deref())
            .await
        {
            Ok(chunks) if chunks.is_empty() => NO_GROUNDING_FALLBACK.to_string(),
            Ok(chunks) => chunks
                .iter()
                .map(|chunk| chunk.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n"),
            Err(err) => {
                tracing::warn!(error = %err, "grounding search failed");
                NO_GROUNDING_FALLBACK.to_string()
            }
        }
    }

    /// Returns the full text of the selected document, or the placeholder
    /// sentence when no document is selected or the lookup fails.
    pub async fn summarize(&self, args: SummarizeArgs) -> String {
        match self.retriever.summarize(args.document_id.as_deref()).await {
            Ok(text) if text.is_empty() => NO_DOCUMENT_SELECTED.to_string(),
            Ok(text) => text,
            Err(RagError::InvalidDocument(_)) => NO_DOCUMENT_SELECTED.to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "document summary failed");
                NO_DOCUMENT_SELECTED.to_string()
            }
        }
    }

    /// Stores a user-supplied fact for future retrieval.
    ///
    /// Unlike search, validation problems here are reported back in words:
    /// the assistant should tell the user their note was empty, not shrug.
    pub async fn add_note(&self, args: AddNoteArgs) -> String {
        match self.pipeline.ingest_note(&args.content).await {
            Ok(IngestOutcome::Ingested { chunk_count, .. }) => {
                format!("Noted ({chunk_count} facts stored).")
            }
            Ok(IngestOutcome::Skipped { reason, .. }) => {
                format!("Could not store that note: {reason}.")
            }
            Err(RagError::InvalidDocument(reason)) => {
                format!("Could not store that note: {reason}.")
            }
            Err(err) => {
                tracing::warn!(error = %err, "note ingestion failed");
                "Could not store that note right now.".to_string()
            }
        }
    }

    /// Lists stored documents as `id — title` lines for selection prompts.
    pub async fn list_documents(&self) -> String {
        match self.retriever.documents().await {
            Ok(docs) if docs.is_empty() => "No documents ingested yet.".to_string(),
            Ok(docs) => docs
                .iter()
                .map(|doc| format!("{} — {}", doc.id, doc.title))
                .collect::<Vec<_>>()
                .join("\n"),
            Err(err) => {
                tracing::warn!(error = %err, "document listing failed");
                "No documents ingested yet.".to_string()
            }
        }
    }
}
