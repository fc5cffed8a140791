//! Chunking, embedding storage, and similarity retrieval for a
//! retrieval-augmented essay assistant.
//!
//! ```text
//! URL ──► ingestion::IngestionPipeline ──► extract::Extractor
//!                      │                        │
//!                      │          chunking::ParagraphChunker / SentenceChunker
//!                      │                        │
//!                      └──► embedding::Embedder (batched per document)
//!                                               │
//!                                               ▼
//!                               store::VectorStore (SQLite + sqlite-vec)
//!                                               │
//! Question ──► retrieval::Retriever ──► ranking::rank (cosine similarity)
//!                                               │
//!                                               ▼
//!                            tool::RagToolset ──► grounding text / fallbacks
//! ```
//!
//! The crate is organised around three seams: [`extract::Extractor`] for
//! turning fetched markup into prose, [`embedding::Embedder`] for the vector
//! provider, and [`store::VectorStore`] for persistence. Everything between
//! them is deterministic and synchronous where possible, so the interesting
//! behaviour (windowing, ranking, thresholds) is unit-testable without a
//! network or a database.

pub mod chunking;
pub mod config;
pub mod embedding;
pub mod extract;
pub mod ingestion;
pub mod ranking;
pub mod retrieval;
pub mod store;
pub mod tool;
pub mod types;

pub use chunking::{Chunker, ParagraphChunker, SentenceChunker};
pub use config::{NO_DOCUMENT_SELECTED, NO_GROUNDING_FALLBACK, RagConfig};
pub use embedding::{Embedder, MockEmbedder, RigEmbedder, normalize_query};
pub use extract::{DensestBlockExtractor, Extractor, PlainTextExtractor};
pub use ingestion::{IngestOutcome, IngestionPipeline};
pub use ranking::{Candidate, RankedChunk, RankingPolicy, rank};
pub use retrieval::Retriever;
pub use store::{ChunkInsert, ChunkRow, DocumentRow, NewDocument, SqliteRagStore, VectorStore};
pub use tool::{AddNoteArgs, RagToolset, SearchArgs, SummarizeArgs};
pub use types::RagError;
