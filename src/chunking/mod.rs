//! Text chunking strategies.
//!
//! Two deliberately distinct strategies are provided rather than one merged
//! implementation, because they trade off differently:
//!
//! * [`ParagraphChunker`] — paragraph-aware overlapping windows; heavier but
//!   robust, used when ingesting whole documents.
//! * [`SentenceChunker`] — naive period splitting; lossy on abbreviations but
//!   cheap, used for short ad hoc notes where window chunking is overhead.

mod paragraph;
mod sentence;

pub use paragraph::ParagraphChunker;
pub use sentence::SentenceChunker;

use crate::types::RagError;

/// A strategy for splitting raw text into embeddable chunks.
///
/// Implementations must produce a finite, document-ordered sequence that
/// never contains an empty or whitespace-only string.
pub trait Chunker: Send + Sync {
    /// Splits `text` into chunks.
    fn chunk(&self, text: &str) -> Result<Vec<String>, RagError>;

    /// Name of this strategy, for logging.
    fn name(&self) -> &'static str;
}
