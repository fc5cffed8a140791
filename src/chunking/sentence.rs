//! Period-split chunking for short ad hoc content.

use super::Chunker;
use crate::types::RagError;

/// Splits text on sentence-terminating periods, trimming each fragment and
/// dropping empties.
///
/// This is intentionally naive — abbreviations and decimal points will split
/// badly — but for a one- or two-sentence user fact the paragraph/window
/// strategy is pure overhead. Keep it for small inputs only.
#[derive(Debug, Clone, Default)]
pub struct SentenceChunker;

impl SentenceChunker {
    /// Creates a sentence chunker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Chunker for SentenceChunker {
    fn chunk(&self, text: &str) -> Result<Vec<String>, RagError> {
        Ok(text
            .trim()
            .split('.')
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn name(&self) -> &'static str {
        "sentence-split"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_periods_and_trims() {
        let chunks = SentenceChunker::new()
            .chunk("Sentence one. Sentence two. Sentence three.")
            .unwrap();
        assert_eq!(chunks, vec!["Sentence one", "Sentence two", "Sentence three"]);
    }

    #[test]
    fn empty_fragments_are_dropped() {
        let chunks = SentenceChunker::new().chunk("One... Two.").unwrap();
        assert_eq!(chunks, vec!["One", "Two"]);
    }

    #[test]
    fn whitespace_only_input_yields_nothing() {
        assert!(SentenceChunker::new().chunk("   \n ").unwrap().is_empty());
        assert!(SentenceChunker::new().chunk("...").unwrap().is_empty());
    }

    #[test]
    fn text_without_periods_is_one_chunk() {
        let chunks = SentenceChunker::new().chunk("no terminator here").unwrap();
        assert_eq!(chunks, vec!["no terminator here"]);
    }
}
