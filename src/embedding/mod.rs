//! Embedding provider boundary.
//!
//! The embedding model is an external collaborator: an opaque function from
//! text to a fixed-dimension vector, with a batch variant aligned
//! index-for-index with its input. [`RigEmbedder`] adapts any rig provider to
//! this seam; [`MockEmbedder`] is a deterministic stand-in for tests and
//! offline runs.

mod rig;

pub use rig::RigEmbedder;

use async_trait::async_trait;

use crate::types::RagError;

/// Opaque text-to-vector collaborator.
///
/// Batch calls have no partial-result contract: a provider failure fails the
/// whole batch.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Output dimensionality; constant for a given model.
    fn dims(&self) -> usize;

    /// Embeds one text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, RagError>;

    /// Embeds a batch; the result is index-aligned with `texts`.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;
}

/// Normalizes a user query before embedding.
///
/// Newline control characters (and the literal two-character `\n` sequence
/// that chat layers sometimes pass through verbatim) become spaces, so a
/// crafted question cannot smuggle formatting into the embedding input.
#[must_use]
pub fn normalize_query(input: &str) -> String {
    input
        .replace("\\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

/// Deterministic hash-seeded embedder.
///
/// The vector for a given text is stable across runs and processes, distinct
/// texts map to distinct vectors with overwhelming probability, and no
/// network is involved.
#[derive(Clone, Debug)]
pub struct MockEmbedder {
    dims: usize,
}

impl MockEmbedder {
    /// Creates a mock embedder producing vectors of `dims` components.
    #[must_use]
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();
        (0..self.dims)
            .map(|i| {
                let bits = seed.rotate_left((i % 64) as u32) ^ ((i as u64) << 17);
                (bits as f32) / (u64::MAX as f32) - 0.5
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, RagError> {
        Ok(self.vector_for(text))
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts.iter().map(|text| self.vector_for(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_embeddings_are_deterministic() {
        let embedder = MockEmbedder::new(8);
        let texts = vec![
            "hello world".to_string(),
            "goodbye world".to_string(),
            "hello world".to_string(),
        ];

        let first = embedder.embed_many(&texts).await.unwrap();
        let second = embedder.embed_many(&texts).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0], first[2]);
        assert_ne!(first[0], first[1]);
        assert!(first.iter().all(|v| v.len() == 8));
    }

    #[tokio::test]
    async fn batch_is_index_aligned_with_single_calls() {
        let embedder = MockEmbedder::new(4);
        let texts = vec!["a".to_string(), "b".to_string()];
        let batch = embedder.embed_many(&texts).await.unwrap();
        assert_eq!(batch[0], embedder.embed_one("a").await.unwrap());
        assert_eq!(batch[1], embedder.embed_one("b").await.unwrap());
    }

    #[test]
    fn normalize_strips_newlines_and_literal_escapes() {
        assert_eq!(
            normalize_query("what\nis\rthis\\nthing"),
            "what is this thing"
        );
        assert_eq!(normalize_query("  plain question  "), "plain question");
    }
}
