//! Adapter from rig embedding providers to the crate's [`Embedder`] seam.

use async_trait::async_trait;
use rig::embeddings::embedding::EmbeddingModel;

use super::Embedder;
use crate::types::RagError;

/// Wraps any [`rig::embeddings::embedding::EmbeddingModel`] so production
/// providers (Gemini `text-embedding-004` at 768 dimensions in the reference
/// deployment) plug into the pipeline without the pipeline knowing about rig.
#[derive(Clone)]
pub struct RigEmbedder<M> {
    model: M,
}

impl<M> RigEmbedder<M>
where
    M: EmbeddingModel,
{
    /// Wraps a rig embedding model.
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<M> Embedder for RigEmbedder<M>
where
    M: EmbeddingModel + Send + Sync,
{
    fn dims(&self) -> usize {
        self.model.ndims()
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let mut embeddings = self
            .model
            .embed_texts(vec![text.to_string()])
            .await
            .map_err(|err| RagError::Embedding(err.to_string()))?;
        let embedding = embeddings
            .pop()
            .ok_or_else(|| RagError::Embedding("provider returned no embedding".into()))?;
        Ok(embedding.vec.into_iter().map(|v| v as f32).collect())
    }

    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let embeddings = self
            .model
            .embed_texts(texts.to_vec())
            .await
            .map_err(|err| RagError::Embedding(err.to_string()))?;
        if embeddings.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "provider returned {} embeddings for {} inputs",
                embeddings.len(),
                texts.len()
            )));
        }
        Ok(embeddings
            .into_iter()
            .map(|embedding| embedding.vec.into_iter().map(|v| v as f32).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rig::embeddings::embedding::{Embedding, EmbeddingError};

    #[derive(Clone)]
    struct HashModel;

    impl EmbeddingModel for HashModel {
        const MAX_DOCUMENTS: usize = 64;

        type Client = ();

        fn make(_client: &Self::Client, _model: impl Into<String>, _dims: Option<usize>) -> Self {
            HashModel
        }

        fn ndims(&self) -> usize {
            8
        }

        fn embed_texts(
            &self,
            texts: impl IntoIterator<Item = String> + Send,
        ) -> impl std::future::Future<Output = Result<Vec<Embedding>, EmbeddingError>> + Send
        {
            let docs: Vec<String> = texts.into_iter().collect();
            async move {
                Ok(docs
                    .into_iter()
                    .map(|document| Embedding {
                        vec: hash_to_vec(&document),
                        document,
                    })
                    .collect())
            }
        }
    }

    fn hash_to_vec(text: &str) -> Vec<f64> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();
        (0..8)
            .map(|i| {
                let bits = seed.rotate_left((i * 8) as u32);
                (bits as f64) / (u64::MAX as f64)
            })
            .collect()
    }

    #[tokio::test]
    async fn adapter_reports_model_dimensions() {
        let embedder = RigEmbedder::new(HashModel);
        assert_eq!(embedder.dims(), 8);
    }

    #[tokio::test]
    async fn batch_stays_index_aligned() {
        let embedder = RigEmbedder::new(HashModel);
        let texts = vec!["first".to_string(), "second".to_string()];
        let batch = embedder.embed_many(&texts).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], embedder.embed_one("first").await.unwrap());
        assert_eq!(batch[1], embedder.embed_one("second").await.unwrap());
    }
}
