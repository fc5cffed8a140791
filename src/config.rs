//! Pipeline configuration.
//!
//! All tunables live in one [`RagConfig`] value that the process entry point
//! constructs and hands to each component; no component reads global state on
//! its own.

use crate::types::RagError;

/// Fixed reply used when retrieval finds no grounding content.
pub const NO_GROUNDING_FALLBACK: &str = "Sorry, I don't know.";

/// Placeholder returned when a summary is requested without a document scope.
pub const NO_DOCUMENT_SELECTED: &str = "No document selected.";

/// Configuration for chunking, ranking, and embedding dimensionality.
///
/// The defaults mirror the deployed reference setup: 1100-character chunks
/// with a 150-character overlap, 768-dimension embeddings, and up to four
/// retrieved chunks per question.
#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Target chunk size in characters.
    pub chunk_target: usize,
    /// Overlap between consecutive windows of a long paragraph, in characters.
    /// Must be strictly smaller than `chunk_target`.
    pub chunk_overlap: usize,
    /// Embedding dimensionality; constant across the whole store.
    pub dims: usize,
    /// Maximum number of chunks returned by a retrieval call.
    pub top_k: usize,
    /// Minimum similarity score for unscoped retrieval.
    pub min_score: f32,
    /// Relaxed minimum for retrieval scoped to a single document. The pool is
    /// smaller there and relevant matches score lower on average.
    pub min_score_scoped: f32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_target: 1100,
            chunk_overlap: 150,
            dims: 768,
            top_k: 4,
            min_score: 0.6,
            min_score_scoped: 0.55,
        }
    }
}

impl RagConfig {
    /// Creates a configuration with the reference defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for custom configuration.
    #[must_use]
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::new()
    }

    /// Checks the cross-field invariants.
    ///
    /// `chunk_overlap >= chunk_target` would allow non-advancing windows, and
    /// a scoped threshold above the unscoped one inverts the two retrieval
    /// modes, so both are rejected here rather than at first use.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_target == 0 {
            return Err(RagError::InvalidConfig(
                "chunk_target must be positive".into(),
            ));
        }
        if self.chunk_overlap >= self.chunk_target {
            return Err(RagError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_target ({})",
                self.chunk_overlap, self.chunk_target
            )));
        }
        if self.min_score_scoped > self.min_score {
            return Err(RagError::InvalidConfig(format!(
                "scoped threshold ({}) must not exceed unscoped threshold ({})",
                self.min_score_scoped, self.min_score
            )));
        }
        if self.dims == 0 {
            return Err(RagError::InvalidConfig("dims must be positive".into()));
        }
        Ok(())
    }
}

/// Builder for [`RagConfig`].
#[derive(Debug, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Creates a builder seeded with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RagConfig::default(),
        }
    }

    /// Sets the target chunk size in characters.
    #[must_use]
    pub const fn chunk_target(mut self, chars: usize) -> Self {
        self.config.chunk_target = chars;
        self
    }

    /// Sets the overlap between consecutive chunk windows.
    #[must_use]
    pub const fn chunk_overlap(mut self, chars: usize) -> Self {
        self.config.chunk_overlap = chars;
        self
    }

    /// Sets the embedding dimensionality.
    #[must_use]
    pub const fn dims(mut self, dims: usize) -> Self {
        self.config.dims = dims;
        self
    }

    /// Sets the retrieval result cap.
    #[must_use]
    pub const fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    /// Sets the unscoped similarity threshold.
    #[must_use]
    pub const fn min_score(mut self, score: f32) -> Self {
        self.config.min_score = score;
        self
    }

    /// Sets the scoped similarity threshold.
    #[must_use]
    pub const fn min_score_scoped(mut self, score: f32) -> Self {
        self.config.min_score_scoped = score;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<RagConfig, RagError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
