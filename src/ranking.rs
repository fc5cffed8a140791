//! Cosine-similarity ranking of stored chunks against a query embedding.
//!
//! Scores are expressed as `1 − cosine distance`. Downstream thresholds are
//! tuned against that exact transform, so it must not be swapped for raw
//! cosine similarity or a renormalized variant.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// One stored embedding with the text and owning document it came from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candidate {
    /// Identifier of the document the chunk belongs to.
    pub document_id: String,
    /// Chunk text.
    pub content: String,
    /// Stored embedding vector.
    pub embedding: Vec<f32>,
}

/// A chunk that cleared the threshold, with its similarity score.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankedChunk {
    /// Identifier of the owning document.
    pub document_id: String,
    /// Chunk text.
    pub content: String,
    /// `1 − cosine distance` to the query; 1.0 means identical direction.
    pub score: f32,
}

/// Threshold and result cap for one ranking call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankingPolicy {
    /// Minimum score a candidate must reach to be returned.
    pub min_score: f32,
    /// Maximum number of results.
    pub limit: usize,
}

impl RankingPolicy {
    /// Policy for searching the whole store.
    #[must_use]
    pub const fn unscoped() -> Self {
        Self {
            min_score: 0.6,
            limit: 4,
        }
    }

    /// Policy for searching within a single document. The threshold is
    /// relaxed because relevant matches score lower on average in a narrow
    /// pool.
    #[must_use]
    pub const fn scoped() -> Self {
        Self {
            min_score: 0.55,
            limit: 4,
        }
    }
}

/// Cosine distance between two vectors, in `[0, 2]`.
///
/// Zero-norm vectors are treated as maximally distant from everything, which
/// keeps degenerate embeddings out of every result set.
#[must_use]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (lhs, rhs) in a.iter().zip(b) {
        dot += lhs * rhs;
        norm_a += lhs * lhs;
        norm_b += rhs * rhs;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Similarity score used for ranking: `1 − cosine distance`.
#[must_use]
pub fn similarity(query: &[f32], candidate: &[f32]) -> f32 {
    1.0 - cosine_distance(query, candidate)
}

/// Scores `pool` against `query` and returns the matches above
/// `policy.min_score`, ordered by descending score and capped at
/// `policy.limit`.
///
/// When `scope` is set, candidates from other documents are excluded before
/// scoring. Equal scores keep their pool order (the sort is stable), so
/// repeated calls over the same pool return an identical sequence. An empty
/// result is a normal outcome, not an error.
#[must_use]
pub fn rank(
    query: &[f32],
    pool: &[Candidate],
    policy: RankingPolicy,
    scope: Option<&str>,
) -> Vec<RankedChunk> {
    let mut scored: Vec<RankedChunk> = pool
        .iter()
        .filter(|candidate| scope.is_none_or(|doc| candidate.document_id == doc))
        .map(|candidate| RankedChunk {
            document_id: candidate.document_id.clone(),
            content: candidate.content.clone(),
            score: similarity(query, &candidate.embedding),
        })
        .filter(|ranked| ranked.score >= policy.min_score)
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(policy.limit);
    scored
}
