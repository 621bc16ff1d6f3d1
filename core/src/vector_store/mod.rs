pub mod in_memory_vec_store;

pub use in_memory_vec_store::InMemoryDocumentStore;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::{
    document::DocumentEntry,
    embeddings::{EmbedderError, EmbeddingModel},
    retriever::ScoredDocument,
};

#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Dimension mismatch: store holds {expected}-dimensional vectors, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(#[from] EmbedderError),
    #[error("Degenerate vector: {0}")]
    DegenerateVector(String),
}

/// Why a text passed to [`DocumentStore::add_documents`] wasn't stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The text was empty or whitespace only
    EmptyText,
    /// The provider returned a zero-norm or non-finite vector for it
    DegenerateVector,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDocument {
    /// Position of the text in the batch passed in
    pub index: usize,
    pub reason: SkipReason,
}

/// Outcome of one ingestion batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Documents appended by this call
    pub added: usize,
    /// Corpus size after this call
    pub total: usize,
    pub skipped: Vec<SkippedDocument>,
}

/// Ordered storage of embedded documents.
///
/// Implementations keep insertion order, pin the vector width at the first
/// ingestion, and never expose a half-applied batch to readers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Embed `texts` with `model` in one batch and append the results in input order.
    ///
    /// Empty texts and degenerate vectors are skipped per item and reported.
    /// Provider failures and dimension mismatches reject the whole batch.
    async fn add_documents(
        &self,
        model: &dyn EmbeddingModel,
        texts: &[String],
    ) -> Result<IngestReport, VectorStoreError>;

    async fn list_documents(&self) -> Vec<DocumentEntry>;

    /// Rank the stored documents against an already embedded query.
    async fn query(
        &self,
        query: &[f64],
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, VectorStoreError>;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// The pinned vector width, `None` until the first batch is stored.
    async fn dimension(&self) -> Option<usize>;

    /// Drop every stored document. Ids keep counting from where they were.
    async fn clear(&self);
}

pub(crate) fn euclidean_norm(vector: &[f64]) -> f64 {
    vector.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// A vector can be scored only if its norm is finite and non-zero.
pub(crate) fn is_degenerate(norm: f64) -> bool {
    !norm.is_finite() || norm == 0.0
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Cosine similarity with both norms supplied, clamped into `[-1, 1]`.
pub(crate) fn cosine_with_norms(a: &[f64], a_norm: f64, b: &[f64], b_norm: f64) -> f64 {
    (dot(a, b) / (a_norm * b_norm)).clamp(-1.0, 1.0)
}

/// Cosine similarity of two equal length vectors, `None` if either has zero norm.
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Option<f64> {
    let (a_norm, b_norm) = (euclidean_norm(a), euclidean_norm(b));
    if a.len() != b.len() || is_degenerate(a_norm) || is_degenerate(b_norm) {
        return None;
    }
    Some(cosine_with_norms(a, a_norm, b, b_norm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let same = cosine_similarity(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((same - 1.0).abs() < 1e-12);

        let opposite = cosine_similarity(&[1.0, 0.0], &[-3.0, 0.0]).unwrap();
        assert!((opposite + 1.0).abs() < 1e-12);

        let orthogonal = cosine_similarity(&[1.0, 0.0], &[0.0, 5.0]).unwrap();
        assert!(orthogonal.abs() < 1e-12);
    }

    #[test]
    fn test_cosine_similarity_undefined() {
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).is_none());
        assert!(cosine_similarity(&[1.0, 1.0], &[1.0]).is_none());
        assert!(cosine_similarity(&[f64::NAN, 1.0], &[1.0, 1.0]).is_none());
    }
}
