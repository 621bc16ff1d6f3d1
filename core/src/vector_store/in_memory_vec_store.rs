use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::{
    euclidean_norm, is_degenerate, DocumentStore, IngestReport, SkipReason, SkippedDocument,
    VectorStoreError,
};
use crate::{
    document::{Document, DocumentEntry},
    embeddings::{EmbedderError, EmbeddingModel},
    retriever::{self, ScoredDocument},
};

/// Documents, pinned width and id counter live behind one lock so a reader
/// always sees them in agreement.
#[derive(Debug)]
struct Corpus {
    documents: Vec<Document>,
    dimension: Option<usize>,
    next_id: usize,
}

impl Default for Corpus {
    fn default() -> Self {
        Self {
            documents: Vec::new(),
            dimension: None,
            next_id: 1,
        }
    }
}

/// A single process, append only document store.
///
/// Embedding happens before the write lock is taken, so a slow provider never
/// blocks readers. Validation and append of a batch happen under one write
/// lock, so a batch is either fully visible or not at all.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    corpus: RwLock<Corpus>,
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A clone of the current documents, in insertion order.
    pub async fn snapshot(&self) -> Vec<Document> {
        self.corpus.read().await.documents.clone()
    }
}

/// Checks every vector in the batch against the pinned width, or against the
/// first vector of the batch when nothing is pinned yet.
fn batch_dimension(
    pinned: Option<usize>,
    vectors: &[Vec<f64>],
) -> Result<usize, VectorStoreError> {
    let Some(first) = vectors.first() else {
        return Err(VectorStoreError::ProviderUnavailable(
            EmbedderError::CountMismatch {
                expected: 1,
                found: 0,
            },
        ));
    };
    let expected = pinned.unwrap_or(first.len());
    if expected == 0 {
        return Err(VectorStoreError::DegenerateVector(
            "provider returned zero-width embeddings".to_string(),
        ));
    }
    match vectors.iter().find(|v| v.len() != expected) {
        Some(v) => Err(VectorStoreError::DimensionMismatch {
            expected,
            found: v.len(),
        }),
        None => Ok(expected),
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    #[instrument(skip_all, fields(batch = texts.len()))]
    async fn add_documents(
        &self,
        model: &dyn EmbeddingModel,
        texts: &[String],
    ) -> Result<IngestReport, VectorStoreError> {
        let mut skipped = vec![];
        let mut accepted_idx = vec![];
        let mut accepted = vec![];
        for (index, text) in texts.iter().enumerate() {
            if text.trim().is_empty() {
                debug!("Rejecting empty document at position {index}");
                skipped.push(SkippedDocument {
                    index,
                    reason: SkipReason::EmptyText,
                });
            } else {
                accepted_idx.push(index);
                accepted.push(text.clone());
            }
        }

        if accepted.is_empty() {
            let total = self.len().await;
            return Ok(IngestReport {
                added: 0,
                total,
                skipped,
            });
        }

        let vectors = model.embed(&accepted).await?;
        if vectors.len() != accepted.len() {
            return Err(VectorStoreError::ProviderUnavailable(
                EmbedderError::CountMismatch {
                    expected: accepted.len(),
                    found: vectors.len(),
                },
            ));
        }
        let norms: Vec<f64> = vectors.iter().map(|v| euclidean_norm(v)).collect();

        let mut corpus = self.corpus.write().await;
        let dimension = batch_dimension(corpus.dimension, &vectors)?;

        let mut added = 0;
        for (((index, text), vector), norm) in accepted_idx
            .into_iter()
            .zip(accepted)
            .zip(vectors)
            .zip(norms)
        {
            if is_degenerate(norm) {
                warn!("Skipping document at position {index}: embedding has norm {norm}");
                skipped.push(SkippedDocument {
                    index,
                    reason: SkipReason::DegenerateVector,
                });
                continue;
            }
            let id = corpus.next_id;
            corpus.next_id += 1;
            corpus.documents.push(Document::new(id, text, vector, norm));
            added += 1;
        }
        if added > 0 && corpus.dimension.is_none() {
            info!("Pinned store dimension to {dimension}");
            corpus.dimension = Some(dimension);
        }
        skipped.sort_by_key(|s| s.index);

        let total = corpus.documents.len();
        info!("Added {added} documents. Total: {total}");
        Ok(IngestReport {
            added,
            total,
            skipped,
        })
    }

    async fn list_documents(&self) -> Vec<DocumentEntry> {
        self.corpus
            .read()
            .await
            .documents
            .iter()
            .map(Document::entry)
            .collect()
    }

    async fn query(
        &self,
        query: &[f64],
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, VectorStoreError> {
        let corpus = self.corpus.read().await;
        retriever::query(&corpus.documents, query, top_k)
    }

    async fn len(&self) -> usize {
        self.corpus.read().await.documents.len()
    }

    async fn dimension(&self) -> Option<usize> {
        self.corpus.read().await.dimension
    }

    async fn clear(&self) {
        let mut corpus = self.corpus.write().await;
        info!("Clearing {} documents", corpus.documents.len());
        corpus.documents.clear();
    }
}
