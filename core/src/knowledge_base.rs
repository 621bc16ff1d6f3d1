use tracing::{debug, info, instrument};

use crate::{
    config::EngineConfig,
    document::DocumentEntry,
    embeddings::{EmbeddingModel, TimeoutEmbedding},
    retriever::ScoredDocument,
    samples::SAMPLE_DOCUMENTS,
    vector_store::{DocumentStore, IngestReport, SkipReason, VectorStoreError},
};

/// The retrieval engine: a document store paired with the embedding model that
/// feeds it.
///
/// Build one at startup and share it (usually as an `Arc`) with whatever
/// needs it. Every provider call goes through a timeout taken from the
/// [`EngineConfig`].
pub struct KnowledgeBase<S: DocumentStore, M: EmbeddingModel> {
    store: S,
    model: TimeoutEmbedding<M>,
    config: EngineConfig,
}

impl<S: DocumentStore, M: EmbeddingModel> KnowledgeBase<S, M> {
    pub fn new(store: S, model: M, config: EngineConfig) -> Self {
        let model = TimeoutEmbedding::new(model, config.embed_timeout());
        Self {
            store,
            model,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Embed and store a batch of texts, see [`DocumentStore::add_documents`].
    ///
    /// # Errors
    /// Fails if the provider fails or times out, or if the batch width
    /// disagrees with the store. Nothing from the batch is stored in that case.
    #[instrument(skip_all, fields(batch = texts.len()))]
    pub async fn add_documents(&self, texts: &[String]) -> Result<IngestReport, VectorStoreError> {
        self.store.add_documents(&self.model, texts).await
    }

    /// Store one document and return the new corpus size.
    ///
    /// # Errors
    /// Same as [`Self::add_documents`], plus [`VectorStoreError::Validation`] for
    /// an empty text and [`VectorStoreError::DegenerateVector`] if it embeds to
    /// a zero vector.
    pub async fn add_document(&self, text: &str) -> Result<usize, VectorStoreError> {
        let report = self.add_documents(&[text.to_string()]).await?;
        match report.skipped.first().map(|s| s.reason) {
            Some(SkipReason::EmptyText) => Err(VectorStoreError::Validation(
                "document text must not be empty".to_string(),
            )),
            Some(SkipReason::DegenerateVector) => Err(VectorStoreError::DegenerateVector(
                "document embedded to a zero-norm vector".to_string(),
            )),
            None => Ok(report.total),
        }
    }

    /// Return the `top_k` stored documents most similar to `question`.
    ///
    /// `None` falls back to the configured default. An empty store returns an
    /// empty result without calling the provider.
    ///
    /// # Errors
    /// Fails on `top_k == 0`, on provider failure, or if the question embeds to
    /// a degenerate or wrongly sized vector.
    #[instrument(skip(self))]
    pub async fn query(
        &self,
        question: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<ScoredDocument>, VectorStoreError> {
        let top_k = top_k.unwrap_or(self.config.default_top_k());
        if top_k == 0 {
            return Err(VectorStoreError::Validation(
                "top_k must be at least 1".to_string(),
            ));
        }
        if self.store.is_empty().await {
            debug!("Query against an empty store");
            return Ok(vec![]);
        }
        let vector = self.model.embed_one(question).await?;
        self.store.query(&vector, top_k).await
    }

    pub async fn list_documents(&self) -> Vec<DocumentEntry> {
        self.store.list_documents().await
    }

    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.store.is_empty().await
    }

    pub async fn clear(&self) {
        self.store.clear().await;
    }

    /// Load the bundled [`SAMPLE_DOCUMENTS`].
    ///
    /// # Errors
    /// Same as [`Self::add_documents`].
    pub async fn seed_samples(&self) -> Result<IngestReport, VectorStoreError> {
        let samples: Vec<String> = SAMPLE_DOCUMENTS.iter().map(ToString::to_string).collect();
        let report = self.add_documents(&samples).await?;
        info!("Seeded knowledge base with {} sample documents", report.added);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        embeddings::EmbedderError, providers::embeddings::HashingEmbedding,
        vector_store::InMemoryDocumentStore,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn hashing_kb() -> KnowledgeBase<InMemoryDocumentStore, HashingEmbedding> {
        KnowledgeBase::new(
            InMemoryDocumentStore::new(),
            HashingEmbedding::new(None).unwrap(),
            EngineConfig::default(),
        )
    }

    struct FailingModel {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingModel for FailingModel {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(EmbedderError::ProviderError {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_sky_is_blue() {
        let kb = hashing_kb();
        let texts: Vec<String> = ["the sky is blue", "the grass is green", "bananas are yellow"]
            .iter()
            .map(ToString::to_string)
            .collect();
        kb.add_documents(&texts).await.unwrap();

        let results = kb.query("what color is the sky", Some(2)).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.text, "the sky is blue");
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].rank, 2);
    }

    #[tokio::test]
    async fn test_default_top_k() {
        let kb = hashing_kb();
        kb.seed_samples().await.unwrap();
        let results = kb.query("open-source database", None).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_add_document() {
        let kb = hashing_kb();
        assert_eq!(kb.add_document("X").await.unwrap(), 1);
        assert_eq!(kb.add_document("Y").await.unwrap(), 2);
        assert!(matches!(
            kb.add_document("   ").await,
            Err(VectorStoreError::Validation(_))
        ));
        assert!(matches!(
            kb.add_document("...").await,
            Err(VectorStoreError::DegenerateVector(_))
        ));
        assert_eq!(
            kb.list_documents().await,
            vec![DocumentEntry::new(1, "X"), DocumentEntry::new(2, "Y")]
        );
    }

    #[tokio::test]
    async fn test_empty_store_skips_provider() {
        let kb = KnowledgeBase::new(
            InMemoryDocumentStore::new(),
            FailingModel {
                calls: AtomicUsize::new(0),
            },
            EngineConfig::default(),
        );
        let results = kb.query("anything", Some(5)).await.unwrap();
        assert!(results.is_empty());
        assert!(matches!(
            kb.query("anything", Some(0)).await,
            Err(VectorStoreError::Validation(_))
        ));

        let result = kb.add_document("hello").await;
        assert!(matches!(
            result,
            Err(VectorStoreError::ProviderUnavailable(
                EmbedderError::ProviderError { status: 503, .. }
            ))
        ));
        assert!(kb.is_empty().await);
        assert_eq!(kb.model.inner().calls.load(Ordering::SeqCst), 1);
    }
}
