use std::time::Duration;

use crate::embeddings::EmbedderError;
use async_trait::async_trait;
use tracing::warn;

/// A text embedding provider.
///
/// `embed` is batch shaped: it returns exactly one vector per input, in input
/// order. Implementations must accept single element batches, which is how
/// queries are embedded.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError>;

    /// Embed a single text
    async fn embed_one(&self, text: &str) -> Result<Vec<f64>, EmbedderError> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        if vectors.len() != 1 {
            return Err(EmbedderError::CountMismatch {
                expected: 1,
                found: vectors.len(),
            });
        }
        Ok(vectors.remove(0))
    }
}

/// Wraps an embedding model so every call is bounded by a deadline.
///
/// A call that exceeds the deadline is dropped and reported as
/// [`EmbedderError::Timeout`].
pub struct TimeoutEmbedding<M> {
    inner: M,
    timeout: Duration,
}

impl<M: EmbeddingModel> TimeoutEmbedding<M> {
    pub fn new(inner: M, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

#[async_trait]
impl<M: EmbeddingModel> EmbeddingModel for TimeoutEmbedding<M> {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
        match tokio::time::timeout(self.timeout, self.inner.embed(texts)).await {
            Ok(result) => result,
            Err(_) => {
                #[allow(clippy::cast_possible_truncation)]
                let ms = self.timeout.as_millis() as u64;
                warn!("Embedding call for {} texts timed out after {ms}ms", texts.len());
                Err(EmbedderError::Timeout(ms))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowModel;

    #[async_trait]
    impl EmbeddingModel for SlowModel {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(texts.iter().map(|_| vec![1.0]).collect())
        }
    }

    struct EchoLengthModel;

    #[async_trait]
    impl EmbeddingModel for EchoLengthModel {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
            let vectors = texts.iter().map(|t| vec![t.len() as f64, 1.0]).collect();
            Ok(vectors)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_elapses() {
        let model = TimeoutEmbedding::new(SlowModel, Duration::from_millis(250));
        let result = model.embed(&["hello".to_string()]).await;
        assert!(matches!(result, Err(EmbedderError::Timeout(250))));
    }

    #[tokio::test]
    async fn test_embed_one_passes_through() {
        let model = TimeoutEmbedding::new(EchoLengthModel, Duration::from_secs(1));
        let vector = model.embed_one("four").await.unwrap();
        assert_eq!(vector, vec![4.0, 1.0]);
    }
}
