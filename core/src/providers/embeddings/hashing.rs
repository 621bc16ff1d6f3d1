use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    config::ConfigError,
    embeddings::{EmbedderError, EmbeddingModel},
};

const DEFAULT_DIMENSIONS: usize = 384;
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct ModelConfig {
    dimensions: Option<usize>,
}

/// An offline, deterministic bag-of-words embedding.
///
/// Each lowercase alphanumeric token is hashed (FNV-1a) into one of
/// `dimensions` buckets with a hash derived sign, and the result is L2
/// normalized. Texts sharing words land close together, which is enough for
/// tests, demos and keyword-ish retrieval without a network round trip.
///
/// A text with no tokens embeds to the zero vector, which document stores
/// reject as degenerate.
///
/// # Supported Configuration
///
/// - `dimensions`(optional): output width, defaults to 384
#[derive(Debug, Clone)]
pub struct HashingEmbedding {
    dimensions: usize,
}

impl HashingEmbedding {
    /// # Errors
    /// This function will error if:
    ///  - The provided JSON is malformed or contains unknown fields
    ///  - `dimensions` is zero
    #[instrument]
    pub fn new(json_config: Option<&str>) -> Result<Self, ConfigError> {
        let config = match json_config {
            Some(json) => serde_json::from_str::<ModelConfig>(json)?,
            None => ModelConfig::default(),
        };
        Self::with_dimensions(config.dimensions.unwrap_or(DEFAULT_DIMENSIONS))
    }

    /// # Errors
    /// Fails if `dimensions` is zero.
    pub fn with_dimensions(dimensions: usize) -> Result<Self, ConfigError> {
        if dimensions == 0 {
            return Err(ConfigError::Invalid(
                "`dimensions` must be at least 1".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[allow(clippy::cast_possible_truncation)]
    fn embed_text(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.dimensions];
        for token in tokenize(text) {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };
            vector[bucket] += sign;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

#[async_trait]
impl EmbeddingModel for HashingEmbedding {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
