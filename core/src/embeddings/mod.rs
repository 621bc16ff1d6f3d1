pub mod model;

pub use model::{EmbeddingModel, TimeoutEmbedding};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum EmbedderError {
    #[error("RequestError: {0}")]
    RequestError(String),
    #[error("ParseError: {0}")]
    ParseError(String),
    #[error("Provider error -> HTTP Status {status}: {body}")]
    ProviderError { status: u16, body: String },
    #[error("Provider returned {found} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, found: usize },
    #[error("Embedding request timed out after {0}ms")]
    Timeout(u64),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
