use crate::{
    config::ConfigError,
    embeddings::EmbedderError,
    tools::{ToolError, ToolSetError},
    vector_store::VectorStoreError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("ToolSet error: {0}")]
    ToolSet(#[from] ToolSetError),
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
    #[error("VectorStore error: {0}")]
    VectorStore(#[from] VectorStoreError),
    #[error("Embedder error: {0}")]
    Embedder(#[from] EmbedderError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
