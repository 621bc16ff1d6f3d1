pub use crate::config::EngineConfig;
pub use crate::document::{Document, DocumentEntry};
pub use crate::embeddings::EmbeddingModel;
pub use crate::knowledge_base::KnowledgeBase;
pub use crate::retriever::ScoredDocument;
pub use crate::tools::{rag::rag_toolset, Tool, ToolSet};
pub use crate::vector_store::{DocumentStore, InMemoryDocumentStore, IngestReport};
