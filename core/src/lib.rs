//! # Ragframe - Core API Documentation
//!
//! Ragframe is a small, in-memory retrieval engine for building RAG backed tools.
//! Documents are embedded once at ingestion and queried with exact cosine similarity.
//!
//! ## Features
//!
//! - **Modular Architecture** with clearly defined components:
//!   - **Embedding Models**: Batched text embedding providers (OpenAI, offline hashing, Voyage AI)
//!   - **Document Stores**: Ordered, dimension-checked embedding storage
//!   - **Retriever**: Brute-force cosine ranking with deterministic tie-breaking
//!   - **Knowledge Base**: Explicit engine handle pairing a store with an embedding model
//!   - **Tools**: Function calling surface exposing query, add and list operations
//!
//! ## Examples
//!
//! ### Querying a knowledge base
//!
//! ```rust,no_run
//! use ragframe::prelude::*;
//! use ragframe::providers::embeddings::HashingEmbedding;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ragframe::error::Error> {
//!     let kb = KnowledgeBase::new(
//!         InMemoryDocumentStore::new(),
//!         HashingEmbedding::new(None)?,
//!         EngineConfig::default(),
//!     );
//!     kb.add_documents(&["the sky is blue".to_string()]).await?;
//!
//!     for hit in kb.query("what color is the sky", Some(2)).await? {
//!         println!("#{} {:.4} {}", hit.rank, hit.score, hit.document.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Exposing the knowledge base as tools
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ragframe::prelude::*;
//! use ragframe::providers::embeddings::HashingEmbedding;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ragframe::error::Error> {
//!     let kb = Arc::new(KnowledgeBase::new(
//!         InMemoryDocumentStore::new(),
//!         HashingEmbedding::new(None)?,
//!         EngineConfig::default(),
//!     ));
//!     kb.seed_samples().await?;
//!
//!     let tools = rag_toolset(kb)?;
//!     let response = tools
//!         .call("call_0", "rag_query", r#"{"question": "What is Python?", "top_k": 3}"#)
//!         .await?;
//!     println!("{}", response.content);
//!     Ok(())
//! }
//! ```

/// Engine and provider configuration
///
/// JSON backed settings for the knowledge base and the remote embedding providers.
pub mod config;

/// Document representation
///
/// Provides the immutable stored document and its listing form.
pub mod document;

/// Text embeddings support
pub mod embeddings;

/// Error types for all library operations
pub mod error;

/// The engine handle tying a document store to an embedding model
pub mod knowledge_base;

/// Convenience prelude exports
pub mod prelude;

/// Builtin embedding model providers
pub mod providers;

/// Cosine ranking over a corpus snapshot
pub mod retriever;

/// Demo corpus used to seed a fresh knowledge base
pub mod samples;

/// Function calling and tool execution support
pub mod tools;

/// Document storage
pub mod vector_store;
