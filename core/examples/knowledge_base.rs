use std::sync::Arc;

use ragframe::prelude::*;
use ragframe::providers::embeddings::{HashingEmbedding, OpenAIEmbedding};
use ragframe::tools::ToolCall;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SEPARATOR: &str = "============================================================";

/// Seeds a knowledge base with the sample corpus and drives it through the rag tools.
async fn run<M: EmbeddingModel + 'static>(model: M) -> Result<(), ragframe::error::Error> {
    let config = EngineConfig::from_json(std::env::var("RAGFRAME_ENGINE_CONFIG").ok().as_deref())?;
    let kb = Arc::new(KnowledgeBase::new(InMemoryDocumentStore::new(), model, config));
    let report = kb.seed_samples().await?;
    info!("Documents loaded: {}", report.total);

    let tools = rag_toolset(kb)?;
    for (i, name) in tools.names().iter().enumerate() {
        info!("  {}. {name}", i + 1);
    }

    let calls = [
        ("rag_query", r#"{"question": "What is Python?", "top_k": 3}"#),
        ("rag_query", r#"{"question": "How do containers work?", "top_k": 3}"#),
        ("rag_query", r#"{"question": "What is RAG and how does it work?"}"#),
        (
            "rag_add_document",
            r#"{"document": "Streamlit is a Python framework for building interactive data science web applications quickly."}"#,
        ),
        ("rag_query", r#"{"question": "How to build data science web apps?", "top_k": 3}"#),
        ("rag_list_documents", "{}"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, arguments))| ToolCall {
        id: format!("call_{i}"),
        name: (*name).to_string(),
        arguments: (*arguments).to_string(),
    })
    .collect::<Vec<_>>();

    for response in tools.run(&calls).await? {
        info!("\n{SEPARATOR}\n  {} ({})\n{SEPARATOR}\n", response.name, response.id);
        info!("{}", response.content.as_str().unwrap_or_default());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), ragframe::error::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Uses OpenAI when its key is present, the offline hashing model otherwise
    if std::env::var("RAGFRAME_OPENAI_API_KEY").is_ok() {
        run(OpenAIEmbedding::new(None)?).await
    } else {
        run(HashingEmbedding::new(None)?).await
    }
}
