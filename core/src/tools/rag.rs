//! The knowledge base exposed as three function calling tools:
//! `rag_query`, `rag_add_document` and `rag_list_documents`.
//!
//! Engine failures are rendered into the text result so the caller sees them;
//! only malformed arguments surface as [`ToolError`]s.

use std::{fmt::Write, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{ExecutionStrategy, Tool, ToolArg, ToolError, ToolSet};
use crate::{
    document::DocumentEntry, embeddings::EmbeddingModel, knowledge_base::KnowledgeBase,
    retriever::ScoredDocument, vector_store::DocumentStore,
};

pub const QUERY_TOOL: &str = "rag_query";
pub const ADD_DOCUMENT_TOOL: &str = "rag_add_document";
pub const LIST_DOCUMENTS_TOOL: &str = "rag_list_documents";

const NO_RESULTS: &str = "No documents found in the knowledge base.";
const EMPTY_KNOWLEDGE_BASE: &str = "Knowledge base is empty.";

/// Builds a [`ToolSet`] holding the three knowledge base tools.
///
/// # Errors
/// Fails if an argument schema can't be generated.
pub fn rag_toolset<S, M>(kb: Arc<KnowledgeBase<S, M>>) -> Result<ToolSet, ToolError>
where
    S: DocumentStore + 'static,
    M: EmbeddingModel + 'static,
{
    let tools: Vec<Box<dyn Tool>> = vec![
        Box::new(RagQueryTool::new(kb.clone())?),
        Box::new(RagAddDocumentTool::new(kb.clone())?),
        Box::new(RagListDocumentsTool::new(kb)),
    ];
    Ok(ToolSet(tools, ExecutionStrategy::FailEarly))
}

/// Renders ranked results, or an explicit message when there are none.
#[must_use]
pub fn format_query_results(question: &str, results: &[ScoredDocument]) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }
    let mut output = format!("Query: {question}\nTop {} results:\n\n", results.len());
    for r in results {
        _ = write!(
            output,
            "  #{} [score: {:.4}]\n  {}\n\n",
            r.rank, r.score, r.document.text
        );
    }
    output
}

#[must_use]
pub fn format_document_list(documents: &[DocumentEntry]) -> String {
    if documents.is_empty() {
        return EMPTY_KNOWLEDGE_BASE.to_string();
    }
    let mut output = format!("Knowledge base ({} documents):\n\n", documents.len());
    for doc in documents {
        _ = writeln!(output, "  {}. {}", doc.id, doc.text);
    }
    output
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct QueryArgs {
    question: String,
    #[serde(default)]
    top_k: Option<i64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AddDocumentArgs {
    document: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ListDocumentsArgs {}

pub struct RagQueryTool<S: DocumentStore, M: EmbeddingModel> {
    kb: Arc<KnowledgeBase<S, M>>,
    args: Vec<ToolArg>,
}

impl<S: DocumentStore, M: EmbeddingModel> RagQueryTool<S, M> {
    /// # Errors
    /// Fails if an argument schema can't be generated.
    pub fn new(kb: Arc<KnowledgeBase<S, M>>) -> Result<Self, ToolError> {
        let args = vec![
            ToolArg::new::<String>("question", "A natural language question")?,
            ToolArg::optional::<u32>(
                "top_k",
                "How many documents to return, defaults to 3",
            )?,
        ];
        Ok(Self { kb, args })
    }
}

#[async_trait]
impl<S: DocumentStore, M: EmbeddingModel> Tool for RagQueryTool<S, M> {
    fn name(&self) -> &str {
        QUERY_TOOL
    }

    fn description(&self) -> &str {
        "Search the knowledge base using a natural language question."
    }

    fn args(&self) -> &[ToolArg] {
        &self.args
    }

    async fn call(&self, args: &str) -> Result<Value, ToolError> {
        let args: QueryArgs = serde_json::from_str(args)?;
        // negative values map to 0 so the engine rejects them
        let top_k = args.top_k.map(|k| usize::try_from(k).unwrap_or(0));
        let text = match self.kb.query(&args.question, top_k).await {
            Ok(results) => format_query_results(&args.question, &results),
            Err(e) => {
                warn!("{QUERY_TOOL} failed: {e}");
                format!("Failed to query the knowledge base: {e}")
            }
        };
        Ok(Value::String(text))
    }
}

pub struct RagAddDocumentTool<S: DocumentStore, M: EmbeddingModel> {
    kb: Arc<KnowledgeBase<S, M>>,
    args: Vec<ToolArg>,
}

impl<S: DocumentStore, M: EmbeddingModel> RagAddDocumentTool<S, M> {
    /// # Errors
    /// Fails if an argument schema can't be generated.
    pub fn new(kb: Arc<KnowledgeBase<S, M>>) -> Result<Self, ToolError> {
        let args = vec![ToolArg::new::<String>(
            "document",
            "The text of the document to add",
        )?];
        Ok(Self { kb, args })
    }
}

#[async_trait]
impl<S: DocumentStore, M: EmbeddingModel> Tool for RagAddDocumentTool<S, M> {
    fn name(&self) -> &str {
        ADD_DOCUMENT_TOOL
    }

    fn description(&self) -> &str {
        "Add a new document to the knowledge base."
    }

    fn args(&self) -> &[ToolArg] {
        &self.args
    }

    async fn call(&self, args: &str) -> Result<Value, ToolError> {
        let args: AddDocumentArgs = serde_json::from_str(args)?;
        let text = match self.kb.add_document(&args.document).await {
            Ok(total) => format!("Document added. Total documents: {total}"),
            Err(e) => {
                warn!("{ADD_DOCUMENT_TOOL} failed: {e}");
                format!("Failed to add the document: {e}")
            }
        };
        Ok(Value::String(text))
    }
}

pub struct RagListDocumentsTool<S: DocumentStore, M: EmbeddingModel> {
    kb: Arc<KnowledgeBase<S, M>>,
}

impl<S: DocumentStore, M: EmbeddingModel> RagListDocumentsTool<S, M> {
    pub fn new(kb: Arc<KnowledgeBase<S, M>>) -> Self {
        Self { kb }
    }
}

#[async_trait]
impl<S: DocumentStore, M: EmbeddingModel> Tool for RagListDocumentsTool<S, M> {
    fn name(&self) -> &str {
        LIST_DOCUMENTS_TOOL
    }

    fn description(&self) -> &str {
        "List all documents currently in the knowledge base."
    }

    fn args(&self) -> &[ToolArg] {
        &[]
    }

    async fn call(&self, args: &str) -> Result<Value, ToolError> {
        if !args.trim().is_empty() {
            let _: ListDocumentsArgs = serde_json::from_str(args)?;
        }
        let documents = self.kb.list_documents().await;
        Ok(Value::String(format_document_list(&documents)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::EngineConfig,
        providers::embeddings::HashingEmbedding,
        tools::{ToolCall, ToolSetError},
        vector_store::InMemoryDocumentStore,
    };

    type Kb = KnowledgeBase<InMemoryDocumentStore, HashingEmbedding>;

    fn kb() -> Arc<Kb> {
        Arc::new(KnowledgeBase::new(
            InMemoryDocumentStore::new(),
            HashingEmbedding::new(None).unwrap(),
            EngineConfig::default(),
        ))
    }

    async fn call_text(tools: &ToolSet, name: &str, args: &str) -> String {
        let response = tools.call("call_0", name, args).await.unwrap();
        response.content.as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_empty_knowledge_base_messages() {
        let tools = rag_toolset(kb()).unwrap();
        assert_eq!(
            call_text(&tools, LIST_DOCUMENTS_TOOL, "{}").await,
            "Knowledge base is empty."
        );
        assert_eq!(
            call_text(&tools, QUERY_TOOL, r#"{"question": "anything", "top_k": 5}"#).await,
            "No documents found in the knowledge base."
        );
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let tools = rag_toolset(kb()).unwrap();
        assert_eq!(
            call_text(&tools, ADD_DOCUMENT_TOOL, r#"{"document": "X"}"#).await,
            "Document added. Total documents: 1"
        );
        assert_eq!(
            call_text(&tools, ADD_DOCUMENT_TOOL, r#"{"document": "Y"}"#).await,
            "Document added. Total documents: 2"
        );
        let listing = call_text(&tools, LIST_DOCUMENTS_TOOL, "").await;
        assert_eq!(listing, "Knowledge base (2 documents):\n\n  1. X\n  2. Y\n");
        assert_eq!(listing, call_text(&tools, LIST_DOCUMENTS_TOOL, "{}").await);
    }

    #[tokio::test]
    async fn test_query_report() {
        let kb = kb();
        for text in ["the sky is blue", "the grass is green", "bananas are yellow"] {
            kb.add_document(text).await.unwrap();
        }
        let tools = rag_toolset(kb).unwrap();

        let report = call_text(
            &tools,
            QUERY_TOOL,
            r#"{"question": "what color is the sky", "top_k": 2}"#,
        )
        .await;
        assert!(report.starts_with("Query: what color is the sky\nTop 2 results:\n\n"));
        assert!(report.contains("  #1 [score: 0.6708]\n  the sky is blue\n\n"));
        assert!(report.contains("  #2 [score: 0.4472]\n  the grass is green\n\n"));
        assert!(!report.contains("bananas"));
    }

    #[tokio::test]
    async fn test_engine_errors_become_text() {
        let tools = rag_toolset(kb()).unwrap();
        let add = call_text(&tools, ADD_DOCUMENT_TOOL, r#"{"document": "  "}"#).await;
        assert!(add.starts_with("Failed to add the document: Validation error"));

        let query = call_text(&tools, QUERY_TOOL, r#"{"question": "sky", "top_k": 0}"#).await;
        assert!(query.starts_with("Failed to query the knowledge base: Validation error"));
        let negative = call_text(&tools, QUERY_TOOL, r#"{"question": "sky", "top_k": -2}"#).await;
        assert!(negative.starts_with("Failed to query the knowledge base"));
    }

    #[tokio::test]
    async fn test_bad_calls() {
        let tools = rag_toolset(kb()).unwrap();
        assert!(matches!(
            tools.call("1", "rag_delete", "{}").await,
            Err(ToolSetError::ToolNotFound(_))
        ));
        assert!(matches!(
            tools.call("2", QUERY_TOOL, r#"{"top_k": 2}"#).await,
            Err(ToolSetError::ToolError(ToolError::JsonError(_)))
        ));
    }

    #[tokio::test]
    async fn test_run_strategies() {
        let mut tools = rag_toolset(kb()).unwrap();
        let calls = vec![
            ToolCall {
                id: "a".to_string(),
                name: ADD_DOCUMENT_TOOL.to_string(),
                arguments: r#"{"document": "hello world"}"#.to_string(),
            },
            ToolCall {
                id: "b".to_string(),
                name: "missing".to_string(),
                arguments: "{}".to_string(),
            },
            ToolCall {
                id: "c".to_string(),
                name: LIST_DOCUMENTS_TOOL.to_string(),
                arguments: "{}".to_string(),
            },
        ];
        assert!(tools.run(&calls).await.is_err());

        tools.1 = ExecutionStrategy::BestEffort;
        let responses = tools.run(&calls).await.unwrap();
        let ids: Vec<_> = responses.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_definitions() {
        let mut tools = rag_toolset(kb()).unwrap();
        assert_eq!(
            tools.names(),
            vec![QUERY_TOOL, ADD_DOCUMENT_TOOL, LIST_DOCUMENTS_TOOL]
        );

        let definitions = tools.definitions();
        assert_eq!(definitions[0]["function"]["name"], QUERY_TOOL);
        assert_eq!(
            definitions[0]["function"]["parameters"]["required"],
            serde_json::json!(["question"])
        );
        assert_eq!(
            definitions[2]["function"]["parameters"]["properties"],
            serde_json::json!({})
        );

        tools.remove_tool(LIST_DOCUMENTS_TOOL).unwrap();
        assert!(tools.find_tool(LIST_DOCUMENTS_TOOL).is_err());
    }
}
