use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error, instrument};

use super::IndexedEmbeddingResponse;
use crate::{
    config::{api_key_from_env, ConfigError, ProviderConfig},
    embeddings::{EmbedderError, EmbeddingModel},
};

const API_KEY_ENV_VAR: &str = "RAGFRAME_OPENAI_API_KEY";
const URL: &str = "https://api.openai.com/v1/embeddings";
const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Batched embeddings from the [OpenAI](https://platform.openai.com/docs/api-reference/embeddings) API.
///
/// # Supported Configuration
///
/// - `model`(optional): model identifier, defaults to `text-embedding-3-small`
/// - `api_key_var`(optional): environment variable holding the API key, defaults to `RAGFRAME_OPENAI_API_KEY`
/// - `api_url`(optional): custom, OpenAI compatible endpoint
///
/// ```rust,no_run
/// use ragframe::providers::embeddings::OpenAIEmbedding;
///
/// let model = OpenAIEmbedding::new(Some(r#"{"model": "text-embedding-3-large"}"#)).unwrap();
/// ```
pub struct OpenAIEmbeddingModel {
    api_key: String,
    api_url: String,
    client: Client,
    model: String,
}

impl OpenAIEmbeddingModel {
    /// Creates a new `OpenAIEmbeddingModel` from an optional JSON configuration string
    ///
    /// # Errors
    /// This function will error if:
    ///  - The provided JSON is malformed or contains unknown fields
    ///  - The API key environment variable isn't set
    #[instrument]
    pub fn new(json_config: Option<&str>) -> Result<Self, ConfigError> {
        let config = ProviderConfig::from_json(json_config)?;
        let api_key_var = config
            .api_key_var
            .unwrap_or_else(|| API_KEY_ENV_VAR.to_string());
        let api_key = api_key_from_env(&api_key_var)?;
        Ok(Self {
            api_key,
            api_url: config.api_url.unwrap_or_else(|| URL.to_string()),
            client: Client::new(),
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

#[async_trait]
impl EmbeddingModel for OpenAIEmbeddingModel {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
        let request_body = json!({
            "input": texts,
            "model": self.model,
        });
        debug!("Requesting {} embeddings from {}", texts.len(), self.api_url);
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| EmbedderError::RequestError(e.to_string()))?;

        if response.status().is_success() {
            response
                .json::<IndexedEmbeddingResponse>()
                .await
                .map_err(|e| EmbedderError::ParseError(e.to_string()))?
                .into_ordered(texts.len())
        } else {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("OpenAI embedding request failed with status {status}");
            Err(EmbedderError::ProviderError { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_var() {
        let result = OpenAIEmbeddingModel::new(Some(
            r#"{"api_key_var": "RAGFRAME_TEST_SURELY_UNSET_VAR"}"#,
        ));
        assert!(matches!(result, Err(ConfigError::MissingEnvVar { .. })));
    }

    #[test]
    fn test_unknown_config_field() {
        let result = OpenAIEmbeddingModel::new(Some(r#"{"temperature": 1.0}"#));
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[tokio::test]
    #[ignore]
    async fn simple_openai_embed_request() {
        let model = OpenAIEmbeddingModel::new(None).unwrap();
        let response = model
            .embed(&["the sky is blue".to_string(), "bananas are yellow".to_string()])
            .await;
        assert!(response.is_ok());
        assert_eq!(response.unwrap().len(), 2);
    }
}
