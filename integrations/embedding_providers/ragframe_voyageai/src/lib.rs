use async_trait::async_trait;
use ragframe::{
    config::{api_key_from_env, ConfigError},
    embeddings::{EmbedderError, EmbeddingModel},
    providers::embeddings::IndexedEmbeddingResponse,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, instrument};

const DEFAULT_API_KEY_VAR_NAME: &str = "VOYAGEAI_API_KEY";
const DEFAULT_URL: &str = "https://api.voyageai.com/v1/embeddings";

#[derive(Serialize, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct ModelConfig {
    api_key_var: Option<String>,
    api_url: Option<String>,
    model: String,
    input_type: Option<InputType>,
}

/// Hint Voyage uses to tune embeddings for the retrieval side they serve
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Query,
    Document,
}

/// Implementation of ragframe's `EmbeddingModel` trait for [Voyage AI](https://voyageai.com).
///
/// # Supported Configuration
///
/// The model accepts the following configuration parameters:
///
/// - `model`: String identifier for the model to use
/// - `api_key_var`(optional): Environment variable name containing the API key
/// - `api_url`(optional): Custom API endpoint URL
/// - `input_type`(optional): `"query"` or `"document"`
///
/// # Examples
///
/// ```rust,no_run
/// use ragframe_voyageai::VoyageAIEmbedding;
///
/// let model = VoyageAIEmbedding::new(Some(r#"{
///     "model": "voyage-3-lite",
///     "api_key_var": "ENV_VAR",
///     "api_url": "https://api.voyageai.com/v1/embeddings"
/// }"#)).unwrap();
/// ```
pub struct VoyageAIEmbedding {
    api_key: String,
    api_url: String,
    model: String,
    input_type: Option<InputType>,
    client: Client,
}

impl std::fmt::Debug for VoyageAIEmbedding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoyageAIEmbedding")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("input_type", &self.input_type)
            .finish_non_exhaustive()
    }
}

impl VoyageAIEmbedding {
    /// Creates a new `VoyageAIEmbedding` from a JSON configuration string
    ///
    /// # Errors
    /// This function will error if:
    ///  - No config is passed, the `model` field is required
    ///  - The provided JSON is malformed or contains unknown fields
    ///  - The API key environment variable isn't set
    #[instrument]
    pub fn new(json_config: Option<&str>) -> Result<Self, ConfigError> {
        let Some(json) = json_config else {
            error!("VoyageAIEmbedding expects a config json with atleast the required model field!");
            return Err(ConfigError::Invalid(
                "VoyageAIEmbedding expects a config json with atleast the required model field"
                    .to_string(),
            ));
        };
        let config: ModelConfig = serde_json::from_str(json)?;
        let api_key_var = config
            .api_key_var
            .unwrap_or_else(|| DEFAULT_API_KEY_VAR_NAME.to_string());
        let api_key = api_key_from_env(&api_key_var)?;
        Ok(Self {
            api_key,
            api_url: config.api_url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            model: config.model,
            input_type: config.input_type,
            client: Client::new(),
        })
    }

    fn request_body(&self, texts: &[String]) -> serde_json::Value {
        let mut body = json!({
            "input": texts,
            "model": self.model,
        });
        if let Some(input_type) = self.input_type {
            body["input_type"] = json!(input_type);
        }
        body
    }
}

#[async_trait]
impl EmbeddingModel for VoyageAIEmbedding {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.request_body(texts))
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
            error!("Voyage AI embedding request failed with status {status}");
            Err(EmbedderError::ProviderError { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(input_type: Option<InputType>) -> VoyageAIEmbedding {
        VoyageAIEmbedding {
            api_key: "key".to_string(),
            api_url: DEFAULT_URL.to_string(),
            model: "voyage-3-lite".to_string(),
            input_type,
            client: Client::new(),
        }
    }

    #[test]
    fn test_config_errors() {
        assert!(matches!(
            VoyageAIEmbedding::new(None),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            VoyageAIEmbedding::new(Some(r#"{"api_url": "http://localhost"}"#)),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            VoyageAIEmbedding::new(Some(
                r#"{"model": "voyage-3-lite", "api_key_var": "RAGFRAME_TEST_SURELY_UNSET_VAR"}"#
            )),
            Err(ConfigError::MissingEnvVar { .. })
        ));
    }

    #[test]
    fn test_request_body() {
        let texts = vec!["a".to_string(), "b".to_string()];
        let body = model(None).request_body(&texts);
        assert_eq!(body, json!({"input": ["a", "b"], "model": "voyage-3-lite"}));

        let body = model(Some(InputType::Query)).request_body(&texts);
        assert_eq!(body["input_type"], "query");
    }

    #[tokio::test]
    #[ignore]
    async fn simple_voyage_embed_request() {
        let model = VoyageAIEmbedding::new(Some(r#"{"model": "voyage-3-lite"}"#)).unwrap();
        let response = model.embed(&["test".to_string()]).await;
        assert!(response.is_ok());
    }
}
