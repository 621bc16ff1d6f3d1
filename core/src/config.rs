use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

const DEFAULT_TOP_K: usize = 3;
const DEFAULT_EMBED_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to deserialize json config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to fetch env var `{var}`!, {source}")]
    MissingEnvVar {
        var: String,
        #[source]
        source: std::env::VarError,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings for a [`KnowledgeBase`](crate::knowledge_base::KnowledgeBase).
///
/// # Examples
///
/// ```json
/// {
///     "default_top_k": 3,
///     "embed_timeout_ms": 30000
/// }
/// ```
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Result count used when a query doesn't name one
    default_top_k: usize,
    /// Upper bound on a single embedding provider call
    embed_timeout_ms: u64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEngineConfig {
    default_top_k: Option<usize>,
    embed_timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_top_k: DEFAULT_TOP_K,
            embed_timeout_ms: DEFAULT_EMBED_TIMEOUT_MS,
        }
    }
}

impl EngineConfig {
    /// # Errors
    /// Fails if `default_top_k` or `embed_timeout_ms` is zero.
    pub fn new(default_top_k: usize, embed_timeout_ms: u64) -> Result<Self, ConfigError> {
        Self {
            default_top_k,
            embed_timeout_ms,
        }
        .validated()
    }

    /// Parses an `EngineConfig` from an optional JSON string, missing fields take their defaults.
    ///
    /// # Errors
    /// This function will error if:
    ///  - The provided JSON is malformed or contains unknown fields
    ///  - `default_top_k` or `embed_timeout_ms` is zero
    pub fn from_json(json_config: Option<&str>) -> Result<Self, ConfigError> {
        let config = match json_config {
            Some(json) => {
                let raw = serde_json::from_str::<RawEngineConfig>(json).map_err(|e| {
                    error!("Failed to deserialize engine config: {e}");
                    ConfigError::from(e)
                })?;
                Self {
                    default_top_k: raw.default_top_k.unwrap_or(DEFAULT_TOP_K),
                    embed_timeout_ms: raw.embed_timeout_ms.unwrap_or(DEFAULT_EMBED_TIMEOUT_MS),
                }
            }
            None => Self::default(),
        };
        config.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.default_top_k == 0 {
            return Err(ConfigError::Invalid(
                "`default_top_k` must be at least 1".to_string(),
            ));
        }
        if self.embed_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "`embed_timeout_ms` must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }

    #[must_use]
    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    #[must_use]
    pub fn embed_timeout(&self) -> Duration {
        Duration::from_millis(self.embed_timeout_ms)
    }
}

/// Configuration shared by the HTTP embedding providers.
///
/// ```json
/// {
///     "model": "text-embedding-3-small",
///     "api_key_var": "ENV_VAR",
///     "api_url": "https://api.openai.com/v1/embeddings"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    pub model: Option<String>,
    pub api_key_var: Option<String>,
    pub api_url: Option<String>,
}

impl ProviderConfig {
    /// # Errors
    /// Fails if the JSON is malformed or contains unknown fields.
    pub fn from_json(json_config: Option<&str>) -> Result<Self, ConfigError> {
        json_config.map_or_else(
            || Ok(Self::default()),
            |json| {
                serde_json::from_str::<Self>(json).map_err(|e| {
                    error!("Failed to deserialize provider config: {e}");
                    ConfigError::from(e)
                })
            },
        )
    }
}

/// Reads an API key from the environment variable `var`.
///
/// # Errors
/// Fails with [`ConfigError::MissingEnvVar`] if the variable isn't set or isn't unicode.
pub fn api_key_from_env(var: &str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|source| {
        error!("Failed to fetch env var `{var}`!, {source}");
        ConfigError::MissingEnvVar {
            var: var.to_string(),
            source,
        }
    })
}
