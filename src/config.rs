use std::env;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the docembed service.
///
/// Loaded once at startup and handed to [`crate::pipeline::Pipeline::new`]; there is no
/// process-wide configuration singleton, so tests and embedders can construct pipelines
/// with whatever settings they need.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key sent to the embedding and vision extraction endpoints.
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible API.
    pub openai_base_url: String,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Dimensionality of the produced vectors.
    pub embedding_dimension: usize,
    /// Multimodal model used for fallback text extraction.
    pub extraction_model: String,
    /// Maximum chunk size in characters for paragraph accumulation.
    pub chunk_max_chars: usize,
    /// Maximum number of embedding requests in flight per document.
    pub embed_concurrency: usize,
    /// Per-request timeout applied to all outbound HTTP calls, in seconds.
    pub request_timeout_secs: u64,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;
const DEFAULT_EXTRACTION_MODEL: &str = "gpt-4-vision-preview";
const DEFAULT_CHUNK_MAX_CHARS: usize = 2000;
const DEFAULT_EMBED_CONCURRENCY: usize = 4;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            openai_api_key: load_env("OPENAI_API_KEY")?,
            openai_base_url: load_env_optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            embedding_model: load_env_optional("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimension: parse_env_or("EMBEDDING_DIMENSION", DEFAULT_EMBEDDING_DIMENSION)?,
            extraction_model: load_env_optional("EXTRACTION_MODEL")
                .unwrap_or_else(|| DEFAULT_EXTRACTION_MODEL.to_string()),
            chunk_max_chars: parse_env_or("CHUNK_MAX_CHARS", DEFAULT_CHUNK_MAX_CHARS)?,
            embed_concurrency: parse_env_or("EMBED_CONCURRENCY", DEFAULT_EMBED_CONCURRENCY)?,
            request_timeout_secs: parse_env_or(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding_dimension == 0 {
            return Err(ConfigError::InvalidValue("EMBEDDING_DIMENSION".into()));
        }
        if self.chunk_max_chars == 0 {
            return Err(ConfigError::InvalidValue("CHUNK_MAX_CHARS".into()));
        }
        if self.embed_concurrency == 0 {
            return Err(ConfigError::InvalidValue("EMBED_CONCURRENCY".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".into()));
        }
        Ok(())
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
        .map(|value| value.unwrap_or(default))
}

#[cfg(test)]
impl Config {
    /// Build a config without touching the process environment.
    pub(crate) fn for_tests(base_url: &str, dimension: usize, chunk_max_chars: usize) -> Self {
        Self {
            openai_api_key: "test-key".into(),
            openai_base_url: base_url.trim_end_matches('/').to_string(),
            embedding_model: "text-embedding-3-small".into(),
            embedding_dimension: dimension,
            extraction_model: "gpt-4-vision-preview".into(),
            chunk_max_chars,
            embed_concurrency: 2,
            request_timeout_secs: 5,
            server_port: None,
        }
    }
}
