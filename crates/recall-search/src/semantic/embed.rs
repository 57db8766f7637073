//! HTTP embedding client for Ollama and OpenAI-compatible services.
//!
//! The agent carries a whole-request timeout, so a cold model load that runs
//! past it just means this query goes without a vector.

use std::time::Duration;

use recall_core::config::{EmbeddingConfig, EmbeddingProvider};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Embedder;

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Transport(String),

    #[error("embedding service returned HTTP {0}")]
    Status(u16),

    #[error("malformed embedding response: {0}")]
    Decode(#[from] std::io::Error),

    #[error("embedding service returned an empty vector")]
    Empty,
}

/// Wire format spoken by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Ollama,
    OpenAi,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: usize,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Deserialize)]
struct OpenAiEmbedding {
    embedding: Vec<f32>,
}

pub struct HttpEmbedder {
    agent: ureq::Agent,
    protocol: Protocol,
    url: String,
    model: String,
    dimensions: usize,
    api_key: Option<String>,
}

impl std::fmt::Debug for HttpEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbedder")
            .field("protocol", &self.protocol)
            .field("url", &self.url)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl HttpEmbedder {
    #[must_use]
    pub fn new(protocol: Protocol, url: impl Into<String>, model: impl Into<String>) -> Self {
        let defaults = EmbeddingConfig::default();
        Self {
            agent: build_agent(Duration::from_millis(defaults.timeout_ms)),
            protocol,
            url: url.into(),
            model: model.into(),
            dimensions: defaults.dimensions,
            api_key: None,
        }
    }

    /// Build a client from the `[embedding]` config section.
    ///
    /// Returns `None` when the provider is `none`. The API key is read from
    /// the environment variable named by `api_key_env`; a missing key just
    /// means no `Authorization` header, which local OpenAI-compatible
    /// servers accept.
    #[must_use]
    pub fn from_config(config: &EmbeddingConfig) -> Option<Self> {
        let protocol = match config.provider {
            EmbeddingProvider::Ollama => Protocol::Ollama,
            EmbeddingProvider::OpenAi => Protocol::OpenAi,
            EmbeddingProvider::None => return None,
        };

        let api_key = match protocol {
            Protocol::OpenAi => std::env::var(&config.api_key_env).ok(),
            Protocol::Ollama => None,
        };

        Some(Self {
            agent: build_agent(Duration::from_millis(config.timeout_ms)),
            protocol,
            url: config.url.clone(),
            model: config.model.clone(),
            dimensions: config.dimensions,
            api_key,
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    #[must_use]
    pub const fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Request an embedding, reporting why it failed.
    ///
    /// # Errors
    ///
    /// Returns an [`EmbedError`] for transport failures and timeouts, non-2xx
    /// responses, undecodable bodies, and empty vectors.
    pub fn try_embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut request = self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            request = request.set("Authorization", &format!("Bearer {key}"));
        }

        let result = match self.protocol {
            Protocol::Ollama => request.send_json(OllamaRequest {
                model: &self.model,
                prompt: text,
            }),
            Protocol::OpenAi => request.send_json(OpenAiRequest {
                model: &self.model,
                input: text,
                dimensions: self.dimensions,
            }),
        };

        let response = result.map_err(|err| match err {
            ureq::Error::Status(code, _) => EmbedError::Status(code),
            ureq::Error::Transport(transport) => EmbedError::Transport(transport.to_string()),
        })?;

        let vector = match self.protocol {
            Protocol::Ollama => response.into_json::<OllamaResponse>()?.embedding,
            Protocol::OpenAi => response
                .into_json::<OpenAiResponse>()?
                .data
                .into_iter()
                .next()
                .map(|d| d.embedding)
                .unwrap_or_default(),
        };

        if vector.is_empty() {
            return Err(EmbedError::Empty);
        }
        debug!(dimensions = vector.len(), "query embedded");
        Ok(vector)
    }
}

impl Embedder for HttpEmbedder {
    fn embed(&self, text: &str) -> Option<Vec<f32>> {
        match self.try_embed(text) {
            Ok(vector) => Some(vector),
            Err(e) => {
                warn!(url = %self.url, "embedding unavailable, vector leg skipped: {e}");
                None
            }
        }
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(timeout).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_none_builds_no_client() {
        let config = EmbeddingConfig {
            provider: EmbeddingProvider::None,
            ..EmbeddingConfig::default()
        };
        assert!(HttpEmbedder::from_config(&config).is_none());
    }

    #[test]
    fn from_config_copies_fields() {
        let config = EmbeddingConfig {
            provider: EmbeddingProvider::OpenAi,
            url: "http://127.0.0.1:9/v1/embeddings".into(),
            model: "text-embedding-3-small".into(),
            dimensions: 256,
            timeout_ms: 50,
            api_key_env: "RECALL_TEST_KEY_THAT_IS_NOT_SET".into(),
        };
        let embedder = HttpEmbedder::from_config(&config).expect("client");
        assert_eq!(embedder.protocol, Protocol::OpenAi);
        assert_eq!(embedder.dimensions, 256);
        assert!(embedder.api_key.is_none());
    }

    #[test]
    fn debug_redacts_api_key() {
        let embedder = HttpEmbedder::new(Protocol::OpenAi, "http://localhost", "m")
            .with_api_key("sk-secret");
        let rendered = format!("{embedder:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn unreachable_service_is_absent() {
        // Port 9 (discard) is not listening on test hosts.
        let embedder = HttpEmbedder::new(Protocol::Ollama, "http://127.0.0.1:9/api/embeddings", "m")
            .with_timeout(Duration::from_millis(200));
        assert!(embedder.embed("watson").is_none());
    }
}
