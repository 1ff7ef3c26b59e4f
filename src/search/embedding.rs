//! Embedding client
//!
//! Text is turned into vectors by an external, Ollama-compatible embedding
//! service (`POST {model, prompt}` -> `{embedding}`). The service is reached
//! through the [`EmbeddingProvider`] trait so pipelines can run against
//! deterministic providers in tests.
//!
//! When the service is down the client follows the configured
//! [`FailurePolicy`]. The default substitutes a random vector, which keeps
//! indexing and querying available but silently lowers result quality for
//! the affected call. A warning is logged every time this happens.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::config::{EmbeddingConfig, FailurePolicy};
use crate::core::error::{check_dimension, SearchError, SearchResult};

/// Failures talking to the embedding service
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding service returned status {0}")]
    Status(u16),

    #[error("malformed embedding response: {0}")]
    Malformed(String),
}

/// Source of raw embeddings
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Fetch the embedding for `text`. No length validation happens here.
    async fn fetch(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Model identifier reported in status output
    fn model(&self) -> &str;
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Option<Vec<f32>>,
}

/// HTTP provider for Ollama's `/api/embeddings` endpoint
pub struct OllamaProvider {
    http: Client,
    endpoint: String,
    model: String,
}

impl OllamaProvider {
    /// The request timeout bounds the whole call; a timed-out request is
    /// dropped and reported as an `Http` error.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    async fn fetch(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&EmbedRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbeddingError::Status(status.as_u16()));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Malformed(e.to_string()))?;

        body.embedding
            .ok_or_else(|| EmbeddingError::Malformed("missing `embedding` field".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Produces validated, fixed-dimension embeddings
#[derive(Clone)]
pub struct EmbeddingClient {
    provider: Arc<dyn EmbeddingProvider>,
    dimension: usize,
    policy: FailurePolicy,
}

impl EmbeddingClient {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, dimension: usize, policy: FailurePolicy) -> Self {
        Self {
            provider,
            dimension,
            policy,
        }
    }

    /// Client backed by the HTTP provider described in `config`
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let provider = OllamaProvider::new(config)?;
        Ok(Self::new(
            Arc::new(provider),
            config.dimension,
            config.on_failure,
        ))
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Embed `text`.
    ///
    /// A response of the wrong length fails with `DimensionMismatch` under
    /// either policy. Service failures follow the configured policy.
    pub async fn embed(&self, text: &str) -> SearchResult<Vec<f32>> {
        match self.provider.fetch(text).await {
            Ok(vector) => {
                check_dimension(&vector, self.dimension)?;
                debug!(chars = text.chars().count(), "embedded text");
                Ok(vector)
            }
            Err(err) => match self.policy {
                FailurePolicy::FallbackRandom => {
                    warn!(error = %err, "embedding service failed, using random vector");
                    Ok(random_embedding(self.dimension))
                }
                FailurePolicy::PropagateError => {
                    warn!(error = %err, "embedding service failed");
                    Err(SearchError::EmbeddingUnavailable(err.to_string()))
                }
            },
        }
    }
}

/// `dimension` independent uniform values in `[0, 1)`
pub fn random_embedding(dimension: usize) -> Vec<f32> {
    let mut rng = rand::thread_rng();
    (0..dimension).map(|_| rng.gen::<f32>()).collect()
}
