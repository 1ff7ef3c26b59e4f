//! Runtime configuration
//!
//! Sources, lowest precedence first: built-in defaults, an optional YAML
//! file, `PAGESEARCH_*` environment variables. CLI flags are applied on top
//! by the binary.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DIMENSION: usize = 768;
pub const DEFAULT_EMBED_URL: &str = "http://localhost:11434/api/embeddings";
pub const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("embedding endpoint cannot be empty")]
    EmptyEndpoint,

    #[error("embedding model cannot be empty")]
    EmptyModel,

    #[error("embedding dimension must be > 0")]
    ZeroDimension,

    #[error("embedding timeout must be > 0 seconds")]
    ZeroTimeout,

    #[error("server port must be > 0")]
    ZeroPort,

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// What to do when the embedding service cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Substitute a random vector and keep going. Search quality degrades
    /// silently for the affected document or query.
    #[default]
    FallbackRandom,
    /// Fail the call with `EmbeddingUnavailable`.
    PropagateError,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fallback_random" => Ok(Self::FallbackRandom),
            "propagate_error" => Ok(Self::PropagateError),
            other => Err(ConfigError::InvalidValue {
                key: "on_failure",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FallbackRandom => f.write_str("fallback_random"),
            Self::PropagateError => f.write_str("propagate_error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// Base URL used by the CLI client commands.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub endpoint: String,
    pub model: String,
    pub dimension: usize,
    pub timeout_secs: u64,
    pub on_failure: FailurePolicy,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_EMBED_URL.to_string(),
            model: DEFAULT_EMBED_MODEL.to_string(),
            dimension: DEFAULT_DIMENSION,
            timeout_secs: 10,
            on_failure: FailurePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub embedding: EmbeddingConfig,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            embedding: EmbeddingConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load defaults, then the YAML file if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `PAGESEARCH_*` overrides using `lookup` to read variables.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("PAGESEARCH_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PAGESEARCH_PORT") {
            self.server.port = parse_var("PAGESEARCH_PORT", &port)?;
        }
        if let Some(endpoint) = lookup("PAGESEARCH_EMBED_URL") {
            self.embedding.endpoint = endpoint;
        }
        if let Some(model) = lookup("PAGESEARCH_EMBED_MODEL") {
            self.embedding.model = model;
        }
        if let Some(dimension) = lookup("PAGESEARCH_DIMENSION") {
            self.embedding.dimension = parse_var("PAGESEARCH_DIMENSION", &dimension)?;
        }
        if let Some(timeout) = lookup("PAGESEARCH_EMBED_TIMEOUT_SECS") {
            self.embedding.timeout_secs = parse_var("PAGESEARCH_EMBED_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(policy) = lookup("PAGESEARCH_ON_EMBED_FAILURE") {
            self.embedding.on_failure = policy.parse()?;
        }
        if let Some(level) = lookup("PAGESEARCH_LOG") {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding.endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        if self.embedding.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        if self.embedding.dimension == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if self.embedding.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.server.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
